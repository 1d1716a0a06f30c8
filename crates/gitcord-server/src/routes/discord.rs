// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Discord interactions endpoint.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use gitcord_common_http::CancellationToken;
use gitcord_server_discord::{Interaction, InteractionResponse, InteractionType};

use crate::{
	api::AppState, error::ServerError, link::SYNC_ACCOUNT_COMMAND, verify::verify_discord,
};

/// POST /discord
#[tracing::instrument(skip_all)]
pub async fn handle_interaction(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Json<InteractionResponse>, ServerError> {
	verify_discord(&headers, &body, &state.discord_public_key)?;

	let interaction: Interaction = serde_json::from_slice(&body)
		.map_err(|e| ServerError::BadRequest(format!("Invalid interaction payload: {e}")))?;

	let cancel = CancellationToken::new();
	let _guard = cancel.clone().drop_guard();

	match interaction.interaction_type() {
		InteractionType::Ping => Ok(Json(InteractionResponse::pong())),
		InteractionType::ApplicationCommand => {
			let data = interaction
				.data
				.as_ref()
				.ok_or_else(|| ServerError::BadRequest("Missing command data.".to_string()))?;

			tracing::info!(
				command = %data.name,
				interaction_id = %interaction.id,
				guild_id = ?interaction.guild_id,
				"application command received"
			);

			match data.name.as_str() {
				SYNC_ACCOUNT_COMMAND => state.linker.sync_account(data, &cancel).await.map(Json),
				other => Err(ServerError::BadRequest(format!("Unknown command '{other}'."))),
			}
		}
		other => Err(ServerError::NotImplemented(format!(
			"interaction type {other:?}"
		))),
	}
}
