// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub App and repository webhook deliveries.

use axum::{
	body::Bytes,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use gitcord_common_http::CancellationToken;

use crate::{api::AppState, error::ServerError, verify::verify_github};

/// POST /github - `ping` is acknowledged, `installation` links the
/// installation's repositories, and every other event is relayed to the
/// account's Discord webhook.
#[tracing::instrument(skip_all)]
pub async fn handle_delivery(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<Response, ServerError> {
	let delivery = verify_github(&headers, body, &state.webhook_secret)?;

	// Dropping the handler future (client disconnect) cancels in-flight work.
	let cancel = CancellationToken::new();
	let _guard = cancel.clone().drop_guard();

	match delivery.event.as_str() {
		"ping" => {
			tracing::info!("GitHub ping received");
			Ok(StatusCode::OK.into_response())
		}
		"installation" => {
			let report = state
				.synchronizer
				.handle_delivery(&delivery.body, &cancel)
				.await?;
			Ok(Json(report).into_response())
		}
		event => {
			let account = delivery.account.as_deref().ok_or_else(|| {
				ServerError::BadRequest("Payload does not name a repository.".to_string())
			})?;
			tracing::debug!(event, account, repository = ?delivery.repository, "relaying delivery");
			state
				.relay
				.relay(
					account,
					delivery.repository.as_deref(),
					&headers,
					&delivery.body,
					&cancel,
				)
				.await
		}
	}
}
