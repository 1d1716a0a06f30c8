// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use gitcord_server_db::StoreHealth;
use serde::Serialize;

use crate::api::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub store: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reconnect_attempts: Option<u32>,
}

impl From<StoreHealth> for HealthResponse {
	fn from(health: StoreHealth) -> Self {
		match health {
			StoreHealth::Healthy => Self {
				status: "ok",
				store: "healthy",
				reconnect_attempts: None,
			},
			StoreHealth::Reconnecting { attempts } => Self {
				status: "degraded",
				store: "reconnecting",
				reconnect_attempts: Some(attempts),
			},
		}
	}
}

/// GET /health - 503 while the store is reconnecting.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let health = *state.store_health.borrow();
	let status = if health.is_healthy() {
		StatusCode::OK
	} else {
		StatusCode::SERVICE_UNAVAILABLE
	};
	(status, Json(HealthResponse::from(health)))
}
