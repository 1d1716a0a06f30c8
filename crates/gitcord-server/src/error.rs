// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use gitcord_server_db::DbError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Database error: {0}")]
	Db(#[from] DbError),

	/// Malformed request: missing headers, bad lengths, undecodable payload.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	/// Signature mismatch.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	#[error("Not found: {0}")]
	NotFound(String),

	/// A GitHub or Discord call failed and the operation was aborted.
	#[error("Upstream error: {0}")]
	Upstream(String),

	#[error("Internal error: {0}")]
	Internal(String),

	/// Event, action or interaction type gitcord does not handle.
	#[error("Not implemented: {0}")]
	NotImplemented(String),

	/// The caller went away before the operation finished.
	#[error("Request cancelled")]
	Cancelled,
}

impl ServerError {
	pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
		Self::Upstream(format!("{context}: {err}"))
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	fn new(error: &str, message: impl Into<String>) -> Self {
		Self {
			error: error.to_string(),
			message: message.into(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			ServerError::Db(DbError::NotFound(msg)) => (
				StatusCode::NOT_FOUND,
				ErrorResponse::new("not_found", msg.clone()),
			),
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::Unauthorized(msg) => {
				tracing::warn!(reason = %msg, "rejected unauthenticated request");
				(
					StatusCode::UNAUTHORIZED,
					ErrorResponse::new("unauthorized", msg.clone()),
				)
			}
			ServerError::NotFound(msg) => (
				StatusCode::NOT_FOUND,
				ErrorResponse::new("not_found", msg.clone()),
			),
			ServerError::Upstream(msg) => {
				tracing::error!(error = %msg, "upstream call failed");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("upstream_error", msg.clone()),
				)
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
			ServerError::NotImplemented(msg) => (
				StatusCode::NOT_IMPLEMENTED,
				ErrorResponse::new("not_implemented", msg.clone()),
			),
			ServerError::Cancelled => (
				StatusCode::REQUEST_TIMEOUT,
				ErrorResponse::new("cancelled", "Request cancelled"),
			),
		};

		(status, Json(body)).into_response()
	}
}
