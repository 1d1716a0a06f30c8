// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the GitHub App client.

use gitcord_common_http::DispatchError;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::error;

/// Errors that can occur when talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GithubAppError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[source] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// The App JWT or installation token was rejected.
	#[error("Unauthorized or invalid app configuration")]
	Unauthorized,

	/// Forbidden - insufficient permissions.
	#[error("Forbidden or insufficient permissions")]
	Forbidden,

	/// Secondary rate limit, reported by GitHub as a 403.
	#[error("Rate limit exceeded")]
	RateLimited,

	/// GitHub API returned an error.
	#[error("GitHub API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	/// The response did not have the shape GitHub documents.
	#[error("Invalid response from GitHub: {0}")]
	InvalidResponse(String),

	/// Configuration error.
	#[error("Configuration error: {0}")]
	Config(String),

	/// JWT signing/encoding error.
	#[error("JWT error: {0}")]
	Jwt(String),

	/// The caller gave up on the request.
	#[error("Request cancelled")]
	Cancelled,
}

impl GithubAppError {
	/// Create an API error from status code and message.
	pub fn api_error(status: u16, message: impl Into<String>) -> Self {
		Self::ApiError {
			status,
			message: message.into(),
		}
	}

	/// True when GitHub answered 404.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::ApiError { status: 404, .. })
	}
}

impl From<reqwest::Error> for GithubAppError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			Self::Timeout
		} else {
			Self::Network(e)
		}
	}
}

impl From<DispatchError> for GithubAppError {
	fn from(e: DispatchError) -> Self {
		match e {
			DispatchError::Request(e) => e.into(),
			DispatchError::NotReplayable => {
				Self::Config("request body cannot be replayed after a rate limit".to_string())
			}
			DispatchError::Cancelled => Self::Cancelled,
		}
	}
}

/// Map a non-success GitHub response to an error.
pub(crate) fn map_github_error(status: StatusCode, body: &str) -> GithubAppError {
	match status {
		StatusCode::UNAUTHORIZED => GithubAppError::Unauthorized,
		StatusCode::FORBIDDEN => {
			if body.to_lowercase().contains("rate limit") {
				GithubAppError::RateLimited
			} else {
				GithubAppError::Forbidden
			}
		}
		_ => {
			error!(status = %status, body = %body, "GitHub API error");
			GithubAppError::api_error(status.as_u16(), body)
		}
	}
}
