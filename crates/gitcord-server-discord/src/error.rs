// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use gitcord_common_http::DispatchError;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum DiscordError {
	#[error("Network error: {0}")]
	Network(#[source] reqwest::Error),

	#[error("Request timed out")]
	Timeout,

	/// The bot token was rejected.
	#[error("Discord rejected the bot token")]
	Unauthorized,

	/// The bot lacks a permission (Manage Webhooks, Create Posts, ...).
	#[error("Missing Discord permissions: {0}")]
	Forbidden(String),

	#[error("Discord channel {0} not found")]
	ChannelNotFound(u64),

	#[error("Discord API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	#[error("Invalid response from Discord: {0}")]
	InvalidResponse(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Request cancelled")]
	Cancelled,
}

impl From<reqwest::Error> for DiscordError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			Self::Timeout
		} else {
			Self::Network(e)
		}
	}
}

impl From<DispatchError> for DiscordError {
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

pub(crate) fn map_discord_error(status: StatusCode, body: &str) -> DiscordError {
	match status {
		StatusCode::UNAUTHORIZED => DiscordError::Unauthorized,
		StatusCode::FORBIDDEN => DiscordError::Forbidden(body.to_string()),
		_ => {
			error!(status = %status, body = %body, "Discord API error");
			DiscordError::ApiError {
				status: status.as_u16(),
				message: body.to_string(),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_mapping() {
		assert!(matches!(
			map_discord_error(StatusCode::UNAUTHORIZED, "401: Unauthorized"),
			DiscordError::Unauthorized
		));
		assert!(matches!(
			map_discord_error(StatusCode::FORBIDDEN, r#"{"message": "Missing Permissions", "code": 50013}"#),
			DiscordError::Forbidden(_)
		));
		assert!(matches!(
			map_discord_error(StatusCode::BAD_GATEWAY, ""),
			DiscordError::ApiError { status: 502, .. }
		));
	}
}
