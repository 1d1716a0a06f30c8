// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Discord bot credentials.

use gitcord_common_config::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

#[derive(Clone)]
pub struct DiscordBotConfig {
	pub token: SecretString,
	/// Hex-encoded Ed25519 key from the developer portal, checked to be 32 bytes.
	pub public_key: String,
	pub application_id: u64,
	pub base_url: String,
}

impl std::fmt::Debug for DiscordBotConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DiscordBotConfig")
			.field("token", &"[REDACTED]")
			.field("public_key", &self.public_key)
			.field("application_id", &self.application_id)
			.field("base_url", &self.base_url)
			.finish()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscordBotConfigLayer {
	#[serde(default)]
	pub token: Option<SecretString>,
	#[serde(default)]
	pub public_key: Option<String>,
	#[serde(default)]
	pub application_id: Option<u64>,
	#[serde(default)]
	pub base_url: Option<String>,
}

impl DiscordBotConfigLayer {
	pub fn merge(&mut self, other: DiscordBotConfigLayer) {
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.public_key.is_some() {
			self.public_key = other.public_key;
		}
		if other.application_id.is_some() {
			self.application_id = other.application_id;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
	}

	pub fn finalize(self) -> Result<DiscordBotConfig, ConfigError> {
		let token = self
			.token
			.filter(|t| !t.is_blank())
			.ok_or_else(|| ConfigError::missing_field("discord.token"))?;
		let public_key = self
			.public_key
			.map(|k| k.trim().to_string())
			.filter(|k| !k.is_empty())
			.ok_or_else(|| ConfigError::missing_field("discord.public_key"))?;
		validate_public_key(&public_key)?;
		let application_id = self
			.application_id
			.ok_or_else(|| ConfigError::missing_field("discord.application_id"))?;

		Ok(DiscordBotConfig {
			token,
			public_key,
			application_id,
			base_url: self
				.base_url
				.unwrap_or_else(|| DEFAULT_DISCORD_API_URL.to_string()),
		})
	}
}

fn validate_public_key(public_key: &str) -> Result<(), ConfigError> {
	let bytes = hex::decode(public_key)
		.map_err(|e| ConfigError::invalid_value("discord.public_key", format!("not hex: {e}")))?;
	if bytes.len() != 32 {
		return Err(ConfigError::invalid_value(
			"discord.public_key",
			format!("expected 32 bytes, got {}", bytes.len()),
		));
	}
	Ok(())
}
