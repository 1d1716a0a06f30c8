// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the Discord client.

use gitcord_common_config::SecretString;
use gitcord_common_webhook::{parse_public_key, VerifyingKey};
use reqwest::Url;

use crate::error::DiscordError;

pub const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10/";

/// Bot credentials and the application's interaction verification key.
#[derive(Clone)]
pub struct DiscordConfig {
	token: SecretString,
	public_key: VerifyingKey,
	application_id: u64,
	base_url: Url,
}

impl std::fmt::Debug for DiscordConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DiscordConfig")
			.field("token", &self.token)
			.field("public_key", &hex::encode(self.public_key.as_bytes()))
			.field("application_id", &self.application_id)
			.field("base_url", &self.base_url.as_str())
			.finish()
	}
}

/// Decode the hex public key from the developer portal.
///
/// Anything other than 64 hex characters describing a valid curve point is a
/// configuration error, caught at startup rather than on the first request.
pub fn parse_public_key_hex(raw: &str) -> Result<VerifyingKey, DiscordError> {
	let bytes = hex::decode(raw.trim())
		.map_err(|e| DiscordError::Config(format!("Discord public key is not hex: {e}")))?;
	parse_public_key(&bytes).map_err(|e| DiscordError::Config(e.to_string()))
}

impl DiscordConfig {
	pub fn new(token: SecretString, public_key_hex: &str, application_id: u64) -> Result<Self, DiscordError> {
		if token.is_blank() {
			return Err(DiscordError::Config("Discord bot token is empty".to_string()));
		}

		Ok(Self {
			token,
			public_key: parse_public_key_hex(public_key_hex)?,
			application_id,
			base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
		})
	}

	/// Override the REST base URL. Must be HTTPS.
	pub fn with_base_url(mut self, raw: &str) -> Result<Self, DiscordError> {
		let mut url = Url::parse(raw)
			.map_err(|e| DiscordError::Config(format!("Invalid Discord base URL '{raw}': {e}")))?;
		if url.scheme() != "https" {
			return Err(DiscordError::Config(format!(
				"Discord base URL must use https, got '{}'",
				url.scheme()
			)));
		}
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}
		self.base_url = url;
		Ok(self)
	}

	#[cfg(test)]
	pub(crate) fn with_unchecked_base_url(mut self, raw: &str) -> Self {
		let mut url = Url::parse(raw).expect("test URL is valid");
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}
		self.base_url = url;
		self
	}

	pub(crate) fn token(&self) -> &str {
		self.token.expose()
	}

	pub fn public_key(&self) -> &VerifyingKey {
		&self.public_key
	}

	pub fn application_id(&self) -> u64 {
		self.application_id
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}
}
