// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the GitHub App client.

use gitcord_common_config::SecretString;
use reqwest::Url;

use crate::error::GithubAppError;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// Configuration for the GitHub App client.
///
/// The private key and webhook secret are stored as [`SecretString`] so they
/// never show up in `Debug` output or logs.
#[derive(Clone)]
pub struct GithubAppConfig {
	/// App client id, used as the JWT issuer.
	client_id: String,

	/// PEM-encoded RSA private key for JWT signing.
	private_key_pem: SecretString,

	/// Shared secret for `X-Hub-Signature-256`.
	webhook_secret: SecretString,

	/// Base URL for the REST API (validated HTTPS, always ends in `/`).
	base_url: Url,

	/// Delete existing Discord-bound hooks on a repository before installing.
	prune_stale_hooks: bool,
}

impl std::fmt::Debug for GithubAppConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubAppConfig")
			.field("client_id", &self.client_id)
			.field("private_key_pem", &self.private_key_pem)
			.field("webhook_secret", &self.webhook_secret)
			.field("base_url", &self.base_url.as_str())
			.field("prune_stale_hooks", &self.prune_stale_hooks)
			.finish()
	}
}

impl GithubAppConfig {
	/// Validate and normalize a base URL.
	///
	/// Requirements:
	/// - Must be a valid URL
	/// - Must use HTTPS
	/// - Must have a host that is not loopback
	///
	/// A trailing slash is appended so relative joins keep any path prefix
	/// (`/api/v3` on GitHub Enterprise).
	pub fn validate_and_normalize_base_url(raw: &str) -> Result<Url, GithubAppError> {
		let mut url = Url::parse(raw)
			.map_err(|e| GithubAppError::Config(format!("Invalid GitHub base URL '{raw}': {e}")))?;

		if url.scheme() != "https" {
			return Err(GithubAppError::Config(format!(
				"GitHub base URL must use https, got '{}'",
				url.scheme()
			)));
		}

		let host = url
			.host_str()
			.ok_or_else(|| GithubAppError::Config("GitHub base URL must include a host".to_string()))?;

		if host == "localhost" || host == "127.0.0.1" || host == "[::1]" {
			return Err(GithubAppError::Config(
				"GitHub base URL must not be localhost".to_string(),
			));
		}

		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}

		Ok(url)
	}

	/// Create a configuration against `https://api.github.com/`.
	pub fn new(
		client_id: impl Into<String>,
		private_key_pem: SecretString,
		webhook_secret: SecretString,
	) -> Self {
		Self {
			client_id: client_id.into(),
			private_key_pem,
			webhook_secret,
			base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
			prune_stale_hooks: false,
		}
	}

	/// Point the client at a different API host (GitHub Enterprise).
	pub fn with_base_url(mut self, url: &str) -> Result<Self, GithubAppError> {
		self.base_url = Self::validate_and_normalize_base_url(url)?;
		Ok(self)
	}

	pub fn with_prune_stale_hooks(mut self, prune: bool) -> Self {
		self.prune_stale_hooks = prune;
		self
	}

	/// Bypass URL validation so tests can target a local mock server.
	#[cfg(test)]
	pub(crate) fn with_unchecked_base_url(mut self, url: &str) -> Self {
		let mut url = Url::parse(url).expect("test URL is valid");
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());
			url.set_path(&path);
		}
		self.base_url = url;
		self
	}

	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	pub(crate) fn private_key_pem(&self) -> &str {
		self.private_key_pem.expose()
	}

	/// Secret used to verify inbound deliveries.
	pub fn webhook_secret(&self) -> &SecretString {
		&self.webhook_secret
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub fn prune_stale_hooks(&self) -> bool {
		self.prune_stale_hooks
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> GithubAppConfig {
		GithubAppConfig::new(
			"Iv1.8a61f9b3a7aba766",
			SecretString::from("super-secret-key"),
			SecretString::from("webhook-secret"),
		)
	}

	#[test]
	fn defaults_to_public_github() {
		let config = config();
		assert_eq!(config.client_id(), "Iv1.8a61f9b3a7aba766");
		assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
		assert!(!config.prune_stale_hooks());
	}

	#[test]
	fn enterprise_base_url_keeps_path_prefix() {
		let config = config()
			.with_base_url("https://github.example.com/api/v3")
			.unwrap();
		assert_eq!(
			config.base_url().as_str(),
			"https://github.example.com/api/v3/"
		);
		assert_eq!(
			config.base_url().join("repos/octo/hello").unwrap().as_str(),
			"https://github.example.com/api/v3/repos/octo/hello"
		);
	}

	#[test]
	fn base_url_validation_rejects_http() {
		let result = GithubAppConfig::validate_and_normalize_base_url("http://api.github.com");
		assert!(result.unwrap_err().to_string().contains("https"));
	}

	#[test]
	fn base_url_validation_rejects_localhost() {
		let result = GithubAppConfig::validate_and_normalize_base_url("https://localhost:8080");
		assert!(result.unwrap_err().to_string().contains("localhost"));
	}

	#[test]
	fn base_url_validation_rejects_invalid_url() {
		assert!(GithubAppConfig::validate_and_normalize_base_url("not-a-url").is_err());
	}

	/// Verifies that Debug output never contains the private key or the
	/// webhook secret.
	#[test]
	fn debug_redacts_secrets() {
		let debug_str = format!("{:?}", config());

		assert!(!debug_str.contains("super-secret-key"));
		assert!(!debug_str.contains("webhook-secret"));
		assert!(debug_str.contains("[REDACTED]"));
	}
}
