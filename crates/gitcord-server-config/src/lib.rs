// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the gitcord server.
//!
//! Values are layered from built-in defaults, a TOML file and
//! `GITCORD_SERVER_*` environment variables, in increasing precedence.
//!
//! ```ignore
//! use gitcord_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

use std::path::PathBuf;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub github_app: GitHubAppConfig,
	pub discord: DiscordBotConfig,
	pub dispatch: DispatchConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load from defaults, `/etc/gitcord/server.toml` and the environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Like [`load_config`] but reading the given file instead of the system one.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer, failing if a required credential is absent.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let dispatch = layer.dispatch.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let github_app = layer.github_app.unwrap_or_default().finalize()?;
	let discord = layer.discord.unwrap_or_default().finalize()?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		github_api = %github_app.base_url,
		discord_api = %discord.base_url,
		prune_stale_hooks = github_app.prune_stale_hooks,
		"server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		github_app,
		discord,
		dispatch,
		logging,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn complete_layer() -> ServerConfigLayer {
		toml::from_str(
			r#"
			[github_app]
			client_id = "Iv1.abc"
			private_key_pem = "pem"
			webhook_secret = "hunter2"

			[discord]
			token = "bot-token"
			public_key = "ea4a6c63e29c520abef5507b132ec5f9954776aebebe7b92421eea691446d22c"
			application_id = 1180000000000000001
			"#,
		)
		.unwrap()
	}

	#[test]
	fn test_socket_addr() {
		let mut layer = complete_layer();
		layer.http = Some(HttpConfigLayer {
			host: Some("127.0.0.1".to_string()),
			port: Some(9000),
		});
		let config = finalize(layer).unwrap();
		assert_eq!(config.socket_addr(), "127.0.0.1:9000");
	}

	#[test]
	fn test_missing_github_section_fails() {
		let mut layer = complete_layer();
		layer.github_app = None;
		assert!(matches!(finalize(layer), Err(ConfigError::MissingField(_))));
	}

	#[test]
	fn test_missing_discord_section_fails() {
		let mut layer = complete_layer();
		layer.discord = None;
		assert!(matches!(finalize(layer), Err(ConfigError::MissingField(_))));
	}

	#[test]
	fn test_unset_sections_use_defaults() {
		let config = finalize(complete_layer()).unwrap();
		assert_eq!(config.http, HttpConfig::default());
		assert_eq!(config.database, DatabaseConfig::default());
		assert_eq!(config.dispatch, DispatchConfig::default());
		assert_eq!(config.logging, LoggingConfig::default());
	}
}
