// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and the environment.

use std::path::PathBuf;

use gitcord_common_config::{load_secret_env, SecretString};
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, DiscordBotConfigLayer, DispatchConfigLayer, GitHubAppConfigLayer,
	HttpConfigLayer, LogFormat, LoggingConfigLayer,
};

pub const SYSTEM_CONFIG_PATH: &str = "/etc/gitcord/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `GITCORD_SERVER_<SECTION>_<FIELD>`. Credentials also accept a
/// `_FILE` variant.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()?),
			github_app: Some(load_github_app_from_env()?),
			discord: Some(load_discord_from_env()?),
			dispatch: Some(load_dispatch_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v
			.parse()
			.map(Some)
			.map_err(|_| ConfigError::invalid_value(name, format!("invalid {kind} value '{v}'"))),
		None => Ok(None),
	}
}

fn env_secret(name: &str) -> Result<Option<SecretString>, ConfigError> {
	load_secret_env(name).map_err(|e| ConfigError::Secret(e.to_string()))
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("GITCORD_SERVER_HOST"),
		port: env_parse("GITCORD_SERVER_PORT", "u16")?,
	})
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("GITCORD_SERVER_DATABASE_URL"),
		health_check_interval_secs: env_parse(
			"GITCORD_SERVER_DATABASE_HEALTH_CHECK_INTERVAL_SECS",
			"u64",
		)?,
	})
}

fn load_github_app_from_env() -> Result<GitHubAppConfigLayer, ConfigError> {
	Ok(GitHubAppConfigLayer {
		client_id: env_var("GITCORD_SERVER_GITHUB_APP_CLIENT_ID"),
		private_key_pem: env_secret("GITCORD_SERVER_GITHUB_APP_PRIVATE_KEY")?,
		webhook_secret: env_secret("GITCORD_SERVER_GITHUB_APP_WEBHOOK_SECRET")?,
		base_url: env_var("GITCORD_SERVER_GITHUB_APP_BASE_URL"),
		prune_stale_hooks: env_bool("GITCORD_SERVER_GITHUB_APP_PRUNE_STALE_HOOKS"),
	})
}

fn load_discord_from_env() -> Result<DiscordBotConfigLayer, ConfigError> {
	Ok(DiscordBotConfigLayer {
		token: env_secret("GITCORD_SERVER_DISCORD_TOKEN")?,
		public_key: env_var("GITCORD_SERVER_DISCORD_PUBLIC_KEY"),
		application_id: env_parse("GITCORD_SERVER_DISCORD_APPLICATION_ID", "u64")?,
		base_url: env_var("GITCORD_SERVER_DISCORD_BASE_URL"),
	})
}

fn load_dispatch_from_env() -> Result<DispatchConfigLayer, ConfigError> {
	Ok(DispatchConfigLayer {
		fallback_wait_secs: env_parse("GITCORD_SERVER_DISPATCH_FALLBACK_WAIT_SECS", "u64")?,
		request_timeout_secs: env_parse("GITCORD_SERVER_DISPATCH_REQUEST_TIMEOUT_SECS", "u64")?,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("GITCORD_SERVER_LOG_LEVEL"),
		format: env_var("GITCORD_SERVER_LOG_FORMAT").map(|v| LogFormat::parse_lenient(&v)),
	}
}
