// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Loading credentials from the environment.
//!
//! Every credential (`GITCORD_SERVER_DISCORD_TOKEN`,
//! `GITCORD_SERVER_GITHUB_APP_PRIVATE_KEY`, ...) may be given inline or as a
//! path in the matching `*_FILE` variable, which is how container secret
//! mounts usually surface them. The PEM private key in particular is almost
//! always supplied as a file.

use std::path::PathBuf;
use std::{env, fs};

use gitcord_common_secret::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Read `{var}_FILE` (preferred) or `{var}` into a [`SecretString`].
///
/// When reading from a file a single trailing newline is dropped. Returns
/// `Ok(None)` when neither variable is set.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path) = env::var(&file_var) {
		if path.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(path);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;
		let value = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(SecretString::new(value.to_string())));
	}

	Ok(env::var(var).ok().map(SecretString::new))
}

#[derive(Debug, Error)]
pub enum RequiredSecretError {
	#[error("required secret not found: set either {var} or {var}_FILE")]
	Missing { var: String },

	#[error(transparent)]
	Load(#[from] SecretEnvError),
}

/// Like [`load_secret_env`] but absence is an error.
pub fn require_secret_env(var: &str) -> Result<SecretString, RequiredSecretError> {
	load_secret_env(var)?.ok_or_else(|| RequiredSecretError::Missing {
		var: var.to_string(),
	})
}
