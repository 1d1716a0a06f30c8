// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! JWT generation for GitHub App authentication.

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::GithubAppError;

/// Backdate applied to `iat` to absorb clock drift against GitHub.
pub const JWT_BACKDATE_SECS: i64 = 10;

/// GitHub's maximum App JWT lifetime.
pub const JWT_LIFETIME_SECS: i64 = 600;

/// JWT claims for GitHub App authentication.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
	/// Issued at, seconds since epoch.
	pub iat: i64,
	/// Expiration, seconds since epoch.
	pub exp: i64,
	/// Issuer: the App's client id.
	pub iss: String,
}

/// Generate an RS256 JWT for GitHub App authentication.
///
/// Claims are `iat = now - 10s`, `exp = now + 600s` and `iss = client_id`.
#[instrument(skip(private_key_pem))]
pub fn generate_app_jwt(
	client_id: &str,
	private_key_pem: &str,
	now: DateTime<Utc>,
) -> Result<String, GithubAppError> {
	let now = now.timestamp();
	let claims = Claims {
		iat: now - JWT_BACKDATE_SECS,
		exp: now + JWT_LIFETIME_SECS,
		iss: client_id.to_string(),
	};

	let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
		.map_err(|e| GithubAppError::Jwt(format!("Invalid RSA private key: {e}")))?;

	let token = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
		.map_err(|e| GithubAppError::Jwt(format!("Failed to encode JWT: {e}")))?;

	debug!(client_id, exp = claims.exp, "Generated GitHub App JWT");

	Ok(token)
}
