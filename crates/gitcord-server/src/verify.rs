// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Authentication of inbound GitHub deliveries and Discord interactions.

use axum::http::{header, HeaderMap};
use bytes::Bytes;
use gitcord_common_config::SecretString;
use gitcord_common_webhook::{verify_github_signature, verify_with_key, VerifyingKey};
use serde_json::Value;

use crate::error::ServerError;

pub const GITHUB_EVENT_HEADER: &str = "x-github-event";
pub const GITHUB_SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const DISCORD_TIMESTAMP_HEADER: &str = "x-signature-timestamp";
pub const DISCORD_SIGNATURE_HEADER: &str = "x-signature-ed25519";

/// A GitHub delivery whose body has been authenticated.
#[derive(Debug, Clone)]
pub struct GithubDelivery {
	pub event: String,
	pub body: Bytes,
	/// Lower-cased owner from the payload's `full_name`.
	pub account: Option<String>,
	/// Lower-cased repository from the payload's `full_name`.
	pub repository: Option<String>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
	headers.get(name).and_then(|v| v.to_str().ok())
}

/// The body must be exactly as long as the declared `Content-Length`.
pub fn check_content_length(headers: &HeaderMap, body: &[u8]) -> Result<(), ServerError> {
	let declared = headers
		.get(header::CONTENT_LENGTH)
		.ok_or_else(|| ServerError::BadRequest("Missing content length.".to_string()))?;
	let declared: usize = declared
		.to_str()
		.ok()
		.and_then(|v| v.trim().parse().ok())
		.ok_or_else(|| ServerError::BadRequest("Invalid content length.".to_string()))?;

	if declared != body.len() {
		return Err(ServerError::BadRequest("Content length mismatch.".to_string()));
	}
	Ok(())
}

fn find_full_name(value: &Value) -> Option<&str> {
	match value {
		Value::Object(map) => map
			.get("full_name")
			.and_then(Value::as_str)
			.or_else(|| map.values().find_map(find_full_name)),
		Value::Array(items) => items.iter().find_map(find_full_name),
		_ => None,
	}
}

/// Split the payload's `owner/repo` into lower-cased parts.
///
/// `repository.full_name` is preferred; otherwise the first `full_name`
/// found anywhere in the payload is used.
pub fn extract_full_name(payload: &Value) -> Option<(String, String)> {
	let full_name = payload
		.get("repository")
		.and_then(|r| r.get("full_name"))
		.and_then(Value::as_str)
		.or_else(|| find_full_name(payload))?;

	let (account, repository) = full_name.split_once('/')?;
	if account.is_empty() || repository.is_empty() {
		return None;
	}
	Some((account.to_lowercase(), repository.to_lowercase()))
}

/// Authenticate a GitHub delivery.
///
/// An unsigned delivery is accepted only for `ping`; a bad signature is
/// `Unauthorized`.
pub fn verify_github(
	headers: &HeaderMap,
	body: Bytes,
	secret: &SecretString,
) -> Result<GithubDelivery, ServerError> {
	check_content_length(headers, &body)?;

	let event = header_str(headers, GITHUB_EVENT_HEADER)
		.ok_or_else(|| ServerError::BadRequest("Missing X-GitHub-Event header.".to_string()))?
		.to_string();

	match header_str(headers, GITHUB_SIGNATURE_HEADER) {
		Some(signature) => {
			if !verify_github_signature(secret.expose().as_bytes(), &body, signature) {
				return Err(ServerError::Unauthorized("Invalid signature.".to_string()));
			}
		}
		None if event == "ping" => {
			tracing::debug!("accepting unsigned ping");
		}
		None => {
			return Err(ServerError::BadRequest(
				"Missing X-Hub-Signature-256 header.".to_string(),
			));
		}
	}

	let (account, repository) = serde_json::from_slice::<Value>(&body)
		.ok()
		.as_ref()
		.and_then(extract_full_name)
		.unzip();

	Ok(GithubDelivery {
		event,
		body,
		account,
		repository,
	})
}

/// Authenticate a Discord interaction: Ed25519 over `timestamp || body`.
pub fn verify_discord(
	headers: &HeaderMap,
	body: &[u8],
	public_key: &VerifyingKey,
) -> Result<(), ServerError> {
	check_content_length(headers, body)?;

	let timestamp = header_str(headers, DISCORD_TIMESTAMP_HEADER).ok_or_else(|| {
		ServerError::BadRequest("Missing X-Signature-Timestamp header.".to_string())
	})?;
	let signature_hex = header_str(headers, DISCORD_SIGNATURE_HEADER).ok_or_else(|| {
		ServerError::BadRequest("Missing X-Signature-Ed25519 header.".to_string())
	})?;

	let signature = hex::decode(signature_hex)
		.map_err(|_| ServerError::BadRequest("Signature is not valid hex.".to_string()))?;
	let signature: [u8; 64] = signature
		.try_into()
		.map_err(|_| ServerError::BadRequest("Signature must be 64 bytes.".to_string()))?;

	let mut message = Vec::with_capacity(timestamp.len() + body.len());
	message.extend_from_slice(timestamp.as_bytes());
	message.extend_from_slice(body);

	if !verify_with_key(public_key, &message, &signature) {
		return Err(ServerError::Unauthorized("Invalid signature.".to_string()));
	}
	Ok(())
}
