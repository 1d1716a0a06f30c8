// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Ed25519 verification for Discord interaction callbacks.

use ed25519_dalek::{Signature, VerifyingKey};
use thiserror::Error;

pub const ED25519_SIGNATURE_LENGTH: usize = 64;
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// Misuse of the primitive, as opposed to a signature that simply does not
/// match (which is `Ok(false)`).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
	#[error("ed25519 signature must be {ED25519_SIGNATURE_LENGTH} bytes, got {0}")]
	SignatureLength(usize),

	#[error("ed25519 public key must be {ED25519_PUBLIC_KEY_LENGTH} bytes, got {0}")]
	PublicKeyLength(usize),

	#[error("ed25519 public key is not a valid curve point")]
	MalformedPublicKey,
}

/// Parse a 32-byte public key. Used once at startup for Discord's key.
pub fn parse_public_key(bytes: &[u8]) -> Result<VerifyingKey, SignatureError> {
	let bytes: &[u8; ED25519_PUBLIC_KEY_LENGTH] = bytes
		.try_into()
		.map_err(|_| SignatureError::PublicKeyLength(bytes.len()))?;
	VerifyingKey::from_bytes(bytes).map_err(|_| SignatureError::MalformedPublicKey)
}

/// Verify `signature` over `message` with `public_key`.
///
/// Discord signs `timestamp || body`; callers concatenate before calling.
/// Lengths are checked before any cryptography runs, and the comparison
/// itself is left to the library.
pub fn verify_ed25519(
	public_key: &[u8],
	message: &[u8],
	signature: &[u8],
) -> Result<bool, SignatureError> {
	let signature: &[u8; ED25519_SIGNATURE_LENGTH] = signature
		.try_into()
		.map_err(|_| SignatureError::SignatureLength(signature.len()))?;
	let key = parse_public_key(public_key)?;
	Ok(verify_with_key(&key, message, signature))
}

/// Verify against an already parsed key.
pub fn verify_with_key(
	key: &VerifyingKey,
	message: &[u8],
	signature: &[u8; ED25519_SIGNATURE_LENGTH],
) -> bool {
	let signature = Signature::from_bytes(signature);
	key.verify_strict(message, &signature).is_ok()
}
