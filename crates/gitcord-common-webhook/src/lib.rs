// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Signature primitives for the two inbound webhook schemes.
//!
//! - [`hmac`]: GitHub's `X-Hub-Signature-256` (HMAC-SHA256 over the raw body).
//! - [`ed25519`]: Discord's `X-Signature-Ed25519` over `timestamp || body`.
//!
//! Both are pure functions; header parsing and HTTP status mapping live in the
//! server crate.

pub mod ed25519;
pub mod hmac;

pub use self::ed25519::{
	parse_public_key, verify_ed25519, verify_with_key, SignatureError, ED25519_PUBLIC_KEY_LENGTH,
	ED25519_SIGNATURE_LENGTH,
};
pub use ed25519_dalek::VerifyingKey;
pub use self::hmac::{
	compute_hmac_sha256, github_signature, verify_github_signature, verify_hmac_sha256,
	GITHUB_SIGNATURE_PREFIX,
};
