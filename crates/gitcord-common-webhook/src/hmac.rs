// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HMAC-SHA256 signatures as used by GitHub webhook deliveries.

use ::hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix GitHub puts in front of the hex digest in `X-Hub-Signature-256`.
pub const GITHUB_SIGNATURE_PREFIX: &str = "sha256=";

fn mac(secret: &[u8]) -> HmacSha256 {
	HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size")
}

/// Lower-case hex HMAC-SHA256 of `payload`, without prefix.
pub fn compute_hmac_sha256(secret: &[u8], payload: &[u8]) -> String {
	let mut mac = mac(secret);
	mac.update(payload);
	hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a bare hex digest (either case).
pub fn verify_hmac_sha256(secret: &[u8], payload: &[u8], signature_hex: &str) -> bool {
	let Ok(expected) = hex::decode(signature_hex) else {
		return false;
	};

	let mut mac = mac(secret);
	mac.update(payload);
	mac.verify_slice(&expected).is_ok()
}

/// The `X-Hub-Signature-256` value GitHub would send for `body`.
pub fn github_signature(secret: &[u8], body: &[u8]) -> String {
	format!("{GITHUB_SIGNATURE_PREFIX}{}", compute_hmac_sha256(secret, body))
}

/// Verify an `X-Hub-Signature-256` header against `body`.
///
/// Equivalent to a case-insensitive comparison of the full header with
/// [`github_signature`], but the digest itself is compared in constant time.
pub fn verify_github_signature(secret: &[u8], body: &[u8], header: &str) -> bool {
	let prefix_len = GITHUB_SIGNATURE_PREFIX.len();
	let Some(prefix) = header.get(..prefix_len) else {
		return false;
	};
	if !prefix.eq_ignore_ascii_case(GITHUB_SIGNATURE_PREFIX) {
		return false;
	}

	verify_hmac_sha256(secret, body, &header[prefix_len..])
}
