// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! A single RSA key pair shared by every test in the crate; generating one
//! takes a noticeable fraction of a second.

use std::sync::OnceLock;

use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs8::EncodePrivateKey;
use rsa::RsaPrivateKey;

struct KeyPair {
	private_pem: String,
	public_pem: String,
}

fn key_pair() -> &'static KeyPair {
	static KEYS: OnceLock<KeyPair> = OnceLock::new();
	KEYS.get_or_init(|| {
		let mut rng = rand::thread_rng();
		let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate RSA key");
		let public_key = private_key.to_public_key();

		KeyPair {
			private_pem: private_key
				.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
				.expect("Failed to convert private key to PEM")
				.to_string(),
			public_pem: public_key
				.to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
				.expect("Failed to convert public key to PEM"),
		}
	})
}

pub(crate) fn private_key_pem() -> &'static str {
	&key_pair().private_pem
}

pub(crate) fn public_key_pem() -> &'static str {
	&key_pair().public_pem
}
