// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Outbound request dispatch settings.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_FALLBACK_WAIT_SECS: u64 = 15;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
	/// Wait applied to a 429 that carries no usable reset header.
	pub fallback_wait: Duration,
	pub request_timeout: Duration,
}

impl Default for DispatchConfig {
	fn default() -> Self {
		DispatchConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchConfigLayer {
	#[serde(default)]
	pub fallback_wait_secs: Option<u64>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

impl DispatchConfigLayer {
	pub fn merge(&mut self, other: DispatchConfigLayer) {
		if other.fallback_wait_secs.is_some() {
			self.fallback_wait_secs = other.fallback_wait_secs;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
	}

	pub fn finalize(self) -> DispatchConfig {
		DispatchConfig {
			fallback_wait: Duration::from_secs(
				self.fallback_wait_secs.unwrap_or(DEFAULT_FALLBACK_WAIT_SECS),
			),
			request_timeout: Duration::from_secs(
				self
					.request_timeout_secs
					.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
			),
		}
	}
}
