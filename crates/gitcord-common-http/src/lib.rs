// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for gitcord.
//!
//! This crate provides:
//! - A pre-configured HTTP client with a consistent User-Agent header
//! - [`RateLimitedClient`], which absorbs HTTP 429 responses from GitHub and
//!   Discord by waiting for the advertised reset time

mod client;
mod ratelimit;

pub use client::{builder, new_client_with_timeout, user_agent};
pub use ratelimit::{
	rate_limit_wait, Clock, DispatchError, RateLimitedClient, SystemClock,
	DEFAULT_RATE_LIMIT_WAIT, RATE_LIMIT_RESET_HEADER,
};
pub use tokio_util::sync::CancellationToken;
