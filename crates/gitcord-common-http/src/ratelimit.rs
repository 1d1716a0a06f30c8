// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Rate-limit-aware request dispatch.
//!
//! GitHub and Discord both answer bursts with `429 Too Many Requests` and an
//! `X-RateLimit-Reset` header holding the Unix time (seconds, possibly
//! fractional) at which the bucket refills. [`RateLimitedClient::send`] waits
//! until then and replays the request, so callers never observe a 429.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Wait used when a 429 carries no usable reset header.
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(15);

/// Source of "now" as fractional Unix seconds.
pub trait Clock: Send + Sync {
	fn unix_now(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn unix_now(&self) -> f64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs_f64())
			.unwrap_or_default()
	}
}

#[derive(Debug, Error)]
pub enum DispatchError {
	#[error("HTTP request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("request body is streamed and cannot be replayed after a rate limit")]
	NotReplayable,

	#[error("request cancelled")]
	Cancelled,
}

/// How long to wait after a 429 with these response headers.
///
/// `max(0, reset - now)` when the reset header parses as a finite number,
/// otherwise `fallback`.
pub fn rate_limit_wait(headers: &HeaderMap, now: f64, fallback: Duration) -> Duration {
	let reset = headers
		.get(RATE_LIMIT_RESET_HEADER)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| v.trim().parse::<f64>().ok())
		.filter(|v| v.is_finite());

	match reset {
		Some(reset) => Duration::try_from_secs_f64((reset - now).max(0.0)).unwrap_or(fallback),
		None => fallback,
	}
}

/// Outbound HTTP client that transparently waits out rate limits.
#[derive(Clone)]
pub struct RateLimitedClient {
	client: Client,
	clock: Arc<dyn Clock>,
	fallback_wait: Duration,
}

impl std::fmt::Debug for RateLimitedClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RateLimitedClient")
			.field("fallback_wait", &self.fallback_wait)
			.finish_non_exhaustive()
	}
}

impl RateLimitedClient {
	pub fn new(client: Client) -> Self {
		Self {
			client,
			clock: Arc::new(SystemClock),
			fallback_wait: DEFAULT_RATE_LIMIT_WAIT,
		}
	}

	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	pub fn with_fallback_wait(mut self, wait: Duration) -> Self {
		self.fallback_wait = wait;
		self
	}

	/// The underlying client, for building requests.
	pub fn http(&self) -> &Client {
		&self.client
	}

	/// Send `request`, retrying after every 429 until another status arrives.
	pub async fn send(&self, request: RequestBuilder) -> Result<Response, DispatchError> {
		self.send_cancellable(request, &CancellationToken::new()).await
	}

	/// Like [`send`](Self::send), but both the request and any rate-limit wait
	/// stop as soon as `cancel` fires.
	pub async fn send_cancellable(
		&self,
		request: RequestBuilder,
		cancel: &CancellationToken,
	) -> Result<Response, DispatchError> {
		let request = request.build()?;
		let method = request.method().clone();
		// Webhook URLs embed credentials in the path, so only the host is logged.
		let host = request.url().host_str().unwrap_or_default().to_string();
		let mut attempt: u32 = 0;

		loop {
			let replay = request.try_clone().ok_or(DispatchError::NotReplayable)?;
			attempt += 1;

			let response = tokio::select! {
				biased;
				_ = cancel.cancelled() => return Err(DispatchError::Cancelled),
				result = self.client.execute(replay) => result?,
			};

			if response.status() != StatusCode::TOO_MANY_REQUESTS {
				if attempt > 1 {
					debug!(%method, %host, attempt, status = response.status().as_u16(), "request succeeded after rate limit");
				}
				return Ok(response);
			}

			let wait = rate_limit_wait(response.headers(), self.clock.unix_now(), self.fallback_wait);
			warn!(
				%method,
				%host,
				attempt,
				wait_ms = wait.as_millis() as u64,
				"rate limited, waiting for reset before retrying"
			);

			tokio::select! {
				biased;
				_ = cancel.cancelled() => return Err(DispatchError::Cancelled),
				_ = tokio::time::sleep(wait) => {}
			}
		}
	}
}
