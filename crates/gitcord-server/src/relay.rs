// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Forwarding of GitHub deliveries to the account's Discord webhook.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Response};
use gitcord_common_http::{CancellationToken, DispatchError, RateLimitedClient};
use gitcord_server_db::{AccountStore, DbError};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::ServerError;

/// Request headers copied from the GitHub delivery to Discord.
pub const FORWARDED_HEADERS: &[&str] = &[
	"user-agent",
	"x-github-event",
	"x-github-delivery",
	"x-github-hook-id",
	"x-github-hook-installation-target-id",
	"x-github-hook-installation-target-type",
];

/// Response headers that describe the downstream connection, not the payload.
const HOP_BY_HOP: &[&str] = &[
	"connection",
	"keep-alive",
	"proxy-authenticate",
	"proxy-authorization",
	"te",
	"trailer",
	"transfer-encoding",
	"upgrade",
];

#[derive(Clone)]
pub struct EventRelay {
	store: Arc<dyn AccountStore>,
	http: RateLimitedClient,
}

/// `{webhook_url}?thread_id={id}` when the repository has a thread.
pub fn relay_target(webhook_url: &str, thread_id: Option<u64>) -> String {
	match thread_id {
		Some(thread_id) => format!("{webhook_url}?thread_id={thread_id}"),
		None => webhook_url.to_string(),
	}
}

fn forwarded_headers(incoming: &HeaderMap) -> HeaderMap {
	let mut headers = HeaderMap::new();
	for name in FORWARDED_HEADERS {
		if let Some(value) = incoming.get(*name) {
			headers.insert(HeaderName::from_static(*name), value.clone());
		}
	}
	headers.insert(
		header::CONTENT_TYPE,
		header::HeaderValue::from_static("application/json"),
	);
	headers
}

/// Run a store command unless the request is cancelled first.
async fn lookup<T>(
	cancel: &CancellationToken,
	command: impl Future<Output = Result<T, DbError>>,
) -> Result<T, ServerError> {
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(ServerError::Cancelled),
		result = command => Ok(result?),
	}
}

impl EventRelay {
	pub fn new(store: Arc<dyn AccountStore>, http: RateLimitedClient) -> Self {
		Self { store, http }
	}

	/// Forward `body` and hand back Discord's response unchanged.
	#[instrument(skip(self, headers, body, cancel))]
	pub async fn relay(
		&self,
		account: &str,
		repository: Option<&str>,
		headers: &HeaderMap,
		body: &[u8],
		cancel: &CancellationToken,
	) -> Result<Response<Body>, ServerError> {
		let webhook_url = lookup(cancel, self.store.get_webhook_url(account))
			.await?
			.ok_or_else(|| ServerError::NotFound(format!("No webhook registered for {account}")))?;

		let thread_id = match repository {
			Some(repository) => lookup(cancel, self.store.get_thread_id(account, repository)).await?,
			None => None,
		};
		let target = relay_target(&webhook_url, thread_id);

		let payload: Value = serde_json::from_slice(body)
			.map_err(|e| ServerError::BadRequest(format!("Payload is not JSON: {e}")))?;
		let payload = serde_json::to_vec(&payload)
			.map_err(|e| ServerError::Internal(format!("re-serialize payload: {e}")))?;

		debug!(thread_id, "forwarding delivery to Discord");
		let request = self
			.http
			.http()
			.post(&target)
			.headers(forwarded_headers(headers))
			.body(payload);

		let upstream = self
			.http
			.send_cancellable(request, cancel)
			.await
			.map_err(|e| match e {
				DispatchError::Cancelled => ServerError::Cancelled,
				other => ServerError::upstream("forward delivery", other),
			})?;

		let status = upstream.status();
		let mut response_headers = upstream.headers().clone();
		for name in HOP_BY_HOP {
			response_headers.remove(*name);
		}
		let bytes = upstream
			.bytes()
			.await
			.map_err(|e| ServerError::upstream("read Discord response", e))?;

		info!(status = status.as_u16(), thread_id, "delivery relayed");

		let mut response = Response::new(Body::from(bytes));
		*response.status_mut() = status;
		*response.headers_mut() = response_headers;
		Ok(response)
	}
}
