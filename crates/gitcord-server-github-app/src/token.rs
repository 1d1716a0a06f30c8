// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Installation access tokens and their process-wide cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gitcord_common_config::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info, trace};

/// Refresh this many seconds before `expires_at` so a token never lapses
/// mid-request.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 120;

/// An installation-scoped bearer token.
#[derive(Clone, Debug)]
pub struct InstallationToken {
	pub token: SecretString,
	pub expires_at: DateTime<Utc>,
}

impl InstallationToken {
	pub fn new(token: impl Into<SecretString>, expires_at: DateTime<Utc>) -> Self {
		Self {
			token: token.into(),
			expires_at,
		}
	}

	pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}

	/// True once `now` is within `margin` of expiry.
	pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
		now + margin >= self.expires_at
	}

	pub(crate) fn bearer(&self) -> &str {
		self.token.expose()
	}
}

/// Tokens are requested for a specific repository set, so the scope is part
/// of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
	installation_id: i64,
	repository_ids: Vec<i64>,
}

impl CacheKey {
	fn new(installation_id: i64, repository_ids: &[i64]) -> Self {
		let mut repository_ids = repository_ids.to_vec();
		repository_ids.sort_unstable();
		repository_ids.dedup();
		Self {
			installation_id,
			repository_ids,
		}
	}
}

/// Process-wide installation token cache.
///
/// Fetches are serialized per installation with double-checked locking, so
/// concurrent installation events for the same account exchange one JWT.
#[derive(Clone)]
pub struct InstallationTokenCache {
	tokens: Arc<Mutex<HashMap<CacheKey, InstallationToken>>>,
	locks: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
	margin: Duration,
}

impl Default for InstallationTokenCache {
	fn default() -> Self {
		Self::new(Duration::seconds(TOKEN_REFRESH_MARGIN_SECS))
	}
}

impl InstallationTokenCache {
	pub fn new(margin: Duration) -> Self {
		Self {
			tokens: Arc::new(Mutex::new(HashMap::new())),
			locks: Arc::new(Mutex::new(HashMap::new())),
			margin,
		}
	}

	async fn installation_lock(&self, installation_id: i64) -> Arc<Mutex<()>> {
		let mut locks = self.locks.lock().await;
		locks
			.entry(installation_id)
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	/// Forget installation locks nobody holds whose installation has no
	/// cached token left.
	async fn prune_locks(&self, tokens: &HashMap<CacheKey, InstallationToken>) {
		let mut locks = self.locks.lock().await;
		locks.retain(|installation_id, lock| {
			Arc::strong_count(lock) > 1
				|| tokens.keys().any(|key| key.installation_id == *installation_id)
		});
	}

	async fn cached(&self, key: &CacheKey) -> Option<InstallationToken> {
		let tokens = self.tokens.lock().await;
		tokens
			.get(key)
			.filter(|token| !token.expires_within(Utc::now(), self.margin))
			.cloned()
	}

	/// Return a live cached token for the scope, or run `fetch` and cache
	/// its result.
	pub async fn get_or_fetch<F, Fut, E>(
		&self,
		installation_id: i64,
		repository_ids: &[i64],
		fetch: F,
	) -> Result<InstallationToken, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<InstallationToken, E>>,
	{
		let key = CacheKey::new(installation_id, repository_ids);

		if let Some(token) = self.cached(&key).await {
			trace!(installation_id, "Using cached installation token");
			return Ok(token);
		}

		let lock = self.installation_lock(installation_id).await;
		let _guard = lock.lock().await;

		if let Some(token) = self.cached(&key).await {
			trace!(installation_id, "Using cached installation token (post-lock)");
			return Ok(token);
		}

		debug!(installation_id, "Fetching new installation token");
		let token = fetch().await?;

		let mut tokens = self.tokens.lock().await;
		tokens.retain(|_, cached| !cached.is_expired(Utc::now()));
		tokens.insert(key, token.clone());
		self.prune_locks(&tokens).await;

		info!(installation_id, expires_at = %token.expires_at, "Installation token refreshed");
		Ok(token)
	}

	/// Drop every cached token for an installation.
	pub async fn invalidate(&self, installation_id: i64) {
		let mut tokens = self.tokens.lock().await;
		let before = tokens.len();
		tokens.retain(|key, _| key.installation_id != installation_id);
		self.prune_locks(&tokens).await;
		if tokens.len() != before {
			info!(installation_id, "Invalidated installation token cache");
		}
	}
}
