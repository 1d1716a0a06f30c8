// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Account and repository link store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Connection, Row};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::connection::{connect_options, is_connection_error, open_connection};
use crate::error::{DbError, Result};
use crate::types::{normalize_name, Account, RepositoryLink, StoreHealth, SyncOptions};

/// Pause between reopen attempts while the store is unreachable.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

#[async_trait]
pub trait AccountStore: Send + Sync {
	/// Register an account. The name is lower-cased; an existing name is a
	/// `Conflict`.
	async fn create_account(&self, account: &Account) -> Result<()>;

	async fn get_account(&self, name: &str) -> Result<Option<Account>>;

	async fn get_webhook_url(&self, name: &str) -> Result<Option<String>>;

	/// Overwrite channel, options and webhook. `false` means no such account.
	async fn update_account(&self, account: &Account) -> Result<bool>;

	/// Insert the link unless one exists. `false` means one already did.
	async fn create_repository_link(
		&self,
		account: &str,
		repository: &str,
		thread_id: u64,
	) -> Result<bool>;

	/// Point an existing link at a new thread, but only if it still points at
	/// `stale_thread_id`.
	async fn replace_repository_link(
		&self,
		account: &str,
		repository: &str,
		stale_thread_id: u64,
		new_thread_id: u64,
	) -> Result<bool>;

	async fn get_thread_id(&self, account: &str, repository: &str) -> Result<Option<u64>>;

	/// All links for an account, ordered by repository name.
	async fn list_repository_links(&self, account: &str) -> Result<Vec<RepositoryLink>>;
}

struct Inner {
	/// The single-slot gate. Whoever holds it owns the connection.
	gate: Arc<Mutex<SqliteConnection>>,
	options: SqliteConnectOptions,
	health: watch::Sender<StoreHealth>,
	recovering: AtomicBool,
}

/// SQLite-backed [`AccountStore`] over one connection.
#[derive(Clone)]
pub struct SqliteAccountStore {
	inner: Arc<Inner>,
}

// SQLite integers are signed; snowflakes round-trip through a bit cast.
fn to_db_id(id: u64) -> i64 {
	id as i64
}

fn from_db_id(id: i64) -> u64 {
	id as u64
}

fn row_to_account(row: &SqliteRow) -> std::result::Result<Account, sqlx::Error> {
	let sync_options: i64 = row.try_get("sync_options")?;
	Ok(Account {
		name: row.try_get("name")?,
		channel_id: from_db_id(row.try_get("channel_id")?),
		sync_options: SyncOptions::from_bits_truncate(sync_options as u8),
		webhook_url: row.try_get("webhook_url")?,
	})
}

fn row_to_link(row: &SqliteRow) -> std::result::Result<RepositoryLink, sqlx::Error> {
	Ok(RepositoryLink {
		account: row.try_get("account")?,
		repository: row.try_get("name")?,
		thread_id: from_db_id(row.try_get("thread_id")?),
	})
}

impl SqliteAccountStore {
	/// Open the database at `database_url`, creating file and schema if
	/// needed.
	#[tracing::instrument(skip(database_url))]
	pub async fn connect(database_url: &str) -> Result<Self> {
		let options = connect_options(database_url)?;
		let conn = open_connection(&options).await?;
		let (health, _) = watch::channel(StoreHealth::Healthy);

		info!("account store ready");
		Ok(Self {
			inner: Arc::new(Inner {
				gate: Arc::new(Mutex::new(conn)),
				options,
				health,
				recovering: AtomicBool::new(false),
			}),
		})
	}

	/// Subscribe to connection health changes.
	pub fn health(&self) -> watch::Receiver<StoreHealth> {
		self.inner.health.subscribe()
	}

	/// Start the detached recovery task unless one is already running.
	///
	/// The task takes the gate, reopens the connection every
	/// [`RECONNECT_INTERVAL`] until it succeeds, and only then releases the
	/// gate. It cannot be cancelled and never gives up.
	pub fn trigger_reconnect(&self) {
		if self.inner.recovering.swap(true, Ordering::SeqCst) {
			return;
		}
		self.inner
			.health
			.send_replace(StoreHealth::Reconnecting { attempts: 0 });

		let inner = self.inner.clone();
		tokio::spawn(async move {
			let mut conn = inner.gate.clone().lock_owned().await;
			let mut attempts: u32 = 0;

			loop {
				attempts += 1;
				inner
					.health
					.send_replace(StoreHealth::Reconnecting { attempts });

				match open_connection(&inner.options).await {
					Ok(fresh) => {
						*conn = fresh;
						break;
					}
					Err(e) => {
						error!(attempts, error = %e, "account store reconnect failed");
						tokio::time::sleep(RECONNECT_INTERVAL).await;
					}
				}
			}

			drop(conn);
			inner.recovering.store(false, Ordering::SeqCst);
			inner.health.send_replace(StoreHealth::Healthy);
			info!(attempts, "account store connection restored");
		});
	}

	/// Ping the connection every `interval`; a failed ping starts recovery.
	pub fn spawn_health_monitor(&self, interval: Duration) -> JoinHandle<()> {
		let store = self.clone();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			ticker.tick().await;
			loop {
				ticker.tick().await;
				if store.inner.recovering.load(Ordering::SeqCst) {
					continue;
				}

				let ping = {
					let mut conn = store.inner.gate.lock().await;
					conn.ping().await
				};
				if let Err(e) = ping {
					warn!(error = %e, "account store health check failed");
					store.trigger_reconnect();
				}
			}
		})
	}

	async fn wait_until_healthy(&self) {
		let mut health = self.inner.health.subscribe();
		// The sender lives in `self`, so this cannot observe a closed channel.
		let _ = health.wait_for(StoreHealth::is_healthy).await;
	}

	/// Run one command under the gate, retrying after recovery if the
	/// connection was lost.
	async fn run<T, F>(&self, operation: &'static str, command: F) -> Result<T>
	where
		T: Send,
		F: for<'c> Fn(&'c mut SqliteConnection) -> BoxFuture<'c, std::result::Result<T, sqlx::Error>>
			+ Send
			+ Sync,
	{
		loop {
			let result = {
				let mut conn = self.inner.gate.lock().await;
				command(&mut conn).await
			};

			match result {
				Err(e) if is_connection_error(&e) => {
					warn!(operation, error = %e, "account store connection lost, waiting for recovery");
					self.trigger_reconnect();
					self.wait_until_healthy().await;
				}
				other => return other.map_err(DbError::from),
			}
		}
	}
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
	#[tracing::instrument(skip(self, account), fields(account = %account.name))]
	async fn create_account(&self, account: &Account) -> Result<()> {
		let name = normalize_name(&account.name);
		let channel_id = to_db_id(account.channel_id);
		let sync_options = i64::from(account.sync_options.bits());
		let webhook_url = account.webhook_url.clone();

		self.run("create_account", |conn| {
			let name = name.clone();
			let webhook_url = webhook_url.clone();
			Box::pin(async move {
				sqlx::query(
					r#"
					INSERT INTO accounts (name, channel_id, sync_options, webhook_url)
					VALUES (?, ?, ?, ?)
					"#,
				)
				.bind(name)
				.bind(channel_id)
				.bind(sync_options)
				.bind(webhook_url)
				.execute(&mut *conn)
				.await
				.map(|_| ())
			})
		})
		.await
		.map_err(|e| match e {
			DbError::Sqlx(sqlx::Error::Database(ref db)) if db.is_unique_violation() => {
				DbError::Conflict(format!("Account {name} already exists"))
			}
			other => other,
		})
	}

	#[tracing::instrument(skip(self))]
	async fn get_account(&self, name: &str) -> Result<Option<Account>> {
		let name = normalize_name(name);
		self.run("get_account", |conn| {
			let name = name.clone();
			Box::pin(async move {
				let row = sqlx::query(
					r#"
					SELECT name, channel_id, sync_options, webhook_url
					FROM accounts
					WHERE name = ?
					"#,
				)
				.bind(name)
				.fetch_optional(&mut *conn)
				.await?;
				row.as_ref().map(row_to_account).transpose()
			})
		})
		.await
	}

	#[tracing::instrument(skip(self))]
	async fn get_webhook_url(&self, name: &str) -> Result<Option<String>> {
		let name = normalize_name(name);
		self.run("get_webhook_url", |conn| {
			let name = name.clone();
			Box::pin(async move {
				let url: Option<Option<String>> =
					sqlx::query_scalar("SELECT webhook_url FROM accounts WHERE name = ?")
						.bind(name)
						.fetch_optional(&mut *conn)
						.await?;
				Ok(url.flatten())
			})
		})
		.await
	}

	#[tracing::instrument(skip(self, account), fields(account = %account.name))]
	async fn update_account(&self, account: &Account) -> Result<bool> {
		let name = normalize_name(&account.name);
		let channel_id = to_db_id(account.channel_id);
		let sync_options = i64::from(account.sync_options.bits());
		let webhook_url = account.webhook_url.clone();

		self.run("update_account", |conn| {
			let name = name.clone();
			let webhook_url = webhook_url.clone();
			Box::pin(async move {
				let result = sqlx::query(
					r#"
					UPDATE accounts
					SET channel_id = ?, sync_options = ?, webhook_url = ?
					WHERE name = ?
					"#,
				)
				.bind(channel_id)
				.bind(sync_options)
				.bind(webhook_url)
				.bind(name)
				.execute(&mut *conn)
				.await?;
				Ok(result.rows_affected() == 1)
			})
		})
		.await
	}

	#[tracing::instrument(skip(self))]
	async fn create_repository_link(
		&self,
		account: &str,
		repository: &str,
		thread_id: u64,
	) -> Result<bool> {
		let account = normalize_name(account);
		let repository = normalize_name(repository);
		let thread_id = to_db_id(thread_id);

		self.run("create_repository_link", |conn| {
			let account = account.clone();
			let repository = repository.clone();
			Box::pin(async move {
				let result = sqlx::query(
					r#"
					INSERT INTO repositories (account, name, thread_id)
					VALUES (?, ?, ?)
					ON CONFLICT (account, name) DO NOTHING
					"#,
				)
				.bind(account)
				.bind(repository)
				.bind(thread_id)
				.execute(&mut *conn)
				.await?;
				Ok(result.rows_affected() == 1)
			})
		})
		.await
		.map_err(|e| match e {
			DbError::Sqlx(sqlx::Error::Database(ref db)) if db.is_foreign_key_violation() => {
				DbError::NotFound(format!("Account {account}"))
			}
			other => other,
		})
	}

	#[tracing::instrument(skip(self))]
	async fn replace_repository_link(
		&self,
		account: &str,
		repository: &str,
		stale_thread_id: u64,
		new_thread_id: u64,
	) -> Result<bool> {
		let account = normalize_name(account);
		let repository = normalize_name(repository);
		let stale = to_db_id(stale_thread_id);
		let fresh = to_db_id(new_thread_id);

		self.run("replace_repository_link", |conn| {
			let account = account.clone();
			let repository = repository.clone();
			Box::pin(async move {
				let result = sqlx::query(
					r#"
					UPDATE repositories
					SET thread_id = ?
					WHERE account = ? AND name = ? AND thread_id = ?
					"#,
				)
				.bind(fresh)
				.bind(account)
				.bind(repository)
				.bind(stale)
				.execute(&mut *conn)
				.await?;
				Ok(result.rows_affected() == 1)
			})
		})
		.await
	}

	#[tracing::instrument(skip(self))]
	async fn get_thread_id(&self, account: &str, repository: &str) -> Result<Option<u64>> {
		let account = normalize_name(account);
		let repository = normalize_name(repository);

		self.run("get_thread_id", |conn| {
			let account = account.clone();
			let repository = repository.clone();
			Box::pin(async move {
				let thread_id: Option<i64> = sqlx::query_scalar(
					"SELECT thread_id FROM repositories WHERE account = ? AND name = ?",
				)
				.bind(account)
				.bind(repository)
				.fetch_optional(&mut *conn)
				.await?;
				Ok(thread_id.map(from_db_id))
			})
		})
		.await
	}

	#[tracing::instrument(skip(self))]
	async fn list_repository_links(&self, account: &str) -> Result<Vec<RepositoryLink>> {
		let account = normalize_name(account);

		self.run("list_repository_links", |conn| {
			let account = account.clone();
			Box::pin(async move {
				let rows = sqlx::query(
					r#"
					SELECT account, name, thread_id
					FROM repositories
					WHERE account = ?
					ORDER BY name
					"#,
				)
				.bind(account)
				.fetch_all(&mut *conn)
				.await?;
				rows.iter().map(row_to_link).collect()
			})
		})
		.await
	}
}
