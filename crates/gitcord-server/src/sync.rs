// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Bulk linking of a freshly installed GitHub App's repositories to Discord
//! threads.
//!
//! Filter mismatches skip a repository. Any failed GitHub or Discord call
//! aborts the whole installation; a redelivery picks up where it stopped
//! because already-linked repositories with a live thread are skipped.

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use gitcord_common_http::CancellationToken;
use gitcord_server_db::{Account, AccountStore, SyncOptions};
use gitcord_server_discord::{DiscordProvisioner, ThreadIntro};
use gitcord_server_github_app::token::TOKEN_REFRESH_MARGIN_SECS;
use gitcord_server_github_app::{GithubApi, InstallationToken, WEBHOOK_ALL_EVENTS};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::ServerError;

pub const THREAD_INTRO_COLOR: u32 = 0x6b73db;

pub const ACCOUNT_NOT_LINKED: &str =
	"Please sync your account with the Discord bot before installing the GitHub app.";

#[derive(Debug, Deserialize)]
pub struct InstallationEvent {
	pub action: String,
	pub installation: Installation,
	#[serde(default)]
	pub repositories: Vec<InstallationRepository>,
}

#[derive(Debug, Deserialize)]
pub struct Installation {
	pub id: i64,
	pub account: InstallationAccount,
}

#[derive(Debug, Deserialize)]
pub struct InstallationAccount {
	pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationRepository {
	pub id: i64,
	pub name: String,
	pub full_name: String,
	#[serde(default)]
	pub private: bool,
}

/// Outcome counts for one installation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
	/// Repositories given a new thread and webhook.
	pub linked: usize,
	/// Repositories excluded by the account's sync options.
	pub skipped: usize,
	/// Repositories whose thread already exists.
	pub already_linked: usize,
	pub total: usize,
}

pub fn thread_intro(full_name: &str) -> ThreadIntro {
	ThreadIntro {
		description: format!(
			"Linking [`{full_name}`](https://github.com/{full_name}) from GitHub to Discord..."
		),
		color: THREAD_INTRO_COLOR,
	}
}

/// Await `fut` unless the request is cancelled first.
async fn cancellable<T, E, F>(
	cancel: &CancellationToken,
	context: &str,
	fut: F,
) -> Result<T, ServerError>
where
	F: Future<Output = Result<T, E>>,
	E: std::fmt::Display,
{
	tokio::select! {
		_ = cancel.cancelled() => Err(ServerError::Cancelled),
		result = fut => result.map_err(|e| ServerError::upstream(context, e)),
	}
}

#[derive(Clone)]
pub struct InstallationSynchronizer {
	store: Arc<dyn AccountStore>,
	github: Arc<dyn GithubApi>,
	discord: Arc<dyn DiscordProvisioner>,
	prune_stale_hooks: bool,
}

/// Where the repository's thread stands before this sync touches it.
enum ExistingLink {
	None,
	Stale(u64),
}

impl InstallationSynchronizer {
	pub fn new(
		store: Arc<dyn AccountStore>,
		github: Arc<dyn GithubApi>,
		discord: Arc<dyn DiscordProvisioner>,
		prune_stale_hooks: bool,
	) -> Self {
		Self {
			store,
			github,
			discord,
			prune_stale_hooks,
		}
	}

	/// Parse and handle an `installation` delivery body.
	pub async fn handle_delivery(
		&self,
		body: &[u8],
		cancel: &CancellationToken,
	) -> Result<SyncReport, ServerError> {
		let event: InstallationEvent = serde_json::from_slice(body)
			.map_err(|e| ServerError::BadRequest(format!("Invalid installation payload: {e}")))?;
		self.synchronize(event, cancel).await
	}

	#[instrument(
		skip(self, event, cancel),
		fields(installation_id = event.installation.id, account = %event.installation.account.login)
	)]
	pub async fn synchronize(
		&self,
		event: InstallationEvent,
		cancel: &CancellationToken,
	) -> Result<SyncReport, ServerError> {
		if event.action != "created" {
			return Err(ServerError::NotImplemented(format!(
				"installation action '{}'",
				event.action
			)));
		}

		let account = cancellable(
			cancel,
			"look up account",
			self.store.get_account(&event.installation.account.login),
		)
		.await?
		.filter(|a| a.webhook_url.is_some())
		.ok_or_else(|| ServerError::BadRequest(ACCOUNT_NOT_LINKED.to_string()))?;

		let mut repositories = event.repositories;
		repositories.sort_by_key(|r| r.id);
		let repository_ids: Vec<i64> = repositories.iter().map(|r| r.id).collect();

		let installation_id = event.installation.id;
		let mut token = cancellable(
			cancel,
			"exchange installation token",
			self
				.github
				.installation_token(installation_id, &repository_ids),
		)
		.await?;

		let total = repositories.len();
		let mut report = SyncReport {
			total,
			..Default::default()
		};

		for (done, repository) in repositories.iter().enumerate() {
			self
				.sync_repository(
					&account,
					installation_id,
					&repository_ids,
					&mut token,
					repository,
					&mut report,
					cancel,
				)
				.await?;
			info!(
				done = done + 1,
				total,
				repository = %repository.full_name,
				"installation sync progress"
			);
		}

		info!(
			linked = report.linked,
			skipped = report.skipped,
			already_linked = report.already_linked,
			"installation sync complete"
		);
		Ok(report)
	}

	/// Swap `token` for a fresh one when it is about to expire.
	async fn ensure_fresh(
		&self,
		installation_id: i64,
		repository_ids: &[i64],
		token: &mut InstallationToken,
		cancel: &CancellationToken,
	) -> Result<(), ServerError> {
		if token.expires_within(Utc::now(), Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)) {
			debug!(installation_id, "installation token expiring, exchanging a new one");
			*token = cancellable(
				cancel,
				"exchange installation token",
				self.github.installation_token(installation_id, repository_ids),
			)
			.await?;
		}
		Ok(())
	}

	fn excluded_by_visibility(options: SyncOptions, repository: &InstallationRepository) -> bool {
		if repository.private {
			!options.contains(SyncOptions::PRIVATE)
		} else {
			!options.contains(SyncOptions::PUBLIC)
		}
	}

	#[allow(clippy::too_many_arguments)]
	async fn sync_repository(
		&self,
		account: &Account,
		installation_id: i64,
		repository_ids: &[i64],
		token: &mut InstallationToken,
		repository: &InstallationRepository,
		report: &mut SyncReport,
		cancel: &CancellationToken,
	) -> Result<(), ServerError> {
		let full_name = repository.full_name.as_str();

		if Self::excluded_by_visibility(account.sync_options, repository) {
			debug!(repository = %full_name, "skipping repository by visibility");
			report.skipped += 1;
			return Ok(());
		}

		self
			.ensure_fresh(installation_id, repository_ids, token, cancel)
			.await?;
		let details = cancellable(
			cancel,
			"get repository",
			self.github.get_repository(token, full_name),
		)
		.await?;

		if (details.archived && !account.sync_options.contains(SyncOptions::ARCHIVED))
			|| (details.fork && !account.sync_options.contains(SyncOptions::FORKED))
		{
			debug!(
				repository = %full_name,
				archived = details.archived,
				fork = details.fork,
				"skipping repository by sync options"
			);
			report.skipped += 1;
			return Ok(());
		}

		let existing = match cancellable(
			cancel,
			"look up repository link",
			self.store.get_thread_id(&account.name, &repository.name),
		)
		.await?
		{
			None => ExistingLink::None,
			Some(thread_id) => {
				let channel = cancellable(
					cancel,
					"get thread",
					self.discord.get_channel(thread_id),
				)
				.await?;
				if channel.is_some() {
					debug!(repository = %full_name, thread_id, "repository already linked");
					report.already_linked += 1;
					return Ok(());
				}
				info!(repository = %full_name, thread_id, "linked thread is gone, replacing it");
				ExistingLink::Stale(thread_id)
			}
		};

		let thread_id = cancellable(
			cancel,
			"create thread",
			self
				.discord
				.create_thread(account.channel_id, &repository.name, &thread_intro(full_name)),
		)
		.await?;

		let stored = match existing {
			ExistingLink::None => {
				cancellable(
					cancel,
					"store repository link",
					self
						.store
						.create_repository_link(&account.name, &repository.name, thread_id),
				)
				.await?
			}
			ExistingLink::Stale(stale) => {
				cancellable(
					cancel,
					"replace repository link",
					self.store.replace_repository_link(
						&account.name,
						&repository.name,
						stale,
						thread_id,
					),
				)
				.await?
			}
		};
		if !stored {
			warn!(
				repository = %full_name,
				thread_id,
				"repository was linked concurrently, leaving the other link in place"
			);
			report.already_linked += 1;
			return Ok(());
		}

		self
			.ensure_fresh(installation_id, repository_ids, token, cancel)
			.await?;
		let webhook_url = account.webhook_url.as_deref().unwrap_or_default();
		self
			.install_hook(token, full_name, details.archived, webhook_url, thread_id, cancel)
			.await?;

		report.linked += 1;
		Ok(())
	}

	async fn install_hook(
		&self,
		token: &InstallationToken,
		full_name: &str,
		archived: bool,
		webhook_url: &str,
		thread_id: u64,
		cancel: &CancellationToken,
	) -> Result<(), ServerError> {
		if archived {
			cancellable(
				cancel,
				"unarchive repository",
				self.github.set_archived(token, full_name, false),
			)
			.await?;
		}

		if self.prune_stale_hooks {
			self.prune_hooks(token, full_name, cancel).await?;
		}

		let url = format!("{webhook_url}?thread_id={thread_id}");
		let hook_id = cancellable(
			cancel,
			"install webhook",
			self
				.github
				.install_webhook(token, full_name, &url, WEBHOOK_ALL_EVENTS),
		)
		.await?;
		cancellable(
			cancel,
			"test webhook",
			self.github.test_webhook(token, full_name, hook_id),
		)
		.await?;

		if archived {
			cancellable(
				cancel,
				"re-archive repository",
				self.github.set_archived(token, full_name, true),
			)
			.await?;
		}

		info!(repository = %full_name, hook_id, thread_id, "webhook installed");
		Ok(())
	}

	/// Delete hooks left behind by earlier links. Failures to delete are
	/// logged; failing to list is not.
	async fn prune_hooks(
		&self,
		token: &InstallationToken,
		full_name: &str,
		cancel: &CancellationToken,
	) -> Result<(), ServerError> {
		let hooks = cancellable(
			cancel,
			"list webhooks",
			self.github.list_discord_webhooks(token, full_name),
		)
		.await?;

		for hook_id in hooks {
			let deleted = cancellable(
				cancel,
				"delete webhook",
				self.github.delete_webhook(token, full_name, hook_id),
			)
			.await;
			match deleted {
				Ok(()) => debug!(repository = %full_name, hook_id, "deleted stale webhook"),
				Err(ServerError::Cancelled) => return Err(ServerError::Cancelled),
				Err(e) => warn!(repository = %full_name, hook_id, error = %e, "failed to delete stale webhook"),
			}
		}
		Ok(())
	}
}
