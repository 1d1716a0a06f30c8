// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The `sync_account` command: bind a GitHub account to a Discord channel.

use std::sync::Arc;

use gitcord_common_http::CancellationToken;
use gitcord_server_db::{normalize_name, Account, AccountStore, DbError, SyncOptions};
use gitcord_server_discord::{CommandData, DiscordProvisioner, InteractionResponse};
use tracing::{error, info, instrument};

use crate::error::ServerError;

pub const SYNC_ACCOUNT_COMMAND: &str = "sync_account";

pub const MISSING_CHANNEL: &str = "Please specify a channel to sync the account with.";
pub const WEBHOOK_FAILED: &str = "Failed to create a webhook for the channel.";

/// `octo` -> `octo's`, `james` -> `james'`.
pub fn possessive(name: &str) -> String {
	if name.ends_with("'s") {
		name.to_string()
	} else if name.ends_with('s') {
		format!("{name}'")
	} else if name.ends_with('\'') {
		format!("{name}s")
	} else if name.is_empty() {
		String::new()
	} else {
		format!("{name}'s")
	}
}

fn sync_options(data: &CommandData) -> SyncOptions {
	let mut options = SyncOptions::PUBLIC;
	options.set(
		SyncOptions::ARCHIVED,
		data.bool_option("include_archived_repositories").unwrap_or(false),
	);
	options.set(
		SyncOptions::FORKED,
		data.bool_option("include_forked_repositories").unwrap_or(false),
	);
	options.set(
		SyncOptions::PRIVATE,
		data.bool_option("include_private_repositories").unwrap_or(false),
	);
	options
}

#[derive(Clone)]
pub struct AccountLinker {
	store: Arc<dyn AccountStore>,
	discord: Arc<dyn DiscordProvisioner>,
}

impl AccountLinker {
	pub fn new(store: Arc<dyn AccountStore>, discord: Arc<dyn DiscordProvisioner>) -> Self {
		Self { store, discord }
	}

	/// Handle `sync_account`. Provisioning failures are reported to the user
	/// in an ephemeral reply rather than as an HTTP error.
	#[instrument(skip(self, data, cancel))]
	pub async fn sync_account(
		&self,
		data: &CommandData,
		cancel: &CancellationToken,
	) -> Result<InteractionResponse, ServerError> {
		let name = data
			.string_option("account_name")
			.map(normalize_name)
			.filter(|n| !n.is_empty())
			.ok_or_else(|| ServerError::BadRequest("Missing account_name option.".to_string()))?;

		let Some(channel_id) = data.snowflake_option("channel") else {
			return Ok(InteractionResponse::ephemeral(MISSING_CHANNEL));
		};

		let reason = format!("Creating GitHub webhook for {} GitHub account.", possessive(&name));
		let created = tokio::select! {
			_ = cancel.cancelled() => return Err(ServerError::Cancelled),
			created = self.discord.create_webhook(channel_id, &reason) => created,
		};
		let webhook_url = match created {
			Ok(url) => format!("{url}/github"),
			Err(e) => {
				error!(account = %name, channel_id, error = %e, "failed to create channel webhook");
				return Ok(InteractionResponse::ephemeral(WEBHOOK_FAILED));
			}
		};

		let account = Account {
			name: name.clone(),
			channel_id,
			sync_options: sync_options(data),
			webhook_url: Some(webhook_url.clone()),
		};
		self.upsert(&account).await?;

		info!(account = %name, channel_id, options = account.sync_options.bits(), "account linked");
		Ok(InteractionResponse::ephemeral(format!(
			"Please sync your GitHub account with the webhook: {webhook_url}"
		)))
	}

	async fn upsert(&self, account: &Account) -> Result<(), ServerError> {
		if self.store.update_account(account).await? {
			return Ok(());
		}
		match self.store.create_account(account).await {
			// Lost a race with another link of the same name.
			Err(DbError::Conflict(_)) => {
				self.store.update_account(account).await?;
				Ok(())
			}
			other => other.map_err(ServerError::from),
		}
	}
}
