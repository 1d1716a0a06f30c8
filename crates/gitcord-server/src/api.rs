// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use anyhow::Context;
use axum::{
	routing::{get, post},
	Router,
};
use gitcord_common_config::SecretString;
use gitcord_common_http::{new_client_with_timeout, RateLimitedClient};
use gitcord_common_webhook::VerifyingKey;
use gitcord_server_config::ServerConfig;
use gitcord_server_db::{AccountStore, SqliteAccountStore, StoreHealth};
use gitcord_server_discord::{DiscordClient, DiscordConfig, DiscordProvisioner};
use gitcord_server_github_app::{GithubApi, GithubAppClient, GithubAppConfig};
use tokio::sync::watch;

use crate::link::AccountLinker;
use crate::relay::EventRelay;
use crate::routes;
use crate::sync::InstallationSynchronizer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub store: Arc<dyn AccountStore>,
	pub webhook_secret: SecretString,
	pub discord_public_key: VerifyingKey,
	pub synchronizer: InstallationSynchronizer,
	pub relay: EventRelay,
	pub linker: AccountLinker,
	pub store_health: watch::Receiver<StoreHealth>,
}

/// Verification material for inbound requests.
#[derive(Clone)]
pub struct InboundKeys {
	pub github_webhook_secret: SecretString,
	pub discord_public_key: VerifyingKey,
}

impl AppState {
	/// Wire the handlers to a store and the two provider capabilities.
	///
	/// `relay_http` carries forwarded deliveries to Discord webhooks.
	pub fn new(
		store: SqliteAccountStore,
		github: Arc<dyn GithubApi>,
		discord: Arc<dyn DiscordProvisioner>,
		relay_http: RateLimitedClient,
		keys: InboundKeys,
		prune_stale_hooks: bool,
	) -> Self {
		let store_health = store.health();
		let store: Arc<dyn AccountStore> = Arc::new(store);

		Self {
			synchronizer: InstallationSynchronizer::new(
				store.clone(),
				github,
				discord.clone(),
				prune_stale_hooks,
			),
			relay: EventRelay::new(store.clone(), relay_http),
			linker: AccountLinker::new(store.clone(), discord),
			store,
			webhook_secret: keys.github_webhook_secret,
			discord_public_key: keys.discord_public_key,
			store_health,
		}
	}
}

/// Build clients from configuration, open the store and start its health
/// monitor.
pub async fn create_app_state(config: &ServerConfig) -> anyhow::Result<AppState> {
	let http = new_client_with_timeout(config.dispatch.request_timeout)
		.context("failed to build HTTP client")?;
	let dispatcher = RateLimitedClient::new(http).with_fallback_wait(config.dispatch.fallback_wait);

	let app = &config.github_app;
	let github_config = GithubAppConfig::new(
		app.client_id.clone(),
		app.private_key_pem.clone(),
		app.webhook_secret.clone(),
	)
	.with_base_url(&app.base_url)
	.context("invalid GitHub API base URL")?
	.with_prune_stale_hooks(app.prune_stale_hooks);

	let bot = &config.discord;
	let discord_config = DiscordConfig::new(bot.token.clone(), &bot.public_key, bot.application_id)
		.context("invalid Discord configuration")?
		.with_base_url(&bot.base_url)
		.context("invalid Discord API base URL")?;

	let keys = InboundKeys {
		github_webhook_secret: github_config.webhook_secret().clone(),
		discord_public_key: *discord_config.public_key(),
	};
	let prune_stale_hooks = github_config.prune_stale_hooks();

	let github = Arc::new(GithubAppClient::new(github_config, dispatcher.clone()));
	let discord = Arc::new(DiscordClient::new(discord_config, dispatcher.clone()));

	let store = SqliteAccountStore::connect(&config.database.url)
		.await
		.context("failed to open account store")?;
	if !config.database.health_check_interval.is_zero() {
		store.spawn_health_monitor(config.database.health_check_interval);
	}

	Ok(AppState::new(
		store,
		github,
		discord,
		dispatcher,
		keys,
		prune_stale_hooks,
	))
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/github", post(routes::github::handle_delivery))
		.route("/github/{*rest}", post(routes::github::handle_delivery))
		.route("/discord", post(routes::discord::handle_interaction))
		.route("/discord/{*rest}", post(routes::discord::handle_interaction))
		.route("/health", get(routes::health::health_check))
		.with_state(state)
}
