// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared harness for router tests: in-memory store, recording fakes for the
//! GitHub and Discord capabilities, and request signing helpers.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
	body::{to_bytes, Body},
	http::{header, Request, Response},
	Router,
};
use chrono::{Duration, Utc};
use ed25519_dalek::{Signer, SigningKey};
use gitcord_common_http::RateLimitedClient;
use gitcord_common_webhook::github_signature;
use gitcord_server::{create_router, AppState, InboundKeys};
use gitcord_server_db::{testing::create_test_store, SqliteAccountStore};
use gitcord_server_discord::{Channel, ChannelKind, DiscordError, DiscordProvisioner, ThreadIntro};
use gitcord_server_github_app::{
	GithubApi, GithubAppError, InstallationToken, RepositoryDetails,
};
use serde_json::Value;

pub const WEBHOOK_SECRET: &str = "It's a Secret to Everybody";
pub const DISCORD_TIMESTAMP: &str = "1700000000";
pub const FIRST_THREAD_ID: u64 = 1190000000000000000;

#[derive(Default)]
pub struct FakeGithubState {
	pub repositories: HashMap<String, RepositoryDetails>,
	/// `(full_name, url)` per installed hook.
	pub installed: Vec<(String, String)>,
	pub archive_calls: Vec<(String, bool)>,
	pub tested: Vec<u64>,
	pub token_exchanges: usize,
	/// Calls that answer with a 500, by trait method name.
	pub fail_on: HashSet<&'static str>,
	/// Lifetime of exchanged tokens; an hour when unset.
	pub token_lifetime: Option<Duration>,
	next_hook: u64,
}

impl FakeGithubState {
	fn check(&self, call: &'static str) -> Result<(), GithubAppError> {
		if self.fail_on.contains(call) {
			return Err(GithubAppError::api_error(500, format!("{call} failed")));
		}
		Ok(())
	}
}

#[derive(Default)]
pub struct FakeGithub {
	pub state: Mutex<FakeGithubState>,
}

impl FakeGithub {
	pub fn add_repository(&self, id: i64, full_name: &str, private: bool, fork: bool, archived: bool) {
		let name = full_name.split_once('/').map(|(_, n)| n).unwrap_or(full_name);
		self.state.lock().unwrap().repositories.insert(
			full_name.to_string(),
			RepositoryDetails {
				id,
				name: name.to_string(),
				full_name: full_name.to_string(),
				private,
				fork,
				archived,
			},
		);
	}

	pub fn installed(&self) -> Vec<(String, String)> {
		self.state.lock().unwrap().installed.clone()
	}

	pub fn fail(&self, call: &'static str) {
		self.state.lock().unwrap().fail_on.insert(call);
	}

	pub fn issue_tokens_for(&self, lifetime: Duration) {
		self.state.lock().unwrap().token_lifetime = Some(lifetime);
	}

	pub fn token_exchanges(&self) -> usize {
		self.state.lock().unwrap().token_exchanges
	}
}

#[async_trait]
impl GithubApi for FakeGithub {
	async fn installation_token(
		&self,
		_installation_id: i64,
		_repository_ids: &[i64],
	) -> Result<InstallationToken, GithubAppError> {
		let mut state = self.state.lock().unwrap();
		state.check("installation_token")?;
		state.token_exchanges += 1;
		let lifetime = state.token_lifetime.unwrap_or_else(|| Duration::hours(1));
		Ok(InstallationToken::new("ghs_test", Utc::now() + lifetime))
	}

	async fn get_repository(
		&self,
		_token: &InstallationToken,
		full_name: &str,
	) -> Result<RepositoryDetails, GithubAppError> {
		let state = self.state.lock().unwrap();
		state.check("get_repository")?;
		state
			.repositories
			.get(full_name)
			.cloned()
			.ok_or_else(|| GithubAppError::api_error(404, "Not Found"))
	}

	async fn set_archived(
		&self,
		_token: &InstallationToken,
		full_name: &str,
		archived: bool,
	) -> Result<(), GithubAppError> {
		let mut state = self.state.lock().unwrap();
		state.check("set_archived")?;
		state.archive_calls.push((full_name.to_string(), archived));
		Ok(())
	}

	async fn list_discord_webhooks(
		&self,
		_token: &InstallationToken,
		_full_name: &str,
	) -> Result<Vec<u64>, GithubAppError> {
		Ok(Vec::new())
	}

	async fn delete_webhook(
		&self,
		_token: &InstallationToken,
		_full_name: &str,
		_hook_id: u64,
	) -> Result<(), GithubAppError> {
		Ok(())
	}

	async fn install_webhook(
		&self,
		_token: &InstallationToken,
		full_name: &str,
		url: &str,
		_events: &[&str],
	) -> Result<u64, GithubAppError> {
		let mut state = self.state.lock().unwrap();
		state.check("install_webhook")?;
		state.next_hook += 1;
		state.installed.push((full_name.to_string(), url.to_string()));
		Ok(state.next_hook)
	}

	async fn test_webhook(
		&self,
		_token: &InstallationToken,
		_full_name: &str,
		hook_id: u64,
	) -> Result<(), GithubAppError> {
		let mut state = self.state.lock().unwrap();
		state.check("test_webhook")?;
		state.tested.push(hook_id);
		Ok(())
	}
}

#[derive(Default)]
pub struct FakeDiscordState {
	/// `(channel_id, reason)` per created webhook.
	pub webhooks: Vec<(u64, String)>,
	/// `(channel_id, name, thread_id)` per created thread.
	pub threads: Vec<(u64, String, u64)>,
	pub live: HashSet<u64>,
	pub fail_webhooks: bool,
	pub fail_channel_lookups: bool,
}

#[derive(Default)]
pub struct FakeDiscord {
	pub state: Mutex<FakeDiscordState>,
}

impl FakeDiscord {
	pub fn delete_thread(&self, thread_id: u64) {
		self.state.lock().unwrap().live.remove(&thread_id);
	}

	pub fn fail_webhooks(&self) {
		self.state.lock().unwrap().fail_webhooks = true;
	}

	pub fn fail_channel_lookups(&self) {
		self.state.lock().unwrap().fail_channel_lookups = true;
	}
}

#[async_trait]
impl DiscordProvisioner for FakeDiscord {
	async fn create_webhook(&self, channel_id: u64, reason: &str) -> Result<String, DiscordError> {
		let mut state = self.state.lock().unwrap();
		if state.fail_webhooks {
			return Err(DiscordError::Forbidden("Manage Webhooks".to_string()));
		}
		state.webhooks.push((channel_id, reason.to_string()));
		Ok(format!("https://discord.com/api/webhooks/{channel_id}/token"))
	}

	async fn create_thread(
		&self,
		channel_id: u64,
		name: &str,
		_intro: &ThreadIntro,
	) -> Result<u64, DiscordError> {
		let mut state = self.state.lock().unwrap();
		let thread_id = FIRST_THREAD_ID + state.threads.len() as u64;
		state.threads.push((channel_id, name.to_string(), thread_id));
		state.live.insert(thread_id);
		Ok(thread_id)
	}

	async fn get_channel(&self, channel_id: u64) -> Result<Option<Channel>, DiscordError> {
		let state = self.state.lock().unwrap();
		if state.fail_channel_lookups {
			return Err(DiscordError::ApiError {
				status: 502,
				message: "Bad Gateway".to_string(),
			});
		}
		Ok(state.live.contains(&channel_id).then(|| Channel {
			id: channel_id,
			kind: ChannelKind::Thread,
			name: None,
			parent_id: None,
		}))
	}
}

pub struct TestApp {
	pub router: Router,
	pub store: SqliteAccountStore,
	pub github: Arc<FakeGithub>,
	pub discord: Arc<FakeDiscord>,
	pub signing_key: SigningKey,
}

pub async fn spawn_app() -> TestApp {
	let store = create_test_store().await;
	let github = Arc::new(FakeGithub::default());
	let discord = Arc::new(FakeDiscord::default());
	let signing_key = SigningKey::from_bytes(&[7u8; 32]);

	let state = AppState::new(
		store.clone(),
		github.clone(),
		discord.clone(),
		RateLimitedClient::new(reqwest::Client::new()),
		InboundKeys {
			github_webhook_secret: WEBHOOK_SECRET.into(),
			discord_public_key: signing_key.verifying_key(),
		},
		false,
	);

	TestApp {
		router: create_router(state),
		store,
		github,
		discord,
		signing_key,
	}
}

/// A POST to `/github` signed with [`WEBHOOK_SECRET`].
pub fn github_request(event: &str, body: &Value) -> Request<Body> {
	let body = body.to_string();
	let signature = github_signature(WEBHOOK_SECRET.as_bytes(), body.as_bytes());
	github_request_raw(event, body, Some(signature))
}

pub fn github_request_raw(event: &str, body: String, signature: Option<String>) -> Request<Body> {
	let mut builder = Request::builder()
		.method("POST")
		.uri("/github")
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::CONTENT_LENGTH, body.len().to_string())
		.header("x-github-event", event)
		.header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958")
		.header(header::USER_AGENT, "GitHub-Hookshot/044aadd");
	if let Some(signature) = signature {
		builder = builder.header("x-hub-signature-256", signature);
	}
	builder.body(Body::from(body)).unwrap()
}

/// A POST to `/discord` signed with `key`.
pub fn discord_request(key: &SigningKey, body: &Value) -> Request<Body> {
	let body = body.to_string();
	let message = [DISCORD_TIMESTAMP.as_bytes(), body.as_bytes()].concat();
	let signature = hex::encode(key.sign(&message).to_bytes());

	Request::builder()
		.method("POST")
		.uri("/discord")
		.header(header::CONTENT_TYPE, "application/json")
		.header(header::CONTENT_LENGTH, body.len().to_string())
		.header("x-signature-timestamp", DISCORD_TIMESTAMP)
		.header("x-signature-ed25519", signature)
		.body(Body::from(body))
		.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
	let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
	String::from_utf8(bytes.to_vec()).unwrap()
}
