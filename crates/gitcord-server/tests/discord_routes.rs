// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

mod common;

use axum::http::{header, HeaderValue, StatusCode};
use common::*;
use ed25519_dalek::SigningKey;
use gitcord_server_db::{AccountStore, SyncOptions};
use serde_json::{json, Value};
use tower::ServiceExt;

const CHANNEL_ID: &str = "1180000000000000042";

fn sync_account(options: Value) -> Value {
	json!({
		"id": "1180000000000000100",
		"type": 2,
		"token": "interaction-token",
		"application_id": "1180000000000000001",
		"guild_id": "1180000000000000002",
		"data": {"name": "sync_account", "options": options}
	})
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
	let app = spawn_app().await;
	let ping = json!({"id": "1", "type": 1, "token": "t", "application_id": "2"});

	let response = app
		.router
		.oneshot(discord_request(&app.signing_key, &ping))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await, json!({"type": 1}));
}

#[tokio::test]
async fn signature_from_another_key_is_unauthorized() {
	let app = spawn_app().await;
	let stranger = SigningKey::from_bytes(&[9u8; 32]);
	let ping = json!({"id": "1", "type": 1});

	let response = app
		.router
		.oneshot(discord_request(&stranger, &ping))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn body_length_must_match_content_length() {
	let app = spawn_app().await;
	let ping = json!({"id": "1", "type": 1});

	let mut request = discord_request(&app.signing_key, &ping);
	request.headers_mut().remove(header::CONTENT_LENGTH);
	let response = app.router.clone().oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["message"], "Missing content length.");

	let mut request = discord_request(&app.signing_key, &ping);
	request
		.headers_mut()
		.insert(header::CONTENT_LENGTH, HeaderValue::from_static("9999"));
	let response = app.router.oneshot(request).await.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(body_json(response).await["message"], "Content length mismatch.");
}

#[tokio::test]
async fn sync_account_provisions_webhook_and_stores_account() {
	let app = spawn_app().await;
	let interaction = sync_account(json!([
		{"name": "account_name", "type": 3, "value": "OoLunar"},
		{"name": "include_forked_repositories", "type": 5, "value": true},
		{"name": "channel", "type": 7, "value": CHANNEL_ID}
	]));

	let response = app
		.router
		.oneshot(discord_request(&app.signing_key, &interaction))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let expected_url = format!("https://discord.com/api/webhooks/{CHANNEL_ID}/token/github");
	assert_eq!(
		body_json(response).await,
		json!({
			"type": 4,
			"data": {
				"content": format!("Please sync your GitHub account with the webhook: {expected_url}"),
				"flags": 64
			}
		})
	);

	let account = app.store.get_account("oolunar").await.unwrap().unwrap();
	assert_eq!(account.channel_id, 1180000000000000042);
	assert_eq!(account.webhook_url.as_deref(), Some(expected_url.as_str()));
	assert_eq!(account.sync_options, SyncOptions::PUBLIC | SyncOptions::FORKED);

	let webhooks = app.discord.state.lock().unwrap().webhooks.clone();
	assert_eq!(
		webhooks,
		vec![(
			1180000000000000042,
			"Creating GitHub webhook for oolunar's GitHub account.".to_string()
		)]
	);
}

#[tokio::test]
async fn sync_account_again_moves_the_account() {
	let app = spawn_app().await;
	let first = sync_account(json!([
		{"name": "account_name", "type": 3, "value": "octocat"},
		{"name": "channel", "type": 7, "value": CHANNEL_ID}
	]));
	let second = sync_account(json!([
		{"name": "account_name", "type": 3, "value": "OctoCat"},
		{"name": "include_private_repositories", "type": 5, "value": true},
		{"name": "channel", "type": 7, "value": "1180000000000000777"}
	]));

	for interaction in [first, second] {
		let response = app
			.router
			.clone()
			.oneshot(discord_request(&app.signing_key, &interaction))
			.await
			.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
	}

	let account = app.store.get_account("octocat").await.unwrap().unwrap();
	assert_eq!(account.channel_id, 1180000000000000777);
	assert_eq!(account.sync_options, SyncOptions::PUBLIC | SyncOptions::PRIVATE);
	assert_eq!(
		account.webhook_url.as_deref(),
		Some("https://discord.com/api/webhooks/1180000000000000777/token/github")
	);
}

#[tokio::test]
async fn sync_account_without_channel_prompts_for_one() {
	let app = spawn_app().await;
	let interaction = sync_account(json!([
		{"name": "account_name", "type": 3, "value": "octocat"}
	]));

	let response = app
		.router
		.oneshot(discord_request(&app.signing_key, &interaction))
		.await
		.unwrap();
	let body = body_json(response).await;
	assert_eq!(
		body["data"]["content"],
		"Please specify a channel to sync the account with."
	);
	assert!(app.store.get_account("octocat").await.unwrap().is_none());
}

#[tokio::test]
async fn webhook_failure_is_reported_to_the_user() {
	let app = spawn_app().await;
	app.discord.fail_webhooks();
	let interaction = sync_account(json!([
		{"name": "account_name", "type": 3, "value": "octocat"},
		{"name": "channel", "type": 7, "value": CHANNEL_ID}
	]));

	let response = app
		.router
		.oneshot(discord_request(&app.signing_key, &interaction))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	let body = body_json(response).await;
	assert_eq!(body["data"]["content"], "Failed to create a webhook for the channel.");
	assert_eq!(body["data"]["flags"], 64);
	assert!(app.store.get_account("octocat").await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_command_is_bad_request() {
	let app = spawn_app().await;
	let interaction = json!({
		"id": "1",
		"type": 2,
		"data": {"name": "unsync_account", "options": []}
	});

	let response = app
		.router
		.oneshot(discord_request(&app.signing_key, &interaction))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn component_interactions_are_not_implemented() {
	let app = spawn_app().await;
	let interaction = json!({"id": "1", "type": 3});

	let response = app
		.router
		.oneshot(discord_request(&app.signing_key, &interaction))
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}
