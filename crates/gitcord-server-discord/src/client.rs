// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Discord REST client.

use async_trait::async_trait;
use gitcord_common_http::RateLimitedClient;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::config::DiscordConfig;
use crate::error::{map_discord_error, DiscordError};
use crate::interaction::parse_snowflake;
use crate::provisioner::{Channel, DiscordProvisioner, RawChannel, ThreadIntro, WEBHOOK_NAME};

/// Threads created in text channels archive after a week of inactivity.
const THREAD_AUTO_ARCHIVE_MINUTES: u32 = 10080;
const PUBLIC_THREAD: u8 = 11;

#[derive(Deserialize)]
struct CreatedWebhook {
	id: String,
	token: Option<String>,
	url: Option<String>,
}

#[derive(Deserialize)]
struct CreatedThread {
	id: String,
}

#[derive(Serialize)]
struct Embed<'a> {
	color: u32,
	description: &'a str,
}

impl<'a> From<&'a ThreadIntro> for Embed<'a> {
	fn from(intro: &'a ThreadIntro) -> Self {
		Self {
			color: intro.color,
			description: &intro.description,
		}
	}
}

/// Bot-authenticated Discord REST client.
#[derive(Clone)]
pub struct DiscordClient {
	http: RateLimitedClient,
	config: DiscordConfig,
}

impl DiscordClient {
	pub fn new(config: DiscordConfig, http: RateLimitedClient) -> Self {
		info!(
			application_id = config.application_id(),
			base_url = %config.base_url(),
			"Created Discord client"
		);
		Self { http, config }
	}

	pub fn config(&self) -> &DiscordConfig {
		&self.config
	}

	fn url(&self, path: &str) -> Result<Url, DiscordError> {
		self.config
			.base_url()
			.join(path)
			.map_err(|e| DiscordError::Config(format!("Invalid URL: {e}")))
	}

	fn request(&self, method: Method, url: Url) -> RequestBuilder {
		self.http
			.http()
			.request(method, url)
			.header("Authorization", format!("Bot {}", self.config.token()))
	}

	async fn execute(&self, request: RequestBuilder) -> Result<Response, DiscordError> {
		let response = self.http.send(request).await?;
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		Err(map_discord_error(status, &body))
	}

	fn thread_id(created: CreatedThread) -> Result<u64, DiscordError> {
		parse_snowflake(&created.id)
			.ok_or_else(|| DiscordError::InvalidResponse(format!("thread id '{}'", created.id)))
	}

	/// A forum post: thread and opening message in one request.
	async fn create_post(
		&self,
		channel_id: u64,
		name: &str,
		intro: &ThreadIntro,
	) -> Result<u64, DiscordError> {
		let url = self.url(&format!("channels/{channel_id}/threads"))?;
		let body = json!({
			"name": name,
			"message": { "embeds": [Embed::from(intro)] },
		});

		let created: CreatedThread = self
			.execute(self.request(Method::POST, url).json(&body))
			.await?
			.json()
			.await
			.map_err(|e| DiscordError::InvalidResponse(format!("created post body: {e}")))?;
		Self::thread_id(created)
	}

	/// A public thread in a text channel, then the intro as its first message.
	async fn create_text_thread(
		&self,
		channel_id: u64,
		name: &str,
		intro: &ThreadIntro,
	) -> Result<u64, DiscordError> {
		let url = self.url(&format!("channels/{channel_id}/threads"))?;
		let body = json!({
			"name": name,
			"type": PUBLIC_THREAD,
			"auto_archive_duration": THREAD_AUTO_ARCHIVE_MINUTES,
		});

		let created: CreatedThread = self
			.execute(self.request(Method::POST, url).json(&body))
			.await?
			.json()
			.await
			.map_err(|e| DiscordError::InvalidResponse(format!("created thread body: {e}")))?;
		let thread_id = Self::thread_id(created)?;

		let url = self.url(&format!("channels/{thread_id}/messages"))?;
		self.execute(
			self.request(Method::POST, url)
				.json(&json!({ "embeds": [Embed::from(intro)] })),
		)
		.await?;

		Ok(thread_id)
	}
}

#[async_trait]
impl DiscordProvisioner for DiscordClient {
	#[instrument(skip(self, reason))]
	async fn create_webhook(&self, channel_id: u64, reason: &str) -> Result<String, DiscordError> {
		let url = self.url(&format!("channels/{channel_id}/webhooks"))?;
		let created: CreatedWebhook = self
			.execute(
				self.request(Method::POST, url)
					.header("X-Audit-Log-Reason", urlencoding::encode(reason).into_owned())
					.json(&json!({ "name": WEBHOOK_NAME })),
			)
			.await?
			.json()
			.await
			.map_err(|e| DiscordError::InvalidResponse(format!("created webhook body: {e}")))?;

		let webhook_url = match (created.url, created.token) {
			(Some(url), _) => url,
			(None, Some(token)) => format!("https://discord.com/api/webhooks/{}/{token}", created.id),
			(None, None) => {
				return Err(DiscordError::InvalidResponse(
					"webhook has neither url nor token".to_string(),
				))
			}
		};

		info!(channel_id, webhook_id = %created.id, "Created Discord webhook");
		Ok(webhook_url)
	}

	#[instrument(skip(self, intro))]
	async fn create_thread(
		&self,
		channel_id: u64,
		name: &str,
		intro: &ThreadIntro,
	) -> Result<u64, DiscordError> {
		let parent = self
			.get_channel(channel_id)
			.await?
			.ok_or(DiscordError::ChannelNotFound(channel_id))?;

		let thread_id = if parent.kind.holds_posts() {
			self.create_post(channel_id, name, intro).await?
		} else {
			self.create_text_thread(channel_id, name, intro).await?
		};

		info!(channel_id, thread_id, "Created Discord thread");
		Ok(thread_id)
	}

	#[instrument(skip(self))]
	async fn get_channel(&self, channel_id: u64) -> Result<Option<Channel>, DiscordError> {
		let url = self.url(&format!("channels/{channel_id}"))?;
		let response = self.http.send(self.request(Method::GET, url)).await?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			debug!(channel_id, "Discord channel does not exist");
			return Ok(None);
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(map_discord_error(status, &body));
		}

		let raw: RawChannel = response
			.json()
			.await
			.map_err(|e| DiscordError::InvalidResponse(format!("channel body: {e}")))?;
		Channel::try_from(raw).map(Some)
	}
}
