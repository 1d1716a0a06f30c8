// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::DiscordError;

/// Display name of the channel webhook GitHub deliveries are posted through.
pub const WEBHOOK_NAME: &str = "Symlink Gitcord";

/// The embed posted as the first message of a repository's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadIntro {
	pub description: String,
	pub color: u32,
}

/// Discord channel types gitcord distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
	Text,
	Announcement,
	Thread,
	Forum,
	Media,
	Other(u8),
}

impl From<u8> for ChannelKind {
	fn from(value: u8) -> Self {
		match value {
			0 => Self::Text,
			5 => Self::Announcement,
			10..=12 => Self::Thread,
			15 => Self::Forum,
			16 => Self::Media,
			other => Self::Other(other),
		}
	}
}

impl ChannelKind {
	/// Forum and media channels only hold posts: a thread plus its first
	/// message, created in one call.
	pub fn holds_posts(self) -> bool {
		matches!(self, Self::Forum | Self::Media)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
	pub id: u64,
	pub kind: ChannelKind,
	pub name: Option<String>,
	pub parent_id: Option<u64>,
}

#[derive(Deserialize)]
pub(crate) struct RawChannel {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: u8,
	pub name: Option<String>,
	pub parent_id: Option<String>,
}

impl TryFrom<RawChannel> for Channel {
	type Error = DiscordError;

	fn try_from(raw: RawChannel) -> Result<Self, Self::Error> {
		let id = crate::interaction::parse_snowflake(&raw.id)
			.ok_or_else(|| DiscordError::InvalidResponse(format!("channel id '{}'", raw.id)))?;
		Ok(Self {
			id,
			kind: raw.kind.into(),
			name: raw.name,
			parent_id: raw
				.parent_id
				.as_deref()
				.and_then(crate::interaction::parse_snowflake),
		})
	}
}

/// The Discord capability consumed by account linking and the installation
/// synchronizer.
#[async_trait]
pub trait DiscordProvisioner: Send + Sync {
	/// Create a channel webhook; returns its execute URL.
	async fn create_webhook(&self, channel_id: u64, reason: &str) -> Result<String, DiscordError>;

	/// Create a thread (or forum post) under `channel_id` opening with
	/// `intro`; returns the thread id.
	async fn create_thread(
		&self,
		channel_id: u64,
		name: &str,
		intro: &ThreadIntro,
	) -> Result<u64, DiscordError>;

	/// `None` when Discord answers 404.
	async fn get_channel(&self, channel_id: u64) -> Result<Option<Channel>, DiscordError>;
}
