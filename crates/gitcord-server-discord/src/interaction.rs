// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Wire types for Discord's HTTP interactions endpoint.
//!
//! Only the fields gitcord reads are modelled; everything else in the payload
//! is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message flag hiding a reply from everyone except the invoking user.
pub const EPHEMERAL: u64 = 1 << 6;

/// Discord sends snowflakes as decimal strings.
pub fn parse_snowflake(raw: &str) -> Option<u64> {
	raw.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
	Ping,
	ApplicationCommand,
	MessageComponent,
	Autocomplete,
	ModalSubmit,
	Unknown(u8),
}

impl From<u8> for InteractionType {
	fn from(value: u8) -> Self {
		match value {
			1 => Self::Ping,
			2 => Self::ApplicationCommand,
			3 => Self::MessageComponent,
			4 => Self::Autocomplete,
			5 => Self::ModalSubmit,
			other => Self::Unknown(other),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: u8,
	#[serde(default)]
	pub token: String,
	pub application_id: Option<String>,
	pub guild_id: Option<String>,
	pub channel_id: Option<String>,
	pub data: Option<CommandData>,
}

impl Interaction {
	pub fn interaction_type(&self) -> InteractionType {
		self.kind.into()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
	pub name: String,
	#[serde(default)]
	pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: u8,
	pub value: Option<Value>,
}

impl CommandData {
	fn option(&self, name: &str) -> Option<&Value> {
		self.options
			.iter()
			.find(|o| o.name == name)
			.and_then(|o| o.value.as_ref())
	}

	pub fn string_option(&self, name: &str) -> Option<&str> {
		self.option(name).and_then(Value::as_str)
	}

	pub fn bool_option(&self, name: &str) -> Option<bool> {
		self.option(name).and_then(Value::as_bool)
	}

	/// Channel, user and role options carry their id as a string.
	pub fn snowflake_option(&self, name: &str) -> Option<u64> {
		self.string_option(name).and_then(parse_snowflake)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
	#[serde(rename = "type")]
	pub kind: u8,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<InteractionCallbackData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionCallbackData {
	pub content: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub flags: Option<u64>,
}

impl InteractionResponse {
	/// Acknowledge a `PING`.
	pub fn pong() -> Self {
		Self {
			kind: 1,
			data: None,
		}
	}

	/// `CHANNEL_MESSAGE_WITH_SOURCE` visible only to the invoker.
	pub fn ephemeral(content: impl Into<String>) -> Self {
		Self {
			kind: 4,
			data: Some(InteractionCallbackData {
				content: content.into(),
				flags: Some(EPHEMERAL),
			}),
		}
	}
}
