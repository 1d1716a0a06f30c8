// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Discord side of gitcord.
//!
//! [`DiscordClient`] provisions the Discord resources an account needs (the
//! channel webhook GitHub delivers to, and one thread or forum post per
//! repository). [`interaction`] holds the wire types for the interactions
//! endpoint.

pub mod client;
pub mod config;
pub mod error;
pub mod interaction;
pub mod provisioner;

pub use client::DiscordClient;
pub use config::DiscordConfig;
pub use error::DiscordError;
pub use interaction::{
	parse_snowflake, CommandData, CommandOption, Interaction, InteractionResponse, InteractionType,
};
pub use provisioner::{Channel, ChannelKind, DiscordProvisioner, ThreadIntro, WEBHOOK_NAME};
