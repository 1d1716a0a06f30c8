// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

mod database;
mod discord;
mod dispatch;
mod github_app;
mod http;
mod logging;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use discord::{DiscordBotConfig, DiscordBotConfigLayer};
pub use dispatch::{DispatchConfig, DispatchConfigLayer};
pub use github_app::{GitHubAppConfig, GitHubAppConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
