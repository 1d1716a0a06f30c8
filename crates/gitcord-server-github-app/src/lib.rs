// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub App client for gitcord.
//!
//! Mints App JWTs, exchanges them for installation tokens (cached process-wide
//! per installation), and wraps the handful of repository and webhook REST
//! calls the installation synchronizer needs behind the [`GithubApi`] trait.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod jwt;
pub mod token;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::GithubApi;
pub use client::GithubAppClient;
pub use config::GithubAppConfig;
pub use error::GithubAppError;
pub use jwt::generate_app_jwt;
pub use token::{InstallationToken, InstallationTokenCache};
pub use types::{Hook, HookConfig, RepositoryDetails, WEBHOOK_ALL_EVENTS};
