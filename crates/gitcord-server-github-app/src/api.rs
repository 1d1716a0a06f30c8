// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::GithubAppError;
use crate::token::InstallationToken;
use crate::types::RepositoryDetails;

/// The GitHub REST capability consumed by the installation synchronizer.
///
/// `full_name` is always `owner/repo`.
#[async_trait]
pub trait GithubApi: Send + Sync {
	/// Exchange an App JWT for a token scoped to `repository_ids`.
	async fn installation_token(
		&self,
		installation_id: i64,
		repository_ids: &[i64],
	) -> Result<InstallationToken, GithubAppError>;

	async fn get_repository(
		&self,
		token: &InstallationToken,
		full_name: &str,
	) -> Result<RepositoryDetails, GithubAppError>;

	async fn set_archived(
		&self,
		token: &InstallationToken,
		full_name: &str,
		archived: bool,
	) -> Result<(), GithubAppError>;

	/// Ids of the repository's hooks that deliver to a Discord webhook.
	async fn list_discord_webhooks(
		&self,
		token: &InstallationToken,
		full_name: &str,
	) -> Result<Vec<u64>, GithubAppError>;

	async fn delete_webhook(
		&self,
		token: &InstallationToken,
		full_name: &str,
		hook_id: u64,
	) -> Result<(), GithubAppError>;

	/// Create a JSON webhook delivering `events` to `url`; returns its id.
	async fn install_webhook(
		&self,
		token: &InstallationToken,
		full_name: &str,
		url: &str,
		events: &[&str],
	) -> Result<u64, GithubAppError>;

	/// Ask GitHub to send a test delivery through the hook.
	async fn test_webhook(
		&self,
		token: &InstallationToken,
		full_name: &str,
		hook_id: u64,
	) -> Result<(), GithubAppError>;
}
