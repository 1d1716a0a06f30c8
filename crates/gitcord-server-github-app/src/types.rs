// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request and response bodies for the GitHub REST endpoints gitcord uses.

use serde::{Deserialize, Serialize};

/// Subscribe a repository webhook to every event.
pub const WEBHOOK_ALL_EVENTS: &[&str] = &["*"];

/// Discord's incoming webhook endpoints; hooks pointing here are ours.
pub const DISCORD_WEBHOOK_URL_PREFIX: &str = "https://discord.com/api/webhooks";

/// The subset of `GET /repos/{owner}/{repo}` the synchronizer reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryDetails {
	pub id: i64,
	pub name: String,
	pub full_name: String,
	#[serde(default)]
	pub private: bool,
	#[serde(default)]
	pub fork: bool,
	#[serde(default)]
	pub archived: bool,
}

/// A repository webhook as listed by `GET /repos/{owner}/{repo}/hooks`.
#[derive(Debug, Clone, Deserialize)]
pub struct Hook {
	pub id: u64,
	#[serde(default)]
	pub config: HookConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookConfig {
	pub url: Option<String>,
}

impl Hook {
	pub fn targets_discord(&self) -> bool {
		self.config
			.url
			.as_deref()
			.is_some_and(|url| url.starts_with(DISCORD_WEBHOOK_URL_PREFIX))
	}
}

#[derive(Debug, Serialize)]
pub(crate) struct AccessTokenRequest<'a> {
	pub repository_ids: &'a [i64],
	pub permissions: TokenPermissions,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenPermissions {
	pub administration: &'static str,
	pub repository_hooks: &'static str,
	pub organization_hooks: &'static str,
}

impl Default for TokenPermissions {
	fn default() -> Self {
		Self {
			administration: "write",
			repository_hooks: "write",
			organization_hooks: "write",
		}
	}
}

/// Both fields are optional so their absence surfaces as an
/// `InvalidResponse` rather than a decode error.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
	pub token: Option<String>,
	pub expires_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateArchivedRequest {
	pub archived: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateHookRequest<'a> {
	pub name: &'static str,
	pub active: bool,
	pub events: &'a [&'a str],
	pub config: CreateHookConfig<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateHookConfig<'a> {
	pub url: &'a str,
	pub content_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedHook {
	pub id: u64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hooks_pointing_at_discord_are_recognised() {
		let hooks: Vec<Hook> = serde_json::from_str(
			r#"[
				{"id": 1, "config": {"url": "https://discord.com/api/webhooks/123/abc/github?thread_id=9", "content_type": "json"}},
				{"id": 2, "config": {"url": "https://ci.example.com/hook"}},
				{"id": 3, "config": {}}
			]"#,
		)
		.unwrap();

		let ours: Vec<u64> = hooks
			.iter()
			.filter(|h| h.targets_discord())
			.map(|h| h.id)
			.collect();
		assert_eq!(ours, vec![1]);
	}

	#[test]
	fn create_hook_body_shape() {
		let body = CreateHookRequest {
			name: "web",
			active: true,
			events: WEBHOOK_ALL_EVENTS,
			config: CreateHookConfig {
				url: "https://discord.com/api/webhooks/1/t/github?thread_id=5",
				content_type: "json",
			},
		};

		assert_eq!(
			serde_json::to_value(&body).unwrap(),
			serde_json::json!({
				"name": "web",
				"active": true,
				"events": ["*"],
				"config": {
					"url": "https://discord.com/api/webhooks/1/t/github?thread_id=5",
					"content_type": "json"
				}
			})
		);
	}

	#[test]
	fn repository_details_tolerate_missing_flags() {
		let repo: RepositoryDetails =
			serde_json::from_str(r#"{"id": 1296269, "name": "Hello-World", "full_name": "octocat/Hello-World"}"#)
				.unwrap();
		assert!(!repo.archived);
		assert!(!repo.fork);
		assert!(!repo.private);
	}
}
