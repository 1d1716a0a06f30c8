// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use crate::store::SqliteAccountStore;
use crate::types::{Account, SyncOptions};

pub async fn create_test_store() -> SqliteAccountStore {
	SqliteAccountStore::connect("sqlite::memory:").await.unwrap()
}

pub fn sample_account(name: &str) -> Account {
	Account {
		name: name.to_string(),
		channel_id: 1180000000000000042,
		sync_options: SyncOptions::PUBLIC,
		webhook_url: Some("https://discord.com/api/webhooks/1/token/github".to_string()),
	}
}
