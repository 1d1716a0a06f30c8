// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Persistent account and repository-link store.
//!
//! One SQLite connection sits behind an async mutex so exactly one command
//! runs at a time. When the connection breaks, a detached recovery task holds
//! the mutex and reopens it once a second until it succeeds; callers queue
//! behind it instead of seeing the failure.

pub mod connection;
pub mod error;
pub mod store;
pub mod testing;
pub mod types;

pub use connection::{connect_options, is_connection_error, open_connection};
pub use error::{DbError, Result};
pub use store::{AccountStore, SqliteAccountStore, RECONNECT_INTERVAL};
pub use types::{normalize_name, Account, RepositoryLink, StoreHealth, SyncOptions};
