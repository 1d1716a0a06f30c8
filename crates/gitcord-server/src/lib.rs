// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! gitcord server.
//!
//! Receives GitHub App deliveries and Discord interactions. Installations are
//! turned into one Discord thread per repository; every other delivery is
//! relayed to the owning account's Discord webhook, routed into the
//! repository's thread.

pub mod api;
pub mod error;
pub mod link;
pub mod relay;
pub mod routes;
pub mod sync;
pub mod verify;

pub use api::{create_app_state, create_router, AppState, InboundKeys};
pub use error::ServerError;
pub use link::AccountLinker;
pub use relay::EventRelay;
pub use sync::{InstallationSynchronizer, SyncReport};
