// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by the gitcord crates.

pub mod env;

pub use env::{load_secret_env, require_secret_env, RequiredSecretError, SecretEnvError};
pub use gitcord_common_secret::{Secret, SecretString};
