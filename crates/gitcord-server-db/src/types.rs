// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::ops::{BitOr, BitOrAssign};

/// Account and repository names are case-insensitive and stored lower-cased.
pub fn normalize_name(name: &str) -> String {
	name.trim().to_lowercase()
}

/// Which repository categories an account syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SyncOptions(u8);

impl SyncOptions {
	pub const NONE: Self = Self(0);
	pub const PUBLIC: Self = Self(1);
	pub const PRIVATE: Self = Self(1 << 1);
	pub const FORKED: Self = Self(1 << 2);
	pub const ARCHIVED: Self = Self(1 << 3);
	pub const ALL: Self = Self(0b1111);

	pub const fn bits(self) -> u8 {
		self.0
	}

	/// Unknown bits are dropped.
	pub const fn from_bits_truncate(bits: u8) -> Self {
		Self(bits & Self::ALL.0)
	}

	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	pub fn set(&mut self, other: Self, enabled: bool) {
		if enabled {
			self.0 |= other.0;
		} else {
			self.0 &= !other.0;
		}
	}
}

impl BitOr for SyncOptions {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl BitOrAssign for SyncOptions {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}

/// A GitHub user or organization linked to one Discord channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
	pub name: String,
	pub channel_id: u64,
	pub sync_options: SyncOptions,
	/// Absent until a Discord webhook has been provisioned.
	pub webhook_url: Option<String>,
}

/// A repository bound to its Discord thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLink {
	pub account: String,
	pub repository: String,
	pub thread_id: u64,
}

/// Connection state published by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreHealth {
	Healthy,
	/// `attempts` counts reopen attempts made so far in this outage.
	Reconnecting { attempts: u32 },
}

impl StoreHealth {
	pub fn is_healthy(&self) -> bool {
		matches!(self, Self::Healthy)
	}
}
