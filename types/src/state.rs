use serde::{Deserialize, Serialize};

use crate::code::Scope;
use crate::ids::{Fingerprint, Identity};

/// Lifecycle of a single fingerprint in a registry.
///
/// Transitions only move forward: `Unregistered -> Registered -> Claimed`.
/// A claim without a prior registration has no representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "claimant")]
pub enum EntryState {
    Unregistered,
    Registered,
    Claimed(Identity),
}

impl EntryState {
    #[must_use]
    pub fn claimant(&self) -> Option<Identity> {
        match self {
            EntryState::Claimed(claimant) => Some(*claimant),
            EntryState::Unregistered | EntryState::Registered => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntryState::Unregistered => "unregistered",
            EntryState::Registered => "registered",
            EntryState::Claimed(_) => "claimed",
        }
    }
}

/// A finalized claim, as exported in snapshots and persisted by stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub fingerprint: Fingerprint,
    pub claimant: Identity,
    /// Scope the code was presented under. Kept for claimant lookups.
    pub scope: Scope,
}
