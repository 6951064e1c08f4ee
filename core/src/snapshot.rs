//! Plain-data export and restore of a registry's full state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use invite_types::{ClaimRecord, Fingerprint, Identity};

use crate::registry::{Registry, RegistryLimits, Slot};

/// Every registered fingerprint and every claim, in fingerprint order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub owner: Identity,
    pub registered: Vec<Fingerprint>,
    pub claims: Vec<ClaimRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("claim for {fingerprint} has no matching registration")]
    UnregisteredClaim { fingerprint: Fingerprint },
    #[error("fingerprint {fingerprint} is claimed more than once")]
    DuplicateClaim { fingerprint: Fingerprint },
}

impl Registry {
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut registered: Vec<Fingerprint> = self.entries.keys().copied().collect();
        registered.sort_unstable();

        let mut claims: Vec<ClaimRecord> = self
            .entries
            .iter()
            .filter_map(|(fingerprint, slot)| match slot {
                Slot::Unclaimed => None,
                Slot::Claimed { claimant, scope } => Some(ClaimRecord {
                    fingerprint: *fingerprint,
                    claimant: *claimant,
                    scope: scope.clone(),
                }),
            })
            .collect();
        claims.sort_unstable_by_key(|record| record.fingerprint);

        RegistrySnapshot {
            owner: self.owner(),
            registered,
            claims,
        }
    }

    /// Rebuild a registry from a snapshot.
    ///
    /// Rejects snapshots that break the claim invariants: a claim on an
    /// unregistered fingerprint, or two claims on one fingerprint.
    pub fn from_snapshot(
        snapshot: RegistrySnapshot,
        limits: RegistryLimits,
    ) -> Result<Self, SnapshotError> {
        let RegistrySnapshot {
            owner,
            registered,
            claims,
        } = snapshot;

        let mut registry = Registry::with_limits(owner, limits);
        registry
            .entries
            .extend(registered.into_iter().map(|fp| (fp, Slot::Unclaimed)));

        let mut seen = HashSet::with_capacity(claims.len());
        for record in claims {
            let fingerprint = record.fingerprint;
            if !registry.is_registered(&fingerprint) {
                return Err(SnapshotError::UnregisteredClaim { fingerprint });
            }
            if !seen.insert(fingerprint) {
                return Err(SnapshotError::DuplicateClaim { fingerprint });
            }
            registry.insert_claim(record);
        }

        Ok(registry)
    }
}
