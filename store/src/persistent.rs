//! A registry whose every mutation is written through to SQLite.
//!
//! Each mutation is staged on the in-memory registry, written to the store in one
//! transaction, and only then committed in memory. A failed write leaves both
//! sides as they were.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use invite_core::{Registry, RegistryLimits, SnapshotError};
use invite_types::{EntryState, Fingerprint, Identity, RawCode, RegistryError, Scope};

use crate::sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("stored registry state is inconsistent: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    /// The registry rejection behind this error, if it was one.
    #[must_use]
    pub fn as_registry(&self) -> Option<&RegistryError> {
        match self {
            StoreError::Registry(err) => Some(err),
            StoreError::Snapshot(_) | StoreError::Storage(_) => None,
        }
    }
}

pub struct PersistentRegistry {
    registry: Registry,
    store: SqliteStore,
}

impl PersistentRegistry {
    /// Load the registry held by `store`, or initialize it with `creator` as owner.
    ///
    /// The stored owner is authoritative: reopening an existing store as a different
    /// identity does not transfer ownership.
    pub fn open(
        mut store: SqliteStore,
        creator: Identity,
        limits: RegistryLimits,
    ) -> Result<Self, StoreError> {
        let registry = match store.load()? {
            Some(snapshot) => {
                if snapshot.owner != creator {
                    warn!(
                        owner = %snapshot.owner,
                        %creator,
                        "Opening existing registry as non-owner; mutations will be rejected"
                    );
                }
                let registry = Registry::from_snapshot(snapshot, limits)?;
                info!(
                    registered = registry.len(),
                    claimed = registry.claimed_count(),
                    "Loaded invitation registry"
                );
                registry
            }
            None => {
                store.init_owner(creator)?;
                info!(owner = %creator, "Initialized invitation registry");
                Registry::with_limits(creator, limits)
            }
        };

        Ok(Self { registry, store })
    }

    pub fn open_path(
        path: impl AsRef<Path>,
        creator: Identity,
        limits: RegistryLimits,
    ) -> Result<Self, StoreError> {
        Self::open(SqliteStore::open(path)?, creator, limits)
    }

    /// Read-only view of the in-memory state.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn owner(&self) -> Identity {
        self.registry.owner()
    }

    pub fn add(&mut self, caller: Identity, fingerprint: Fingerprint) -> Result<(), StoreError> {
        let staged = self.registry.stage_add(caller, fingerprint)?;
        if !staged.fresh().is_empty() {
            self.store.insert_registered(staged.fresh())?;
        }
        staged.commit();
        Ok(())
    }

    pub fn add_multiple(
        &mut self,
        caller: Identity,
        fingerprints: &[Fingerprint],
    ) -> Result<usize, StoreError> {
        let staged = self.registry.stage_add_multiple(caller, fingerprints)?;
        if !staged.fresh().is_empty() {
            self.store.insert_registered(staged.fresh())?;
        }
        Ok(staged.commit())
    }

    pub fn claim(
        &mut self,
        caller: Identity,
        raw_code: &RawCode,
        claimant: Identity,
        scope: &Scope,
    ) -> Result<Fingerprint, StoreError> {
        let staged = self
            .registry
            .stage_claim(caller, raw_code, claimant, scope)?;
        self.store.insert_claim(staged.record())?;
        Ok(staged.commit().fingerprint)
    }

    #[must_use]
    pub fn verify(&self, raw_code: &RawCode, scope: &Scope) -> bool {
        self.registry.verify(raw_code, scope)
    }

    #[must_use]
    pub fn report(&self, raw_code: &RawCode, scope: &Scope) -> Option<Identity> {
        self.registry.report(raw_code, scope)
    }

    #[must_use]
    pub fn state(&self, fingerprint: &Fingerprint) -> EntryState {
        self.registry.state(fingerprint)
    }

    #[must_use]
    pub fn report_claimant(&self, claimant: Identity, scope: &Scope) -> Option<Identity> {
        self.registry.report_claimant(claimant, scope)
    }
}
