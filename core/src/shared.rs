//! Thread-shareable registry handle.
//!
//! Mutations take the write lock for their whole check-then-write sequence, so a
//! reader holding the read lock never sees a half-applied change.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use invite_types::{EntryState, Fingerprint, Identity, RawCode, RegistryError, Scope};

use crate::registry::Registry;
use crate::snapshot::RegistrySnapshot;

#[derive(Debug, Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Registry>>,
}

impl SharedRegistry {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    // A panic while holding the lock cannot leave a partial mutation behind:
    // every write path runs its checks before touching state.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn owner(&self) -> Identity {
        self.read().owner()
    }

    pub fn add(&self, caller: Identity, fingerprint: Fingerprint) -> Result<(), RegistryError> {
        self.write().add(caller, fingerprint)
    }

    pub fn add_multiple(
        &self,
        caller: Identity,
        fingerprints: &[Fingerprint],
    ) -> Result<usize, RegistryError> {
        self.write().add_multiple(caller, fingerprints)
    }

    pub fn claim(
        &self,
        caller: Identity,
        raw_code: &RawCode,
        claimant: Identity,
        scope: &Scope,
    ) -> Result<Fingerprint, RegistryError> {
        self.write().claim(caller, raw_code, claimant, scope)
    }

    #[must_use]
    pub fn verify(&self, raw_code: &RawCode, scope: &Scope) -> bool {
        self.read().verify(raw_code, scope)
    }

    #[must_use]
    pub fn report(&self, raw_code: &RawCode, scope: &Scope) -> Option<Identity> {
        self.read().report(raw_code, scope)
    }

    #[must_use]
    pub fn state(&self, fingerprint: &Fingerprint) -> EntryState {
        self.read().state(fingerprint)
    }

    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.read().snapshot()
    }
}
