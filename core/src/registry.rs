//! The invitation registry state machine.
//!
//! One owner, fixed at construction, is the only identity allowed to mutate the
//! registry. Anyone may verify a code or ask who claimed it.
//!
//! Every mutation is a check-then-write unit behind `&mut self`. The multi-entry
//! and persistence-facing paths are split into `stage_*` (all checks, no writes)
//! and `commit` (writes only, cannot fail), so a staged change that is dropped
//! leaves no trace.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info, warn};

use invite_types::{ClaimRecord, EntryState, Fingerprint, Identity, RawCode, RegistryError, Scope};

use crate::derive::derive;

pub const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryLimits {
    /// Largest batch accepted by `add_multiple`.
    pub max_batch_size: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

/// Storage slot for a registered fingerprint. Absence means `Unregistered`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Unclaimed,
    Claimed { claimant: Identity, scope: Scope },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    owner: Identity,
    limits: RegistryLimits,
    pub(crate) entries: HashMap<Fingerprint, Slot>,
    /// Reverse index for claimant lookups, maintained on every claim.
    pub(crate) by_claimant: HashMap<(Identity, Scope), BTreeSet<Fingerprint>>,
    pub(crate) claimed: usize,
}

impl Registry {
    /// Create an empty registry. The creator becomes the owner for the registry's lifetime.
    #[must_use]
    pub fn new(creator: Identity) -> Self {
        Self::with_limits(creator, RegistryLimits::default())
    }

    #[must_use]
    pub fn with_limits(creator: Identity, limits: RegistryLimits) -> Self {
        Self {
            owner: creator,
            limits,
            entries: HashMap::new(),
            by_claimant: HashMap::new(),
            claimed: 0,
        }
    }

    #[must_use]
    pub fn owner(&self) -> Identity {
        self.owner
    }

    #[must_use]
    pub fn limits(&self) -> RegistryLimits {
        self.limits
    }

    /// Number of registered fingerprints, claimed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn claimed_count(&self) -> usize {
        self.claimed
    }

    fn authorize(&self, caller: Identity, op: &'static str) -> Result<(), RegistryError> {
        if caller == self.owner {
            return Ok(());
        }
        warn!(%caller, op, "Rejected registry mutation from non-owner");
        Err(RegistryError::Unauthorized { caller })
    }

    /// Register a pre-derived fingerprint. Re-adding a registered fingerprint succeeds
    /// without changing anything, including an existing claim.
    pub fn add(&mut self, caller: Identity, fingerprint: Fingerprint) -> Result<(), RegistryError> {
        self.stage_add(caller, fingerprint)?.commit();
        Ok(())
    }

    /// Run the checks for a single add. Not subject to the batch limit.
    pub fn stage_add(
        &mut self,
        caller: Identity,
        fingerprint: Fingerprint,
    ) -> Result<StagedAdd<'_>, RegistryError> {
        self.authorize(caller, "add")?;
        let fresh = if self.entries.contains_key(&fingerprint) {
            debug!(%fingerprint, "Fingerprint already registered");
            Vec::new()
        } else {
            vec![fingerprint]
        };
        Ok(StagedAdd {
            registry: self,
            fresh,
        })
    }

    /// Register a batch of fingerprints, all or nothing. Returns how many were new.
    pub fn add_multiple(
        &mut self,
        caller: Identity,
        fingerprints: &[Fingerprint],
    ) -> Result<usize, RegistryError> {
        Ok(self.stage_add_multiple(caller, fingerprints)?.commit())
    }

    /// Run every check for a batch add and compute its effect without applying it.
    pub fn stage_add_multiple(
        &mut self,
        caller: Identity,
        fingerprints: &[Fingerprint],
    ) -> Result<StagedAdd<'_>, RegistryError> {
        self.authorize(caller, "add_multiple")?;

        let max = self.limits.max_batch_size;
        if fingerprints.len() > max {
            warn!(len = fingerprints.len(), max, "Rejected oversize batch");
            return Err(RegistryError::BatchTooLarge {
                len: fingerprints.len(),
                max,
            });
        }

        let mut seen = HashSet::with_capacity(fingerprints.len());
        let fresh = fingerprints
            .iter()
            .copied()
            .filter(|fp| !self.entries.contains_key(fp) && seen.insert(*fp))
            .collect();

        Ok(StagedAdd {
            registry: self,
            fresh,
        })
    }

    /// Whether `raw_code` was registered for `scope`.
    #[must_use]
    pub fn verify(&self, raw_code: &RawCode, scope: &Scope) -> bool {
        self.is_registered(&derive(raw_code, scope))
    }

    #[must_use]
    pub fn is_registered(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(fingerprint)
    }

    /// Bind `claimant` to the code. Single-shot: a claimed code stays with its first claimant.
    pub fn claim(
        &mut self,
        caller: Identity,
        raw_code: &RawCode,
        claimant: Identity,
        scope: &Scope,
    ) -> Result<Fingerprint, RegistryError> {
        Ok(self
            .stage_claim(caller, raw_code, claimant, scope)?
            .commit()
            .fingerprint)
    }

    /// Run every check for a claim without applying it.
    pub fn stage_claim(
        &mut self,
        caller: Identity,
        raw_code: &RawCode,
        claimant: Identity,
        scope: &Scope,
    ) -> Result<StagedClaim<'_>, RegistryError> {
        self.authorize(caller, "claim")?;

        let fingerprint = derive(raw_code, scope);
        match self.state(&fingerprint) {
            EntryState::Unregistered => {
                debug!(%fingerprint, %scope, "Claim rejected: not registered");
                Err(RegistryError::NotRegistered)
            }
            EntryState::Claimed(existing) => {
                debug!(%fingerprint, claimant = %existing, "Claim rejected: already claimed");
                Err(RegistryError::AlreadyClaimed { claimant: existing })
            }
            EntryState::Registered => Ok(StagedClaim {
                registry: self,
                record: ClaimRecord {
                    fingerprint,
                    claimant,
                    scope: scope.clone(),
                },
            }),
        }
    }

    /// The claimant bound to `raw_code` under `scope`, if any.
    #[must_use]
    pub fn report(&self, raw_code: &RawCode, scope: &Scope) -> Option<Identity> {
        self.state(&derive(raw_code, scope)).claimant()
    }

    #[must_use]
    pub fn state(&self, fingerprint: &Fingerprint) -> EntryState {
        match self.entries.get(fingerprint) {
            None => EntryState::Unregistered,
            Some(Slot::Unclaimed) => EntryState::Registered,
            Some(Slot::Claimed { claimant, .. }) => EntryState::Claimed(*claimant),
        }
    }

    /// Fingerprints claimed by `claimant` under `scope`, in fingerprint order.
    #[must_use]
    pub fn claims_of(&self, claimant: Identity, scope: &Scope) -> Vec<Fingerprint> {
        self.by_claimant
            .get(&(claimant, scope.clone()))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// `claimant` if they hold at least one claim under `scope`.
    #[must_use]
    pub fn report_claimant(&self, claimant: Identity, scope: &Scope) -> Option<Identity> {
        self.by_claimant
            .get(&(claimant, scope.clone()))
            .filter(|set| !set.is_empty())
            .map(|_| claimant)
    }

    pub(crate) fn insert_claim(&mut self, record: ClaimRecord) {
        let ClaimRecord {
            fingerprint,
            claimant,
            scope,
        } = record;
        self.by_claimant
            .entry((claimant, scope.clone()))
            .or_default()
            .insert(fingerprint);
        self.entries
            .insert(fingerprint, Slot::Claimed { claimant, scope });
        self.claimed += 1;
    }
}

/// A checked registration of one or more fingerprints. Dropping it applies nothing.
#[must_use = "a staged add does nothing until committed"]
#[derive(Debug)]
pub struct StagedAdd<'a> {
    registry: &'a mut Registry,
    fresh: Vec<Fingerprint>,
}

impl StagedAdd<'_> {
    /// Fingerprints the commit will newly register, deduplicated, in input order.
    #[must_use]
    pub fn fresh(&self) -> &[Fingerprint] {
        &self.fresh
    }

    pub fn commit(self) -> usize {
        let count = self.fresh.len();
        self.registry
            .entries
            .extend(self.fresh.into_iter().map(|fp| (fp, Slot::Unclaimed)));
        if count > 0 {
            debug!(count, total = self.registry.entries.len(), "Registered fingerprints");
        }
        count
    }
}

/// A checked claim. Dropping it applies nothing.
#[must_use = "a staged claim does nothing until committed"]
#[derive(Debug)]
pub struct StagedClaim<'a> {
    registry: &'a mut Registry,
    record: ClaimRecord,
}

impl StagedClaim<'_> {
    #[must_use]
    pub fn record(&self) -> &ClaimRecord {
        &self.record
    }

    pub fn commit(self) -> ClaimRecord {
        info!(
            fingerprint = %self.record.fingerprint,
            claimant = %self.record.claimant,
            "Invitation claimed"
        );
        self.registry.insert_claim(self.record.clone());
        self.record
    }
}
