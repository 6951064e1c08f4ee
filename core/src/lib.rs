//! Invitation registry core.
//!
//! - **`derive`**: the code deriver, binding a raw code to its scope
//! - **`registry`**: the owner-gated state machine over derived fingerprints
//! - **`snapshot`**: full-state export and validated restore
//! - **`shared`**: a lock-guarded handle for multi-threaded hosts

pub mod derive;
pub mod registry;
pub mod shared;
pub mod snapshot;

pub use derive::derive;
pub use registry::{DEFAULT_MAX_BATCH_SIZE, Registry, RegistryLimits, StagedAdd, StagedClaim};
pub use shared::SharedRegistry;
pub use snapshot::{RegistrySnapshot, SnapshotError};

pub use invite_types::{
    ClaimRecord, EntryState, Fingerprint, Identity, RawCode, RegistryError, Scope,
};
