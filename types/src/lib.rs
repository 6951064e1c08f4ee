//! Core domain types for the invitation registry.
//!
//! This crate contains pure domain types with no IO and minimal dependencies.
//! Everything here can be used from any layer: the deriver, the registry, and stores.

mod code;
mod error;
mod ids;
mod state;

pub use code::{RawCode, Scope};
pub use error::RegistryError;
pub use ids::{DecodeError, FINGERPRINT_LEN, Fingerprint, IDENTITY_LEN, Identity};
pub use state::{ClaimRecord, EntryState};
