use thiserror::Error;

use crate::ids::Identity;

/// A rejected registry transition. Every variant leaves registry state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("caller {caller} is not the registry owner")]
    Unauthorized { caller: Identity },
    #[error("invitation code is not registered for this scope")]
    NotRegistered,
    #[error("invitation code was already claimed by {claimant}")]
    AlreadyClaimed { claimant: Identity },
    #[error("batch of {len} fingerprints exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },
}

impl RegistryError {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            RegistryError::Unauthorized { .. } => "unauthorized",
            RegistryError::NotRegistered => "not_registered",
            RegistryError::AlreadyClaimed { .. } => "already_claimed",
            RegistryError::BatchTooLarge { .. } => "batch_too_large",
        }
    }
}
