//! Shared test utilities and fixtures
//!
//! Identities and scopes reused across the integration suite.

#![allow(dead_code)]

use invite_core::{Identity, RawCode, Scope, derive};
use invite_types::{Fingerprint, IDENTITY_LEN};

pub const OWNER: Identity = Identity::new([0x01; IDENTITY_LEN]);
pub const NON_OWNER: Identity = Identity::new([0x02; IDENTITY_LEN]);
pub const INVITED: Identity = Identity::new([0x03; IDENTITY_LEN]);
pub const NOT_INVITED: Identity = Identity::new([0x04; IDENTITY_LEN]);

/// Scope a code is registered under.
pub fn event_scope() -> Scope {
    Scope::from(Identity::new([0xc0; IDENTITY_LEN]))
}

/// A different scope that must never accept codes registered for `event_scope`.
pub fn other_scope() -> Scope {
    Scope::from(Identity::new([0xc1; IDENTITY_LEN]))
}

pub fn fingerprint(code: &RawCode) -> Fingerprint {
    derive(code, &event_scope())
}

/// `count` distinct, unguessable-looking codes.
pub fn codes(count: usize) -> Vec<RawCode> {
    (0..count)
        .map(|i| RawCode::new(format!("invite-{i:04}-{:08x}", (i as u32).wrapping_mul(0x9e37_79b9))))
        .collect()
}
