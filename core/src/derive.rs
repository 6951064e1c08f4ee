//! Code deriver: binds a raw invitation code to the scope it is valid for.
//!
//! The fingerprint is `SHA-256(tag || len(code) || code || len(scope) || scope)` with
//! big-endian `u64` lengths. Length prefixes make every `(code, scope)` split
//! unambiguous, so `("ab", "c")` and `("a", "bc")` never share a fingerprint.

use sha2::{Digest, Sha256};

use invite_types::{Fingerprint, RawCode, Scope};

const DOMAIN_TAG: &[u8] = b"invite-registry/fingerprint/v1";

/// Derive the scope-bound fingerprint for `raw_code`. Pure and callable by anyone.
#[must_use]
pub fn derive(raw_code: &RawCode, scope: &Scope) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_TAG);
    update_prefixed(&mut hasher, raw_code.as_bytes());
    update_prefixed(&mut hasher, scope.as_bytes());
    Fingerprint::from_bytes(hasher.finalize().into())
}

fn update_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
