//! The SQLite-backed registry across process restarts.

use invite_core::{EntryState, RawCode, RegistryError, RegistryLimits};
use invite_store::{PersistentRegistry, StoreError};
use tempfile::tempdir;

use crate::common::{INVITED, NON_OWNER, NOT_INVITED, OWNER, codes, event_scope, fingerprint};

fn registry_error(result: Result<impl Sized, StoreError>) -> Option<RegistryError> {
    result.err().and_then(|e| e.as_registry().cloned())
}

#[test]
fn state_survives_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("registry.db");
    let all = codes(4);

    {
        let mut registry =
            PersistentRegistry::open_path(&db, OWNER, RegistryLimits::default()).unwrap();
        let fps: Vec<_> = all.iter().map(fingerprint).collect();
        assert_eq!(registry.add_multiple(OWNER, &fps).unwrap(), 4);
        registry
            .claim(OWNER, &all[2], INVITED, &event_scope())
            .unwrap();
    }

    let reopened = PersistentRegistry::open_path(&db, OWNER, RegistryLimits::default()).unwrap();
    assert_eq!(reopened.owner(), OWNER);
    assert!(all.iter().all(|c| reopened.verify(c, &event_scope())));
    assert_eq!(reopened.report(&all[2], &event_scope()), Some(INVITED));
    assert_eq!(reopened.report(&all[0], &event_scope()), None);
    assert_eq!(
        reopened.report_claimant(INVITED, &event_scope()),
        Some(INVITED)
    );
    assert_eq!(reopened.registry().claimed_count(), 1);
}

#[test]
fn claims_stay_single_shot_after_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("registry.db");
    let code = RawCode::from("door-code");

    {
        let mut registry =
            PersistentRegistry::open_path(&db, OWNER, RegistryLimits::default()).unwrap();
        registry.add(OWNER, fingerprint(&code)).unwrap();
        registry
            .claim(OWNER, &code, INVITED, &event_scope())
            .unwrap();
    }

    let mut reopened =
        PersistentRegistry::open_path(&db, OWNER, RegistryLimits::default()).unwrap();
    let err = registry_error(reopened.claim(OWNER, &code, NOT_INVITED, &event_scope()));
    assert_eq!(err, Some(RegistryError::AlreadyClaimed { claimant: INVITED }));
    assert_eq!(
        reopened.state(&fingerprint(&code)),
        EntryState::Claimed(INVITED)
    );
}

#[test]
fn reopening_as_someone_else_does_not_transfer_ownership() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("registry.db");
    drop(PersistentRegistry::open_path(&db, OWNER, RegistryLimits::default()).unwrap());

    let mut hijack =
        PersistentRegistry::open_path(&db, NON_OWNER, RegistryLimits::default()).unwrap();
    assert_eq!(hijack.owner(), OWNER);

    let code = RawCode::from("sneaky");
    let err = registry_error(hijack.add(NON_OWNER, fingerprint(&code)));
    assert_eq!(err, Some(RegistryError::Unauthorized { caller: NON_OWNER }));
    assert!(!hijack.verify(&code, &event_scope()));
}

#[test]
fn rejected_mutations_write_nothing() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("registry.db");
    let all = codes(3);

    {
        let mut registry = PersistentRegistry::open_path(
            &db,
            OWNER,
            RegistryLimits { max_batch_size: 2 },
        )
        .unwrap();
        let fps: Vec<_> = all.iter().map(fingerprint).collect();
        assert_eq!(
            registry_error(registry.add_multiple(OWNER, &fps)),
            Some(RegistryError::BatchTooLarge { len: 3, max: 2 })
        );
        assert!(registry_error(registry.add_multiple(NON_OWNER, &fps[..1])).is_some());
        assert_eq!(
            registry_error(registry.claim(OWNER, &all[0], INVITED, &event_scope())),
            Some(RegistryError::NotRegistered)
        );
    }

    let reopened = PersistentRegistry::open_path(&db, OWNER, RegistryLimits::default()).unwrap();
    assert!(reopened.registry().is_empty());
}
