//! End-to-end behavior of the in-memory registry.
//!
//! Mirrors how an event host uses it: the organizer registers codes, guests present
//! them at the door, and anyone can audit who got in.

use invite_core::{EntryState, RawCode, Registry, RegistryError, derive};

use crate::common::{
    INVITED, NON_OWNER, NOT_INVITED, OWNER, codes, event_scope, fingerprint, other_scope,
};

#[test]
fn non_owner_cannot_add() {
    let mut registry = Registry::new(OWNER);
    let code = RawCode::from("1234567890");

    let result = registry.add(NON_OWNER, fingerprint(&code));
    assert_eq!(result, Err(RegistryError::Unauthorized { caller: NON_OWNER }));
    assert!(!registry.verify(&code, &event_scope()));
}

#[test]
fn add_multiple_registers_every_code() {
    let mut registry = Registry::new(OWNER);
    let batch = codes(11);
    let (registered, held_back) = batch.split_at(10);
    let fingerprints: Vec<_> = registered.iter().map(fingerprint).collect();

    assert_eq!(registry.add_multiple(OWNER, &fingerprints), Ok(10));

    for code in registered {
        assert!(registry.verify(code, &event_scope()));
    }
    assert!(!registry.verify(&held_back[0], &event_scope()));
}

#[test]
fn verify_ignores_unrelated_entries() {
    let mut registry = Registry::new(OWNER);
    let code = RawCode::from("1234567890");
    registry.add(OWNER, fingerprint(&code)).unwrap();
    registry
        .add(OWNER, derive(&RawCode::from("other_code"), &event_scope()))
        .unwrap();

    assert!(registry.verify(&code, &event_scope()));
    assert!(!registry.verify(&code, &other_scope()));
}

#[test]
fn verify_is_false_then_true_and_stays_true() {
    let mut registry = Registry::new(OWNER);
    let code = RawCode::from("repeat-me");
    assert!(!registry.verify(&code, &event_scope()));

    for _ in 0..5 {
        registry.add(OWNER, fingerprint(&code)).unwrap();
        assert!(registry.verify(&code, &event_scope()));
    }
}

#[test]
fn non_owner_mutations_leave_state_identical() {
    let mut registry = Registry::new(OWNER);
    let all = codes(3);
    registry.add(OWNER, fingerprint(&all[0])).unwrap();
    registry
        .claim(OWNER, &all[0], INVITED, &event_scope())
        .unwrap();
    registry.add(OWNER, fingerprint(&all[1])).unwrap();
    let before = registry.snapshot();

    let unauthorized = RegistryError::Unauthorized { caller: NON_OWNER };
    assert_eq!(
        registry.add(NON_OWNER, fingerprint(&all[2])),
        Err(unauthorized.clone())
    );
    assert_eq!(
        registry.add_multiple(NON_OWNER, &[fingerprint(&all[2])]),
        Err(unauthorized.clone())
    );
    assert_eq!(
        registry.claim(NON_OWNER, &all[1], NON_OWNER, &event_scope()),
        Err(unauthorized)
    );

    assert_eq!(registry.snapshot(), before);
}

#[test]
fn non_owner_cannot_claim() {
    let mut registry = Registry::new(OWNER);
    let code = RawCode::from("1234567890");
    registry.add(OWNER, fingerprint(&code)).unwrap();

    assert!(registry.claim(INVITED, &code, INVITED, &event_scope()).is_err());
    assert_ne!(registry.report(&code, &event_scope()), Some(INVITED));
}

#[test]
fn owner_can_claim_for_invitee() {
    let mut registry = Registry::new(OWNER);
    let code = RawCode::from("1234567890");
    registry.add(OWNER, fingerprint(&code)).unwrap();

    registry
        .claim(OWNER, &code, INVITED, &event_scope())
        .unwrap();
    assert_eq!(registry.report(&code, &event_scope()), Some(INVITED));
}

#[test]
fn code_cannot_be_claimed_twice() {
    let mut registry = Registry::new(OWNER);
    let code = RawCode::from("1234567890");
    registry.add(OWNER, fingerprint(&code)).unwrap();
    registry
        .claim(OWNER, &code, INVITED, &event_scope())
        .unwrap();

    let second = registry.claim(OWNER, &code, NOT_INVITED, &event_scope());
    assert_eq!(
        second,
        Err(RegistryError::AlreadyClaimed { claimant: INVITED })
    );
    assert_eq!(registry.report(&code, &event_scope()), Some(INVITED));
}

#[test]
fn code_cannot_be_claimed_under_another_scope() {
    let mut registry = Registry::new(OWNER);
    let code = RawCode::from("1234567890");
    registry.add(OWNER, fingerprint(&code)).unwrap();

    let result = registry.claim(OWNER, &code, INVITED, &other_scope());
    assert_eq!(result, Err(RegistryError::NotRegistered));
    assert_eq!(registry.report(&code, &event_scope()), None);
    assert_eq!(registry.state(&fingerprint(&code)), EntryState::Registered);
}

#[test]
fn scope_isolation_holds_for_many_codes() {
    for code in codes(64) {
        assert_ne!(
            derive(&code, &event_scope()),
            derive(&code, &other_scope())
        );
    }
}

#[test]
fn salted_codes_from_one_secret_claim_independently() {
    let first_participant = INVITED;
    let second_participant = NOT_INVITED;
    let secret = b"somecomplexstring";
    let first = RawCode::salted(b"1", secret);
    let second = RawCode::salted(b"2", secret);

    let mut registry = Registry::new(OWNER);
    registry
        .add_multiple(OWNER, &[fingerprint(&first), fingerprint(&second)])
        .unwrap();

    registry
        .claim(OWNER, &first, first_participant, &event_scope())
        .unwrap();
    assert_eq!(registry.report(&second, &event_scope()), None);
    assert_eq!(
        registry.state(&fingerprint(&second)),
        EntryState::Registered
    );

    registry
        .claim(OWNER, &second, second_participant, &event_scope())
        .unwrap();
    assert_eq!(
        registry.report(&first, &event_scope()),
        Some(first_participant)
    );
    assert_eq!(
        registry.report(&second, &event_scope()),
        Some(second_participant)
    );
    assert_eq!(
        registry.report_claimant(first_participant, &event_scope()),
        Some(first_participant)
    );
    assert_eq!(
        registry.report_claimant(second_participant, &event_scope()),
        Some(second_participant)
    );
}

#[test]
fn rejected_batch_is_all_or_nothing() {
    let mut registry = Registry::with_limits(
        OWNER,
        invite_core::RegistryLimits { max_batch_size: 4 },
    );
    let batch: Vec<_> = codes(5).iter().map(fingerprint).collect();

    assert_eq!(
        registry.add_multiple(OWNER, &batch),
        Err(RegistryError::BatchTooLarge { len: 5, max: 4 })
    );
    assert!(batch.iter().all(|fp| !registry.is_registered(fp)));

    assert_eq!(registry.add_multiple(OWNER, &batch[..4]), Ok(4));
}
