//! Integration Tests for the UMBRA Debt Ledger
//!
//! End-to-end two-phase disclosure over the sealed backend, plus the
//! concurrency guarantees of record creation and verification.

use std::sync::Arc;

use umbra::committee::{encode_word, Committee};
use umbra::fhe::{
    AdmissionAuthority, HomomorphicBackend, Principal, SealedBackend, SealingKey,
};
use umbra::ledger::{
    plaintext_payment, DebtLedger, EventReceiver, FixedClock, FixedPointTerms, LedgerConfig,
    LedgerError, LedgerEvent, LedgerResult,
};

// =============================================================================
// FIXTURE
// =============================================================================

struct Deployment {
    key: SealingKey,
    authority: AdmissionAuthority,
    backend: Arc<SealedBackend>,
    committee: Committee,
    ledger: DebtLedger<SealedBackend>,
}

fn deploy() -> Deployment {
    deploy_with(LedgerConfig::default())
}

fn deploy_with(config: LedgerConfig) -> Deployment {
    let key = SealingKey::generate();
    let authority = AdmissionAuthority::generate();
    let backend = Arc::new(SealedBackend::new(key.clone(), authority.clone()));
    let committee = Committee::generate(5, 3, key.clone()).unwrap();
    let ledger = DebtLedger::new(config, backend.clone(), committee.keys())
        .with_clock(FixedClock(1_700_000_000));
    Deployment { key, authority, backend, committee, ledger }
}

impl Deployment {
    fn create_as(&self, caller: Principal, id: &str, amount: u32, rate: u32, term: u32) -> LedgerResult<()> {
        let raw = self.key.encrypt_u32(amount).unwrap();
        let proof = self.authority.issue(&raw, &self.ledger.admission_context(caller));
        self.ledger.create_record(caller, id, &raw, &proof, rate, term)
    }

    fn create(&self, id: &str, amount: u32, rate: u32, term: u32) -> LedgerResult<()> {
        self.create_as(alice(), id, amount, rate, term)
    }

    fn disclose(&self, id: &str) -> LedgerResult<()> {
        let handle = self.ledger.encrypted_amount(id)?;
        let disclosure = self.committee.disclose(self.backend.as_ref(), handle).unwrap();
        self.ledger.verify_amount(id, &disclosure.word, &disclosure.proof)
    }

    fn open(&self, handle: umbra::fhe::Handle) -> u64 {
        self.key.open(&self.backend.export(handle).unwrap()).unwrap().1
    }
}

fn drain(rx: &mut EventReceiver) -> Vec<LedgerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn alice() -> Principal {
    Principal::from_name("alice")
}

// =============================================================================
// RECORD CREATION
// =============================================================================

mod creation_tests {
    use super::*;

    #[test]
    fn test_duplicate_create_keeps_one_record() {
        let d = deploy();
        d.create("x", 1000, 12, 24).unwrap();

        assert_eq!(d.create("x", 2000, 6, 12), Err(LedgerError::DuplicateRecord("x".into())));
        assert_eq!(d.ledger.list_ids(), vec!["x".to_string()]);

        let view = d.ledger.get_record("x").unwrap();
        assert_eq!(view.interest_rate_annual, 12);
        assert_eq!(view.term_months, 24);
    }

    #[test]
    fn test_invalid_admission_proof_leaves_no_trace() {
        let d = deploy();
        d.create("a", 1000, 12, 24).unwrap();
        let mut rx = d.ledger.subscribe();

        let raw = d.key.encrypt_u32(500).unwrap();
        let forged = AdmissionAuthority::generate().issue(&raw, &d.ledger.admission_context(alice()));
        assert!(matches!(
            d.ledger.create_record(alice(), "b", &raw, &forged, 12, 24),
            Err(LedgerError::InvalidCiphertextProof(_))
        ));

        assert_eq!(d.ledger.record_count(), 1);
        assert_eq!(d.ledger.list_ids(), vec!["a".to_string()]);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_proof_replayed_by_other_caller_rejected() {
        let d = deploy();
        let raw = d.key.encrypt_u32(1000).unwrap();
        let proof = d.authority.issue(&raw, &d.ledger.admission_context(alice()));
        let mallory = Principal::from_name("mallory");

        assert!(matches!(
            d.ledger.create_record(mallory, "x", &raw, &proof, 12, 24),
            Err(LedgerError::InvalidCiphertextProof(_))
        ));
        assert!(d.ledger.create_record(alice(), "x", &raw, &proof, 12, 24).is_ok());
    }

    #[test]
    fn test_malformed_ciphertext_rejected() {
        let d = deploy();
        let raw = vec![0u8; 7];
        let proof = d.authority.issue(&raw, &d.ledger.admission_context(alice()));

        assert!(matches!(
            d.ledger.create_record(alice(), "x", &raw, &proof, 12, 24),
            Err(LedgerError::InvalidCiphertextProof(_))
        ));
        assert!(d.ledger.list_ids().is_empty());
    }

    #[test]
    fn test_list_ids_in_creation_order() {
        let d = deploy();
        for id in ["a", "b", "c"] {
            d.create(id, 100, 12, 12).unwrap();
        }
        d.disclose("c").unwrap();
        d.disclose("a").unwrap();

        assert_eq!(d.ledger.list_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_ids_is_a_fresh_snapshot() {
        let d = deploy();
        d.create("a", 100, 12, 12).unwrap();
        let first = d.ledger.list_ids();
        d.create("b", 100, 12, 12).unwrap();

        assert_eq!(first, vec!["a"]);
        assert_eq!(d.ledger.list_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_created_event_once() {
        let d = deploy();
        let mut rx = d.ledger.subscribe();
        d.create("a", 100, 12, 12).unwrap();
        let _ = d.create("a", 100, 12, 12);

        assert_eq!(
            drain(&mut rx),
            vec![LedgerEvent::RecordCreated { id: "a".into(), owner: alice() }]
        );
    }

    #[test]
    fn test_term_limit_from_config() {
        let d = deploy_with(LedgerConfig::default().with_max_term_months(360));
        assert!(d.create("a", 100, 12, 360).is_ok());
        assert!(matches!(d.create("b", 100, 12, 361), Err(LedgerError::InvalidTerms(_))));
    }
}

// =============================================================================
// VERIFIED DISCLOSURE
// =============================================================================

mod disclosure_tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let d = deploy();
        d.create("d1", 1000, 12, 24).unwrap();
        d.disclose("d1").unwrap();

        let view = d.ledger.get_record("d1").unwrap();
        assert!(view.verified);
        assert_eq!(view.decrypted_amount, Some(1000));
        assert_eq!(view.interest_rate_annual, 12);
        assert_eq!(view.term_months, 24);
        assert_eq!(view.owner, alice());
        assert_eq!(view.created_at, 1_700_000_000);
    }

    #[test]
    fn test_verify_before_create() {
        let d = deploy();
        let proof = d.committee.attest(&[0u8; 32], &encode_word(1000));
        assert_eq!(
            d.ledger.verify_amount("x", &encode_word(1000), &proof),
            Err(LedgerError::RecordNotFound("x".into()))
        );
    }

    #[test]
    fn test_second_verify_fails_and_keeps_value() {
        let d = deploy();
        d.create("x", 1000, 12, 24).unwrap();
        d.disclose("x").unwrap();

        // A different, well-formed claim is still refused
        let digest = d.backend.digest(d.ledger.encrypted_amount("x").unwrap()).unwrap();
        let word = encode_word(5);
        let proof = d.committee.attest(&digest, &word);
        assert_eq!(
            d.ledger.verify_amount("x", &word, &proof),
            Err(LedgerError::AlreadyVerified("x".into()))
        );
        assert_eq!(d.disclose("x"), Err(LedgerError::AlreadyVerified("x".into())));
        assert_eq!(d.ledger.get_record("x").unwrap().decrypted_amount, Some(1000));
    }

    #[test]
    fn test_wrong_cleartext_rejected() {
        let d = deploy();
        d.create("x", 1000, 12, 24).unwrap();
        let handle = d.ledger.encrypted_amount("x").unwrap();
        let disclosure = d.committee.disclose(d.backend.as_ref(), handle).unwrap();

        assert_eq!(
            d.ledger.verify_amount("x", &encode_word(999), &disclosure.proof),
            Err(LedgerError::InvalidDecryptionProof("x".into()))
        );
        let view = d.ledger.get_record("x").unwrap();
        assert!(!view.verified);
        assert_eq!(view.decrypted_amount, None);

        // The genuine disclosure still goes through afterwards
        assert!(d.ledger.verify_amount("x", &disclosure.word, &disclosure.proof).is_ok());
    }

    #[test]
    fn test_below_threshold_rejected() {
        let d = deploy();
        d.create("x", 1000, 12, 24).unwrap();
        let handle = d.ledger.encrypted_amount("x").unwrap();
        let mut disclosure = d.committee.disclose(d.backend.as_ref(), handle).unwrap();
        disclosure.proof.attestations.truncate(2);

        assert_eq!(
            d.ledger.verify_amount("x", &disclosure.word, &disclosure.proof),
            Err(LedgerError::InvalidDecryptionProof("x".into()))
        );
    }

    #[test]
    fn test_disclosed_event_once() {
        let d = deploy();
        d.create("x", 1000, 12, 24).unwrap();
        let mut rx = d.ledger.subscribe();
        d.disclose("x").unwrap();
        let _ = d.disclose("x");

        assert_eq!(
            drain(&mut rx),
            vec![LedgerEvent::AmountDisclosed { id: "x".into(), clear_value: 1000 }]
        );
    }

    #[test]
    fn test_computed_handles_not_disclosable() {
        let d = deploy();
        d.create("x", 1000, 12, 24).unwrap();
        let payment = d.ledger.monthly_payment("x").unwrap();
        assert!(d.committee.disclose(d.backend.as_ref(), payment).is_err());
    }
}

// =============================================================================
// AMORTIZATION
// =============================================================================

mod amortization_tests {
    use super::*;

    #[test]
    fn test_payment_stable_across_verification() {
        let d = deploy();
        d.create("d1", 1000, 12, 24).unwrap();

        let before = d.open(d.ledger.monthly_payment("d1").unwrap());
        d.disclose("d1").unwrap();
        let after = d.open(d.ledger.monthly_payment("d1").unwrap());

        assert_eq!(before, after);
        assert_eq!(before, 1000);
    }

    #[test]
    fn test_payment_does_not_touch_record() {
        let d = deploy();
        d.create("d1", 5000, 6, 36).unwrap();
        let view = d.ledger.get_record("d1").unwrap();
        let handle = d.ledger.encrypted_amount("d1").unwrap();

        d.ledger.monthly_payment("d1").unwrap();

        assert_eq!(d.ledger.get_record("d1").unwrap(), view);
        assert_eq!(d.ledger.encrypted_amount("d1").unwrap(), handle);
        assert!(d.backend.is_publicly_decryptable(handle).unwrap());
    }

    #[test]
    fn test_worked_values() {
        let d = deploy();
        for (id, rate, term, expected) in [("a", 12, 1, 2000), ("b", 6, 2, 899), ("c", 0, 4, 250)] {
            d.create(id, 1000, rate, term).unwrap();
            assert_eq!(d.open(d.ledger.monthly_payment(id).unwrap()), expected, "record {}", id);
        }
    }

    #[test]
    fn test_matches_plaintext_model() {
        let d = deploy();
        d.create("mortgage", 250_000, 4, 36).unwrap();
        let terms = FixedPointTerms::derive(4, 36).unwrap();

        assert_eq!(
            d.open(d.ledger.monthly_payment("mortgage").unwrap()),
            plaintext_payment(250_000, terms).unwrap()
        );
    }

    #[test]
    fn test_thirty_year_term_has_a_payment() {
        let d = deploy();
        d.create("mortgage-30y", 1000, 5, 360).unwrap();
        d.create("long", 1000, 12, 100).unwrap();

        assert_eq!(d.open(d.ledger.monthly_payment("mortgage-30y").unwrap()), 417);
        assert_eq!(d.open(d.ledger.monthly_payment("long").unwrap()), 1000);
    }

    #[test]
    fn test_repeated_reads_grow_store_by_constant() {
        let d = deploy();
        d.create("d1", 1000, 12, 24).unwrap();
        let before = d.backend.ciphertext_count();

        for _ in 0..1000 {
            d.ledger.monthly_payment("d1").unwrap();
        }

        assert_eq!(d.backend.ciphertext_count(), before + 2000);
    }

    #[test]
    fn test_unknown_record() {
        let d = deploy();
        assert_eq!(
            d.ledger.monthly_payment("ghost"),
            Err(LedgerError::RecordNotFound("ghost".into()))
        );
    }
}

// =============================================================================
// CONCURRENCY
// =============================================================================

mod concurrency_tests {
    use super::*;

    #[test]
    fn test_racing_creates_one_winner() {
        let d = deploy();
        let results: Vec<LedgerResult<()>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let d = &d;
                    s.spawn(move || d.create("contested", 1000 + i, 12, 24))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let wins = results.iter().filter(|r| r.is_ok()).count();
        let dupes = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::DuplicateRecord(_))))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(dupes, 15);
        assert_eq!(d.ledger.list_ids(), vec!["contested"]);
    }

    #[test]
    fn test_racing_verifies_one_winner() {
        let d = deploy();
        d.create("x", 4242, 12, 24).unwrap();
        let mut rx = d.ledger.subscribe();

        let results: Vec<LedgerResult<()>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let d = &d;
                    s.spawn(move || d.disclose("x"))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| *r == Err(LedgerError::AlreadyVerified("x".into()))));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn test_distinct_ids_in_parallel() {
        let d = deploy();
        std::thread::scope(|s| {
            for t in 0..4 {
                let d = &d;
                s.spawn(move || {
                    for i in 0..25 {
                        let id = format!("t{}-{}", t, i);
                        d.create(&id, i, 12, 12).unwrap();
                        d.disclose(&id).unwrap();
                    }
                });
            }
        });

        assert_eq!(d.ledger.record_count(), 100);
        for id in d.ledger.list_ids() {
            let view = d.ledger.get_record(&id).unwrap();
            assert!(view.verified);
        }
    }

    #[test]
    fn test_created_event_precedes_disclosure() {
        let d = deploy();
        let mut rx = d.ledger.subscribe();
        let ids: Vec<String> = (0..200).map(|i| format!("r{}", i)).collect();

        std::thread::scope(|s| {
            let (d, ids) = (&d, &ids);
            s.spawn(move || {
                for id in ids {
                    d.create(id, 7, 12, 12).unwrap();
                }
            });
            s.spawn(move || {
                for id in ids {
                    loop {
                        match d.disclose(id) {
                            Ok(()) => break,
                            Err(LedgerError::RecordNotFound(_)) => std::thread::yield_now(),
                            Err(e) => panic!("disclose {}: {}", id, e),
                        }
                    }
                }
            });
        });

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2 * ids.len());
        for id in &ids {
            let created = events
                .iter()
                .position(|e| matches!(e, LedgerEvent::RecordCreated { id: i, .. } if i == id))
                .unwrap();
            let disclosed = events
                .iter()
                .position(|e| matches!(e, LedgerEvent::AmountDisclosed { id: i, .. } if i == id))
                .unwrap();
            assert!(created < disclosed, "{} disclosed before created", id);
        }
    }
}
