use chrono::Utc;
use paylite::domain::fingerprint::fingerprint;
use paylite::domain::id::PaymentId;
use paylite::domain::payment::{CreatePaymentRequest, EventAction, Payment, PaymentStatus};
use paylite::domain::signature::SignatureVerifier;
use paylite::domain::webhook::EventKind;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_status() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Succeeded),
        Just(PaymentStatus::Failed),
    ]
}

fn arb_event() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Succeeded),
        Just(EventKind::Failed),
        "[a-z]{1,8}\\.[a-z]{1,8}".prop_map(|s| EventKind::from(s.as_str())),
    ]
}

fn pending_payment(cents: i64) -> Payment {
    let request = CreatePaymentRequest {
        amount: Decimal::new(cents, 2),
        currency: "NGN".into(),
        customer_email: "user@example.com".into(),
        reference: None,
    }
    .validate()
    .unwrap();
    Payment::new(PaymentId::generate(), request, Utc::now())
}

proptest! {
    /// Terminal states (Succeeded, Failed) can never transition to anything.
    #[test]
    fn terminal_states_reject_all_transitions(target in arb_status()) {
        use PaymentStatus::*;
        for terminal in [Succeeded, Failed] {
            prop_assert!(!terminal.can_transition_to(&target));
        }
    }

    /// Any sequence of events applied to a pending payment changes its
    /// status at most once, and only to the first recognized outcome.
    #[test]
    fn event_walk_transitions_at_most_once(
        events in prop::collection::vec(arb_event(), 1..20)
    ) {
        let mut payment = pending_payment(1999);
        let mut transitions = 0u32;
        let first_outcome = events.iter().find_map(EventKind::target_status);

        for event in &events {
            if let EventAction::Advance { to } = payment.decide(event) {
                payment = payment.transition(to, Utc::now()).unwrap();
                transitions += 1;
            }
        }

        prop_assert!(transitions <= 1, "got {transitions} transitions in walk: {events:?}");
        match first_outcome {
            Some(to) => prop_assert_eq!(payment.status(), to),
            None => prop_assert_eq!(payment.status(), PaymentStatus::Pending),
        }
    }

    /// as_str → try_from roundtrip is identity for any status.
    #[test]
    fn status_roundtrip(status in arb_status()) {
        let roundtripped = PaymentStatus::try_from(status.as_str()).unwrap();
        prop_assert_eq!(roundtripped, status);
    }

    /// Trailing zeros never change a request's fingerprint.
    #[test]
    fn fingerprint_ignores_scale(cents in 1i64..=1_000_000_000, extra in 0u32..6) {
        let make = |amount: Decimal| CreatePaymentRequest {
            amount,
            currency: "USD".into(),
            customer_email: "a@b.co".into(),
            reference: Some("r".into()),
        }
        .validate()
        .unwrap();

        let base = Decimal::new(cents, 2);
        let mut rescaled = base;
        rescaled.rescale(2 + extra);

        prop_assert_eq!(
            fingerprint(&make(base)).unwrap(),
            fingerprint(&make(rescaled)).unwrap()
        );
    }

    /// Different amounts never share a fingerprint.
    #[test]
    fn fingerprint_separates_amounts(a in 1i64..=1_000_000, b in 1i64..=1_000_000) {
        prop_assume!(a != b);
        let fp = |cents| fingerprint(&pending_request(cents)).unwrap();
        prop_assert_ne!(fp(a), fp(b));
    }

    /// A signature verifies only for the exact payload it was made for.
    #[test]
    fn signature_binds_payload(payload in prop::collection::vec(any::<u8>(), 0..256), flip in any::<usize>()) {
        let verifier = SignatureVerifier::new("prop-secret").unwrap();
        let sig = verifier.sign(&payload);
        prop_assert!(verifier.verify(&sig, &payload));

        if !payload.is_empty() {
            let mut tampered = payload.clone();
            let i = flip % tampered.len();
            tampered[i] ^= 0x01;
            prop_assert!(!verifier.verify(&sig, &tampered));
        }
    }
}

fn pending_request(cents: i64) -> paylite::domain::payment::PaymentRequest {
    CreatePaymentRequest {
        amount: Decimal::new(cents, 2),
        currency: "NGN".into(),
        customer_email: "user@example.com".into(),
        reference: None,
    }
    .validate()
    .unwrap()
}
