//! Same scenarios as the memory-store tests, against a real database.
//! Skipped unless `PAYLITE_TEST_DATABASE_URL` is set.

mod common;

use common::*;
use paylite::domain::error::PaymentError;
use paylite::domain::id::PaymentId;
use paylite::domain::payment::PaymentStatus;
use paylite::domain::webhook::WebhookOutcome;
use paylite::infra::postgres::PgStore;
use paylite::services::payments::{create_payment, get_payment};
use paylite::services::webhooks::apply_webhook_event;
use uuid::Uuid;

const DB_NAME: &str = "paylite_test";

async fn store() -> Option<PgStore> {
    setup_pool(DB_NAME).await.map(PgStore::new)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn deliver(store: &PgStore, id: &PaymentId, event: &str) -> Result<WebhookOutcome, PaymentError> {
    let (sig, body) = signed_webhook(id.as_str(), event);
    apply_webhook_event(store, &verifier(), &sig, &body).await
}

// ── 1. create_and_replay ───────────────────────────────────────────────────

#[tokio::test]
async fn create_and_replay() {
    let Some(store) = store().await else { return };
    let reference = unique("ref");
    let key = unique("k");

    let first = create_payment(&store, &token(&key), &make_request_with_reference("1999", &reference))
        .await
        .unwrap();
    let second = create_payment(&store, &token(&key), &make_request_with_reference("1999.00", &reference))
        .await
        .unwrap();

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(first.body, second.body);
    assert_eq!(count_payments(store.pool(), &reference).await, 1);

    let id = PaymentId::new(first.response().unwrap().payment_id).unwrap();
    let payment = get_payment(&store, &id).await.unwrap();
    assert_eq!(payment.status(), PaymentStatus::Pending);
    assert_eq!(payment.reference(), Some(reference.as_str()));
    assert_eq!(payment.money().currency().as_str(), "NGN");
}

// ── 2. reused_token_conflicts ──────────────────────────────────────────────

#[tokio::test]
async fn reused_token_conflicts() {
    let Some(store) = store().await else { return };
    let reference = unique("ref");
    let key = unique("k");

    create_payment(&store, &token(&key), &make_request_with_reference("1999", &reference))
        .await
        .unwrap();
    let err = create_payment(&store, &token(&key), &make_request_with_reference("2500", &reference))
        .await
        .unwrap_err();

    assert!(matches!(err, PaymentError::Conflict(_)));
    assert_eq!(count_payments(store.pool(), &reference).await, 1);
}

// ── 3. webhook_lifecycle ───────────────────────────────────────────────────

#[tokio::test]
async fn webhook_lifecycle() {
    let Some(store) = store().await else { return };
    let created = create_payment(&store, &token(&unique("k")), &make_request_with_reference("10", &unique("ref")))
        .await
        .unwrap();
    let id = PaymentId::new(created.response().unwrap().payment_id).unwrap();

    assert_eq!(
        deliver(&store, &id, "payment.succeeded").await.unwrap(),
        WebhookOutcome::Transitioned {
            from: PaymentStatus::Pending,
            to: PaymentStatus::Succeeded
        }
    );
    assert_eq!(
        deliver(&store, &id, "payment.succeeded").await.unwrap(),
        WebhookOutcome::Duplicate
    );
    assert_eq!(
        deliver(&store, &id, "payment.failed").await.unwrap(),
        WebhookOutcome::Ignored {
            current: PaymentStatus::Succeeded
        }
    );

    let payment = get_payment(&store, &id).await.unwrap();
    assert_eq!(payment.status(), PaymentStatus::Succeeded);
    assert!(payment.updated_at() >= payment.created_at());
    assert_eq!(count_events(store.pool(), id.as_str(), "payment.succeeded").await, 1);
    assert_eq!(count_events(store.pool(), id.as_str(), "payment.failed").await, 1);
}

// ── 4. webhook_for_unknown_payment ─────────────────────────────────────────

#[tokio::test]
async fn webhook_for_unknown_payment() {
    let Some(store) = store().await else { return };
    let ghost = PaymentId::new(unique("pl_ghost")).unwrap();

    let err = deliver(&store, &ghost, "payment.succeeded").await.unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
    assert_eq!(count_events(store.pool(), ghost.as_str(), "payment.succeeded").await, 0);
}

// ── 5. concurrent_creates_same_token ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_same_token() {
    let Some(store) = store().await else { return };
    let reference = unique("ref");
    let key = unique("k");

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        let (key, reference) = (key.clone(), reference.clone());
        handles.push(tokio::spawn(async move {
            create_payment(&store, &token(&key), &make_request_with_reference("1999", &reference))
                .await
                .unwrap()
        }));
    }

    let mut bodies = Vec::new();
    for h in handles {
        bodies.push(h.await.unwrap().body);
    }
    bodies.dedup();

    assert_eq!(bodies.len(), 1, "all responses identical");
    assert_eq!(count_payments(store.pool(), &reference).await, 1);
}

// ── 6. concurrent_identical_webhooks ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identical_webhooks() {
    let Some(store) = store().await else { return };
    let created = create_payment(&store, &token(&unique("k")), &make_request_with_reference("10", &unique("ref")))
        .await
        .unwrap();
    let id = PaymentId::new(created.response().unwrap().payment_id).unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            deliver(&store, &id, "payment.failed").await.unwrap()
        }));
    }

    let mut transitioned = 0;
    for h in handles {
        match h.await.unwrap() {
            WebhookOutcome::Transitioned { .. } => transitioned += 1,
            WebhookOutcome::Duplicate => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    assert_eq!(transitioned, 1);
    assert_eq!(count_events(store.pool(), id.as_str(), "payment.failed").await, 1);
    assert_eq!(
        get_payment(&store, &id).await.unwrap().status(),
        PaymentStatus::Failed
    );
}
