mod common;

use serde_json::json;

use common::{Pipeline, CUSTOMER_A, CUSTOMER_B};
use order_pipeline::domain::order::{LineItem, OrderRequest, OrderStatus};
use order_pipeline::messaging::{DropReason, MessageOutcome};

fn request(customer_id: &str, sku: &str, quantity: i64, total_amount: f64) -> OrderRequest {
    OrderRequest {
        customer_id: customer_id.to_string(),
        items: vec![LineItem::new(sku, quantity)],
        total_amount,
    }
}

fn raw(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

#[tokio::test]
async fn submitted_order_is_persisted_after_consumption() {
    let mut pipeline = Pipeline::new();

    let event = pipeline
        .submit
        .execute(request(CUSTOMER_A, "SKU-1", 3, 45.0), "corr-e2e")
        .await
        .unwrap();

    // Acknowledged before anything is stored.
    assert!(pipeline.repository.list().await.unwrap().is_empty());

    let outcomes = pipeline.drain().await;
    assert_eq!(outcomes.len(), 1);
    let MessageOutcome::Persisted(order) = &outcomes[0] else {
        panic!("expected persisted outcome, got {:?}", outcomes[0]);
    };

    assert_eq!(order.customer_id(), CUSTOMER_A);
    assert_eq!(order.items()[0].sku(), "SKU-1");
    assert_eq!(order.items()[0].quantity(), 3);
    assert_eq!(order.total_amount().amount(), 45.0);
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(Some(order.created_at()), event.created_at_timestamp());

    let stored = pipeline.repository.find_by_id(order.id()).await.unwrap();
    assert_eq!(stored.as_ref(), Some(order));
}

#[tokio::test]
async fn message_key_is_the_correlation_id() {
    let mut pipeline = Pipeline::new();

    pipeline
        .submit
        .execute(request(CUSTOMER_A, "SKU-1", 1, 10.0), "corr-key")
        .await
        .unwrap();

    let (key, payload) = pipeline.topic.try_recv().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();

    assert_eq!(key, "corr-key");
    assert_eq!(value["correlationId"], "corr-key");
    assert_eq!(value["customerId"], CUSTOMER_A);
    assert!(value["createdAt"].is_string());
}

#[tokio::test]
async fn event_with_no_items_is_dropped() {
    let pipeline = Pipeline::new();
    let payload = raw(json!({
        "customerId": CUSTOMER_A,
        "items": [],
        "totalAmount": 10,
        "correlationId": "corr-b",
        "createdAt": "2024-01-01T00:00:00.000Z"
    }));

    let outcome = pipeline.handler.handle_message(Some("corr-b"), Some(payload.as_slice())).await;

    assert_eq!(outcome, MessageOutcome::Dropped(DropReason::Validation));
    assert!(pipeline.repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn event_with_negative_total_is_dropped() {
    let pipeline = Pipeline::new();
    pipeline
        .create
        .execute(request(CUSTOMER_B, "SKU-9", 1, 5.0))
        .await
        .unwrap();
    let before = pipeline.repository.list().await.unwrap().len();

    let payload = raw(json!({
        "customerId": CUSTOMER_A,
        "items": [{ "sku": "SKU-1", "quantity": 1 }],
        "totalAmount": -10,
        "correlationId": "corr-c"
    }));
    let outcome = pipeline.handler.handle_message(Some("corr-c"), Some(payload.as_slice())).await;

    assert!(matches!(outcome, MessageOutcome::Dropped(_)));
    assert_eq!(pipeline.repository.list().await.unwrap().len(), before);
}

#[tokio::test]
async fn concurrent_submissions_do_not_cross_contaminate() {
    let mut pipeline = Pipeline::new();

    let first = {
        let submit = pipeline.submit.clone();
        tokio::spawn(async move {
            submit
                .execute(request(CUSTOMER_A, "SKU-A", 2, 20.0), "corr-a")
                .await
        })
    };
    let second = {
        let submit = pipeline.submit.clone();
        tokio::spawn(async move {
            submit
                .execute(request(CUSTOMER_B, "SKU-B", 7, 70.0), "corr-b")
                .await
        })
    };
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let outcomes = pipeline.drain().await;
    assert_eq!(outcomes.len(), 2);

    let orders = pipeline.repository.list().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_ne!(orders[0].id(), orders[1].id());

    for order in &orders {
        match order.customer_id() {
            CUSTOMER_A => {
                assert_eq!(order.items()[0].sku(), "SKU-A");
                assert_eq!(order.items()[0].quantity(), 2);
                assert_eq!(order.total_amount().amount(), 20.0);
            }
            CUSTOMER_B => {
                assert_eq!(order.items()[0].sku(), "SKU-B");
                assert_eq!(order.items()[0].quantity(), 7);
                assert_eq!(order.total_amount().amount(), 70.0);
            }
            other => panic!("unexpected customer {other}"),
        }
    }
}

#[tokio::test]
async fn unknown_id_is_not_found_rather_than_an_error() {
    let pipeline = Pipeline::new();

    let found = pipeline.repository.find_by_id("never-created").await;

    assert!(matches!(found, Ok(None)));
}

#[tokio::test]
async fn same_event_delivered_twice_creates_two_orders() {
    let pipeline = Pipeline::new();
    let payload = raw(json!({
        "customerId": CUSTOMER_A,
        "items": [{ "sku": "SKU-1", "quantity": 1 }],
        "totalAmount": 12.5,
        "correlationId": "corr-dup"
    }));

    for _ in 0..2 {
        let outcome = pipeline.handler.handle_message(Some("corr-dup"), Some(payload.as_slice())).await;
        assert!(matches!(outcome, MessageOutcome::Persisted(_)));
    }

    // At-least-once: redelivery is not deduplicated.
    assert_eq!(pipeline.repository.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn newer_producer_fields_are_ignored_by_the_consumer() {
    let pipeline = Pipeline::new();
    let payload = raw(json!({
        "customerId": CUSTOMER_A,
        "items": [{ "sku": "SKU-1", "quantity": 1 }],
        "totalAmount": 12.5,
        "correlationId": "corr-v2",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "schemaVersion": 2,
        "channel": "mobile"
    }));

    let outcome = pipeline.handler.handle_message(Some("corr-v2"), Some(payload.as_slice())).await;

    assert!(matches!(outcome, MessageOutcome::Persisted(_)));
    assert_eq!(
        pipeline.metrics.orders_created.with_label_values(&["event", "memory"]).get(),
        1
    );
}
