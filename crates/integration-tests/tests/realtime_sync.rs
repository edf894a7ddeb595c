//! Subscription-manager refetch semantics.

use std::sync::Arc;
use std::time::Duration;

use souq_client::models::Product;
use souq_client::notify::TracingNotifier;
use souq_client::realtime::{ChangeEvent, ChangeKind, ChannelFeed, Collection, SyncManager};
use souq_core::ProductId;

use souq_integration_tests::{FetchScript, ScriptedCatalog, product};

fn notifier() -> Arc<TracingNotifier> {
    Arc::new(TracingNotifier)
}

fn ids(products: &[Product]) -> Vec<ProductId> {
    products.iter().map(|p| p.id).collect()
}

async fn wait_for_ids(collection: &mut Collection<Product>, expected: &[ProductId]) {
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            if ids(&collection.snapshot()) == expected {
                return;
            }
            assert!(collection.changed().await, "manager gone");
        }
    })
    .await
    .expect("snapshot never converged");
}

#[tokio::test]
async fn delete_notification_for_absent_item_yields_exact_backend_state() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![product(1, 10), product(2, 10)]));
    let (events, feed) = ChannelFeed::new(8);
    let (mut collection, manager) = SyncManager::spawn(catalog.clone(), feed, notifier());

    wait_for_ids(&mut collection, &[ProductId::new(1), ProductId::new(2)]).await;

    // The backend deletes a row the cache never held; the event still
    // triggers a full refetch and the cache converges on backend state
    catalog.set_rows(vec![product(2, 10)]);
    events
        .send(ChangeEvent {
            kind: ChangeKind::Delete,
        })
        .await
        .expect("send event");

    wait_for_ids(&mut collection, &[ProductId::new(2)]).await;
    manager.shutdown().await;
}

#[tokio::test]
async fn any_event_kind_triggers_a_full_refetch() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![product(1, 10)]));
    let (events, feed) = ChannelFeed::new(8);
    let (mut collection, manager) = SyncManager::spawn(catalog.clone(), feed, notifier());
    wait_for_ids(&mut collection, &[ProductId::new(1)]).await;
    let after_hydration = catalog.calls();

    for kind in [ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete] {
        events
            .send(ChangeEvent { kind })
            .await
            .expect("send event");
    }

    // Each notification refetched the whole collection
    tokio::time::timeout(Duration::from_secs(30), async {
        while catalog.calls() < after_hydration + 3 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("refetches never ran");
    manager.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn refetch_completion_order_wins_over_notification_order() {
    let catalog = Arc::new(ScriptedCatalog::new(vec![product(1, 10)]));
    let (events, feed) = ChannelFeed::new(8);
    let (mut collection, manager) = SyncManager::spawn(catalog.clone(), feed, notifier());
    wait_for_ids(&mut collection, &[ProductId::new(1)]).await;

    // First notification's refetch is slow and captures the pre-update rows;
    // the second completes immediately with the newer rows
    catalog.push_script([
        FetchScript::RespondAfter(Duration::from_secs(10)),
        FetchScript::Respond,
    ]);
    events
        .send(ChangeEvent {
            kind: ChangeKind::Update,
        })
        .await
        .expect("send first event");

    // Give the worker a chance to start the slow refetch before the rows
    // change underneath it
    tokio::time::sleep(Duration::from_millis(10)).await;
    catalog.set_rows(vec![product(1, 10), product(2, 10)]);
    events
        .send(ChangeEvent {
            kind: ChangeKind::Insert,
        })
        .await
        .expect("send second event");

    // The fast refetch lands first with the new rows
    wait_for_ids(&mut collection, &[ProductId::new(1), ProductId::new(2)]).await;

    // When the slow refetch finally completes it overwrites the cache:
    // each completed refetch is authoritative at completion time
    // (last-writer-by-completion-time, not last-notified)
    wait_for_ids(&mut collection, &[ProductId::new(1)]).await;
    manager.shutdown().await;
}
