//! Live quote broadcast to authenticated sessions.

use std::sync::Arc;

use alloy_primitives::Address;
use serde_json::json;
use trigger_swap::adapter::outbound::realtime::SessionHub;
use trigger_swap::application::broadcast::{BroadcastReport, QuoteBroadcaster, ORDER_RATES_EVENT};
use trigger_swap::application::pricing::PriceEvaluator;
use trigger_swap::domain::id::UserId;
use trigger_swap::domain::order::OrderStatus;
use trigger_swap::port::outbound::chain::ChainClient;
use trigger_swap::port::outbound::channel::RealtimeChannel;
use trigger_swap::port::outbound::store::OrderStore;
use trigger_swap::testkit::domain::{buy_token, reserves_for_output, sell_token, OrderBuilder};
use trigger_swap::testkit::harness::Harness;

fn unpriced_token() -> Address {
    Address::repeat_byte(0x99)
}

/// alice: o-1, o-2 (priced) and o-4 (cancelled); bob: o-3 (no pair).
fn harness() -> Harness {
    let harness = Harness::new(vec![
        OrderBuilder::new("o-1").owner("alice").build(),
        OrderBuilder::new("o-2").owner("alice").build(),
        OrderBuilder::new("o-3")
            .owner("bob")
            .buy_token(unpriced_token())
            .build(),
        OrderBuilder::new("o-4")
            .owner("alice")
            .status(OrderStatus::Cancelled)
            .build(),
    ]);
    harness
        .chain
        .set_reserves(sell_token(), buy_token(), reserves_for_output(1000, 99));
    harness
}

#[tokio::test]
async fn owners_receive_only_their_quoted_orders() {
    let harness = harness();
    harness.channel.connect(1, Some("alice"));
    harness.channel.connect(2, Some("bob"));
    harness.channel.connect(3, None);

    let report = harness.broadcaster().broadcast().await.unwrap();

    assert_eq!(report.orders, 3);
    assert_eq!(report.quoted, 2);
    assert_eq!(report.failed_quotes, 1);
    assert_eq!(report.pushed, 1);

    let alice = harness.channel.pushed_to(1);
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].event, ORDER_RATES_EVENT);
    assert_eq!(alice[0].payload, json!({ "o-1": "99", "o-2": "99" }));
    assert!(harness.channel.pushed_to(2).is_empty());
    assert!(harness.channel.pushed_to(3).is_empty());
}

#[tokio::test]
async fn nothing_is_quoted_without_authenticated_sessions() {
    let harness = harness();
    harness.channel.connect(3, None);

    let report = harness.broadcaster().broadcast().await.unwrap();

    assert_eq!(report, BroadcastReport::default());
    assert_eq!(harness.chain.quotes(), 0);
    assert_eq!(harness.store.fetches(), 0);
    assert!(harness.channel.pushed().is_empty());
}

#[tokio::test]
async fn only_connected_owners_are_quoted() {
    let harness = harness();
    harness.channel.connect(1, Some("alice"));

    let report = harness.broadcaster().broadcast().await.unwrap();

    assert_eq!(report.orders, 3);
    assert_eq!(report.quoted, 2);
    assert_eq!(report.failed_quotes, 0);
    assert_eq!(harness.chain.quotes(), 2);
}

#[tokio::test]
async fn failed_session_does_not_block_others() {
    let harness = harness();
    harness.channel.connect(1, Some("alice"));
    harness.channel.connect(2, Some("alice"));
    harness.channel.fail_session(1);

    let report = harness.broadcaster().broadcast().await.unwrap();

    assert_eq!(report.pushed, 1);
    assert_eq!(harness.channel.pushed_to(2).len(), 1);
}

#[tokio::test]
async fn store_failure_pushes_nothing() {
    let harness = harness();
    harness.channel.connect(1, Some("alice"));
    harness.store.fail_next_fetches(1);

    assert!(harness.broadcaster().broadcast().await.is_err());
    assert!(harness.channel.pushed().is_empty());
}

#[tokio::test]
async fn session_hub_delivers_frames() {
    let harness = harness();
    let hub = Arc::new(SessionHub::default());
    let (alice, mut alice_rx) = hub.register();
    let (_anonymous, mut anonymous_rx) = hub.register();
    assert!(hub.authenticate(alice, UserId::new("alice")));

    let broadcaster = QuoteBroadcaster::new(
        Arc::clone(&harness.store) as Arc<dyn OrderStore>,
        PriceEvaluator::new(Arc::clone(&harness.chain) as Arc<dyn ChainClient>),
        Arc::clone(&hub) as Arc<dyn RealtimeChannel>,
    );
    let report = broadcaster.broadcast().await.unwrap();

    assert_eq!(report.pushed, 1);
    let frame = alice_rx.try_recv().unwrap();
    assert_eq!(frame.event, ORDER_RATES_EVENT);
    assert_eq!(frame.payload["o-1"], "99");
    assert!(anonymous_rx.try_recv().is_err());
}
