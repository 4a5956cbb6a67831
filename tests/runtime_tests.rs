//! Full scheduler lifecycle: start, fill, shut down.

mod support;

use std::time::Duration;

use tokio::sync::watch;
use trigger_swap::domain::order::OrderStatus;
use trigger_swap::infrastructure::config::settings::Config;
use trigger_swap::infrastructure::runtime::run_components;
use trigger_swap::testkit::config::VALID_TOML;
use trigger_swap::testkit::domain::{reserves_for_output, OrderBuilder};
use trigger_swap::testkit::harness::Harness;

#[tokio::test]
async fn runtime_fills_orders_and_stops_on_signal() {
    let config = Config::parse_toml(VALID_TOML).unwrap();
    let harness = Harness::new(vec![
        OrderBuilder::new("o-1").owner("alice").target(100).build(),
        OrderBuilder::new("o-2").owner("alice").target(200).build(),
    ]);
    harness
        .chain
        .set_default_reserves(reserves_for_output(1000, 99));
    harness.channel.connect(1, Some("alice"));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let components = harness.components();
    let task = tokio::spawn(async move { run_components(&config, components, shutdown_rx).await });

    let store = std::sync::Arc::clone(&harness.store);
    let filled = support::wait::until(Duration::from_secs(3), || {
        store.get("o-1").map(|o| o.status()) == Some(OrderStatus::Filled)
    })
    .await;
    assert!(filled, "o-1 should fill at -1%");

    shutdown_tx.send(true).unwrap();
    let stats = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("runtime stops")
        .unwrap()
        .unwrap();

    assert!(stats.generation >= 1);
    assert_eq!(harness.chain.submissions(), 1);
    assert!(harness.store.get("o-2").unwrap().is_active());
    assert!(!harness.channel.pushed_to(1).is_empty());
}
