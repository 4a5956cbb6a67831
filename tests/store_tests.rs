//! The scheduler running against the SQLite store.

mod support;

use std::sync::Arc;

use trigger_swap::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use trigger_swap::adapter::outbound::sqlite::SqliteOrderStore;
use trigger_swap::application::claims::OrderClaims;
use trigger_swap::application::evaluation::{OrderEvaluator, OrderOutcome};
use trigger_swap::application::execution::ExecutionEngine;
use trigger_swap::application::pricing::PriceEvaluator;
use trigger_swap::domain::id::OrderId;
use trigger_swap::domain::order::OrderStatus;
use trigger_swap::domain::trigger::TriggerPolicy;
use trigger_swap::error::{Error, StoreError};
use trigger_swap::port::outbound::chain::ChainClient;
use trigger_swap::port::outbound::keys::KeyResolver;
use trigger_swap::port::outbound::store::OrderStore;
use trigger_swap::testkit::chain::ScriptedChain;
use trigger_swap::testkit::config;
use trigger_swap::testkit::domain::{reserves_for_output, OrderBuilder};
use trigger_swap::testkit::keys::StaticKeyResolver;

use support::db::TempDb;

fn evaluator(store: Arc<dyn OrderStore>, chain: Arc<ScriptedChain>) -> OrderEvaluator {
    let chain = chain as Arc<dyn ChainClient>;
    OrderEvaluator::new(
        PriceEvaluator::new(Arc::clone(&chain)),
        TriggerPolicy::default(),
        ExecutionEngine::new(chain, Arc::clone(&store), config::execution()),
        Arc::new(StaticKeyResolver::new()) as Arc<dyn KeyResolver>,
        store,
        OrderClaims::new(),
    )
}

#[tokio::test]
async fn fill_is_persisted_with_its_trade() {
    let db = TempDb::create();
    let store = db.store();
    store
        .insert(&OrderBuilder::new("o-1").target(100).build())
        .await
        .unwrap();
    let chain = Arc::new(ScriptedChain::new());
    chain.set_default_reserves(reserves_for_output(1000, 99));

    let order = store.find(&OrderId::new("o-1")).await.unwrap().unwrap();
    let outcome = evaluator(store.clone(), Arc::clone(&chain))
        .evaluate(1, &order)
        .await;

    assert!(matches!(outcome, OrderOutcome::Filled(_)), "{outcome:?}");
    let stored = store.find(&OrderId::new("o-1")).await.unwrap().unwrap();
    assert_eq!(stored.status(), OrderStatus::Filled);
    assert_eq!(stored.version(), 1);
    assert_eq!(stored.trades().len(), 1);
    assert_eq!(
        stored.trades()[0].hash,
        format!("{:#x}", chain.submitted()[0].tx_hash)
    );
    assert!(store.find_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn stale_save_is_rejected_and_row_kept() {
    let db = TempDb::create();
    let store = db.store();
    let original = OrderBuilder::new("o-1").build();
    store.insert(&original).await.unwrap();

    let mut first = original.clone();
    first.record_fill("0x01", chrono::Utc::now()).unwrap();
    store.save(&first).await.unwrap();

    let mut second = original.clone();
    second.cancel().unwrap();
    let err = store.save(&second).await.unwrap_err();

    assert!(err.is_version_conflict(), "{err}");
    let stored = store.find(&OrderId::new("o-1")).await.unwrap().unwrap();
    assert_eq!(stored.status(), OrderStatus::Filled);
    assert_eq!(stored.version(), 1);
    assert_eq!(stored.trades().len(), 1);
}

#[tokio::test]
async fn cancelled_orders_leave_the_active_set() {
    let db = TempDb::create();
    let store = db.store();
    for id in ["o-1", "o-2", "o-3"] {
        store.insert(&OrderBuilder::new(id).build()).await.unwrap();
    }

    let cancelled = store.cancel(&OrderId::new("o-2")).await.unwrap();

    assert_eq!(cancelled.status(), OrderStatus::Cancelled);
    let active: Vec<String> = store
        .find_active()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id.to_string())
        .collect();
    assert_eq!(active, vec!["o-1", "o-3"]);

    let err = store.cancel(&OrderId::new("o-2")).await.unwrap_err();
    assert!(matches!(err, Error::Domain(_)), "{err}");
}

#[tokio::test]
async fn cancelling_unknown_order_is_not_found() {
    let db = TempDb::create();

    let err = db.store().cancel(&OrderId::new("missing")).await.unwrap_err();

    assert!(
        matches!(err, Error::Store(StoreError::NotFound(ref id)) if id == "missing"),
        "{err}"
    );
}

#[tokio::test]
async fn orders_survive_reopening_the_pool() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");
    let url = path.to_string_lossy().to_string();
    let order = OrderBuilder::new("o-1").sell_amount(123_000).target(456).build();

    {
        let pool = create_pool(&url).unwrap();
        run_migrations(&pool).unwrap();
        let store = SqliteOrderStore::new(pool);
        store.insert(&order).await.unwrap();
    }

    let pool = create_pool(&url).unwrap();
    run_migrations(&pool).unwrap();
    let store = SqliteOrderStore::new(pool);
    let loaded = store.find(&OrderId::new("o-1")).await.unwrap().unwrap();

    assert_eq!(loaded.sell_amount, order.sell_amount);
    assert_eq!(loaded.target_buy_amount, order.target_buy_amount);
    assert_eq!(loaded.wallet, order.wallet);
}
