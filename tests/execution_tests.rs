//! Triggered orders driven through approval, submission and confirmation.

use std::time::Duration;

use alloy_primitives::U256;
use trigger_swap::application::claims::OrderClaims;
use trigger_swap::application::classify::FailureOutcome;
use trigger_swap::application::evaluation::OrderOutcome;
use trigger_swap::application::execution::{approval_threshold, gas_limit};
use trigger_swap::domain::order::OrderStatus;
use trigger_swap::error::ChainError;
use trigger_swap::port::outbound::chain::{ChainClient, SwapMethod};
use trigger_swap::testkit::domain::{reserves_for_output, OrderBuilder};
use trigger_swap::testkit::harness::Harness;

/// Harness holding one market order at target 100, quoted at 99.
fn triggered() -> Harness {
    let harness = Harness::new(vec![OrderBuilder::new("o-1").target(100).build()]);
    harness
        .chain
        .set_default_reserves(reserves_for_output(1000, 99));
    harness
}

async fn evaluate(harness: &Harness) -> OrderOutcome {
    let order = harness.store.get("o-1").unwrap();
    harness.evaluator().evaluate(1, &order).await
}

fn assert_untouched(harness: &Harness) {
    let stored = harness.store.get("o-1").unwrap();
    assert_eq!(stored.status(), OrderStatus::Active);
    assert!(stored.trades().is_empty());
    assert_eq!(stored.version(), 0);
}

#[tokio::test]
async fn fill_appends_one_trade_and_marks_filled() {
    let harness = triggered();

    let outcome = evaluate(&harness).await;

    let OrderOutcome::Filled(saved) = outcome else {
        panic!("expected fill, got {outcome:?}");
    };
    assert_eq!(saved.status(), OrderStatus::Filled);
    assert_eq!(saved.trades().len(), 1);
    assert_eq!(saved.version(), 1);
    let submitted = harness.chain.submitted();
    assert_eq!(
        saved.trades()[0].hash,
        format!("{:#x}", submitted[0].tx_hash)
    );
    assert_eq!(harness.store.get("o-1").unwrap(), *saved);
}

#[tokio::test]
async fn large_allowance_skips_approval() {
    let harness = triggered();
    harness.chain.set_allowance(approval_threshold());

    let outcome = evaluate(&harness).await;

    assert!(matches!(outcome, OrderOutcome::Filled(_)), "{outcome:?}");
    assert_eq!(harness.chain.approvals(), 0);
}

#[tokio::test]
async fn small_allowance_approves_before_swapping() {
    let harness = triggered();
    harness.chain.set_allowance(approval_threshold() - U256::from(1u64));

    let outcome = evaluate(&harness).await;

    assert!(matches!(outcome, OrderOutcome::Filled(_)), "{outcome:?}");
    assert_eq!(harness.chain.approvals(), 1);
    assert_eq!(harness.chain.submissions(), 1);
}

#[tokio::test]
async fn approval_gas_shortfall_is_classified() {
    let harness = triggered();
    harness.chain.set_allowance(U256::ZERO);
    harness.chain.fail_approval(ChainError::Rpc {
        code: -32000,
        message: "insufficient funds for gas * price + value".into(),
    });

    let outcome = evaluate(&harness).await;

    assert_eq!(
        outcome,
        OrderOutcome::Failed(FailureOutcome::InsufficientApprovalGas)
    );
    assert_eq!(harness.chain.submissions(), 0);
    assert_untouched(&harness);
}

#[tokio::test]
async fn gas_limit_carries_buffer() {
    let harness = triggered();
    harness.chain.set_gas_estimate(200_000);

    evaluate(&harness).await;

    let submitted = harness.chain.submitted();
    assert_eq!(
        submitted[0].gas_limit,
        gas_limit(200_000, harness.execution.gas_buffer_percent)
    );
    assert!(submitted[0].gas_limit > 200_000);
}

#[tokio::test]
async fn estimation_shortfall_is_insufficient_gas_funds() {
    let harness = triggered();
    harness.chain.fail_estimate(ChainError::Rpc {
        code: -32000,
        message: "gas required exceeds allowance (0)".into(),
    });

    let outcome = evaluate(&harness).await;

    assert_eq!(
        outcome,
        OrderOutcome::Failed(FailureOutcome::InsufficientGasFunds)
    );
    assert_untouched(&harness);
}

#[tokio::test]
async fn estimation_liquidity_revert_is_insufficient_liquidity() {
    let harness = triggered();
    harness.chain.fail_estimate(ChainError::Rpc {
        code: 3,
        message: "execution reverted: UniswapV2Library: INSUFFICIENT_LIQUIDITY".into(),
    });

    let outcome = evaluate(&harness).await;

    assert_eq!(
        outcome,
        OrderOutcome::Failed(FailureOutcome::InsufficientLiquidity)
    );
    assert_untouched(&harness);
}

#[tokio::test]
async fn missing_pair_is_insufficient_liquidity() {
    let harness = Harness::new(vec![OrderBuilder::new("o-1").build()]);

    let outcome = evaluate(&harness).await;

    assert_eq!(
        outcome,
        OrderOutcome::Failed(FailureOutcome::InsufficientLiquidity)
    );
    assert_eq!(harness.chain.estimates(), 0);
}

#[tokio::test]
async fn reverted_swap_leaves_order_active() {
    let harness = triggered();
    harness.chain.revert_receipts();

    let outcome = evaluate(&harness).await;

    assert_eq!(outcome, OrderOutcome::Failed(FailureOutcome::Unclassified));
    assert_eq!(harness.chain.submissions(), 1);
    assert_untouched(&harness);
}

#[tokio::test]
async fn receipt_timeout_keeps_the_submitted_hash() {
    let mut harness = triggered();
    harness.execution.receipt_timeout = Some(Duration::from_millis(50));
    harness.chain.set_receipt_delay(Duration::from_millis(500));

    let outcome = evaluate(&harness).await;

    assert_eq!(outcome, OrderOutcome::Failed(FailureOutcome::Unclassified));
    let stored = harness.store.get("o-1").unwrap();
    assert!(stored.is_active());
    assert_eq!(stored.version(), 1);
    let pending = stored.pending_trade().expect("pending trade");
    assert_eq!(
        pending.hash,
        format!("{:#x}", harness.chain.submitted()[0].tx_hash)
    );
}

#[tokio::test]
async fn unconfirmed_swap_is_not_submitted_again() {
    let harness = triggered();
    harness.chain.withhold_receipts(ChainError::Rpc {
        code: -32000,
        message: "header not found".into(),
    });
    let snapshot = harness.store.get("o-1").unwrap();
    let evaluator = harness.evaluator();

    let first = evaluator.evaluate(1, &snapshot).await;
    assert_eq!(first, OrderOutcome::Failed(FailureOutcome::Unclassified));
    assert_eq!(harness.chain.submissions(), 1);

    // Next tick with the worker's old copy: the re-read sees the pending trade.
    let OrderOutcome::Stale(Some(fresh)) = evaluator.evaluate(1, &snapshot).await else {
        panic!("expected the stored copy back");
    };
    assert!(fresh.pending_trade().is_some());
    assert_eq!(
        evaluator.evaluate(1, &fresh).await,
        OrderOutcome::AwaitingReceipt
    );
    assert_eq!(harness.chain.submissions(), 1);

    harness.chain.release_receipts();
    let outcome = evaluator.evaluate(1, &fresh).await;
    let OrderOutcome::Filled(saved) = outcome else {
        panic!("expected fill, got {outcome:?}");
    };
    assert_eq!(harness.chain.submissions(), 1);
    assert_eq!(saved.trades().len(), 1);
    assert!(saved.trades()[0].error.is_none());
    assert_eq!(
        saved.trades()[0].hash,
        format!("{:#x}", harness.chain.submitted()[0].tx_hash)
    );
    assert_eq!(harness.store.get("o-1").unwrap(), *saved);
}

#[tokio::test]
async fn reverted_pending_swap_releases_the_order() {
    let harness = triggered();
    harness
        .chain
        .withhold_receipts(ChainError::Transport("connection reset".into()));
    evaluate(&harness).await;
    let pending = harness.store.get("o-1").unwrap();

    harness.chain.revert_receipts();
    harness.chain.release_receipts();
    let outcome = harness.evaluator().evaluate(1, &pending).await;

    let OrderOutcome::Stale(Some(released)) = outcome else {
        panic!("expected released order, got {outcome:?}");
    };
    assert!(released.is_active());
    assert!(released.pending_trade().is_none());
    assert!(released.trades()[0]
        .error
        .as_deref()
        .is_some_and(|e| e.ends_with("reverted")));
    assert_eq!(harness.chain.submissions(), 1);
}

#[tokio::test]
async fn key_failure_leaves_order_active() {
    let harness = triggered();
    harness.keys.fail_for("wallet-1");

    let outcome = evaluate(&harness).await;

    assert_eq!(outcome, OrderOutcome::Failed(FailureOutcome::Unclassified));
    assert_eq!(harness.chain.submissions(), 0);
    assert_untouched(&harness);
}

#[tokio::test]
async fn wrapped_native_buy_unwraps() {
    let harness = Harness::new(vec![]);
    let order = OrderBuilder::new("o-1")
        .buy_token(harness.chain.wrapped_native())
        .build();
    harness.store.put(order.clone());
    harness
        .chain
        .set_default_reserves(reserves_for_output(1000, 99));

    harness.evaluator().evaluate(1, &order).await;

    let submitted = harness.chain.submitted();
    assert_eq!(submitted[0].call.method, SwapMethod::ExactTokensForEth);
    assert_eq!(
        submitted[0].call.path,
        vec![order.sell.address, harness.chain.wrapped_native()]
    );
}

#[tokio::test]
async fn shared_claims_let_one_worker_through() {
    let harness = triggered();
    harness.chain.set_receipt_delay(Duration::from_millis(100));
    let order = harness.store.get("o-1").unwrap();
    let claims = OrderClaims::new();
    let first = harness.evaluator_with_claims(claims.clone());
    let second = harness.evaluator_with_claims(claims.clone());

    let (a, b) = tokio::join!(first.evaluate(1, &order), second.evaluate(2, &order));

    let contended = [&a, &b]
        .iter()
        .filter(|o| matches!(o, OrderOutcome::Contended))
        .count();
    assert_eq!(contended, 1, "{a:?} / {b:?}");
    assert_eq!(harness.chain.submissions(), 1);
    assert!(claims.is_empty());
}

#[tokio::test]
async fn racing_save_keeps_first_fill() {
    let harness = triggered();
    harness.chain.set_receipt_delay(Duration::from_millis(100));
    let order = harness.store.get("o-1").unwrap();
    let first = harness.evaluator();
    let second = harness.evaluator();

    let (a, b) = tokio::join!(first.evaluate(1, &order), second.evaluate(2, &order));

    let fills = [&a, &b]
        .iter()
        .filter(|o| matches!(o, OrderOutcome::Filled(_)))
        .count();
    assert_eq!(fills, 1, "{a:?} / {b:?}");
    let stored = harness.store.get("o-1").unwrap();
    assert_eq!(stored.trades().len(), 1);
    assert_eq!(stored.version(), 1);
}
