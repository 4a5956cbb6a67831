//! Handlers for `orders list` and `orders cancel`.

use std::path::Path;

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::domain::id::OrderId;
use crate::domain::order::Order;
use crate::domain::token::address_key;
use crate::error::Result;
use crate::infrastructure::bootstrap::open_store;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::OrderStore;

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Sell")]
    sell: String,
    #[tabled(rename = "Buy Token")]
    buy: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Slippage")]
    slippage: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            owner: order.owner.to_string(),
            kind: order.kind.as_str(),
            sell: format!("{} {}", order.sell_amount, order.sell.symbol),
            buy: address_key(&order.buy_token),
            target: order.target_buy_amount.to_string(),
            slippage: format!("{}%", order.slippage()),
        }
    }
}

fn order_json(order: &Order) -> serde_json::Value {
    json!({
        "id": order.id.as_str(),
        "owner": order.owner.as_str(),
        "wallet": order.wallet.id.as_str(),
        "kind": order.kind.as_str(),
        "status": order.status().as_str(),
        "sell_token": address_key(&order.sell.address),
        "sell_amount": order.sell_amount.to_string(),
        "buy_token": address_key(&order.buy_token),
        "target_buy_amount": order.target_buy_amount.to_string(),
        "slippage": order.slippage().to_string(),
        "version": order.version(),
    })
}

/// Print every active order.
pub async fn list(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let store = open_store(&config)?;
    let orders = store.find_active().await?;

    if output::is_json() {
        output::json_line(
            "orders",
            serde_json::Value::Array(orders.iter().map(order_json).collect()),
        );
        return Ok(());
    }

    output::section(&format!("Active orders ({})", orders.len()));
    if orders.is_empty() {
        output::field("Orders", "none");
        return Ok(());
    }
    let rows: Vec<OrderRow> = orders.iter().map(OrderRow::from).collect();
    output::table(&Table::new(rows).to_string());
    Ok(())
}

/// Move an active order to `cancelled`.
pub async fn cancel(config_path: &Path, id: &str) -> Result<()> {
    let config = Config::load(config_path)?;
    let store = open_store(&config)?;
    let order = store.cancel(&OrderId::new(id)).await?;

    if output::is_json() {
        output::json_line("cancelled", order_json(&order));
        return Ok(());
    }
    output::success(&format!("Order {} cancelled", order.id));
    Ok(())
}
