//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{executed_trades, orders, wallets};

/// Database row for a wallet.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WalletRow {
    pub id: String,
    pub address: String,
    pub key_material: String,
}

/// Database row for an order. Amounts and slippage are decimal strings.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: String,
    pub owner_id: String,
    pub wallet_id: String,
    pub sell_token: String,
    pub sell_decimals: i32,
    pub sell_symbol: String,
    pub sell_amount: String,
    pub buy_token: String,
    pub target_buy_amount: String,
    pub slippage: String,
    pub kind: String,
    pub status: String,
    pub version: i64,
    pub created_at: String,
}

/// Database row for an executed trade (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = executed_trades)]
pub struct NewTradeRow {
    pub order_id: String,
    pub seq: i32,
    pub hash: String,
    pub executed_at: String,
    pub error: Option<String>,
}

/// Database row for an executed trade (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = executed_trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeRow {
    pub id: Option<i32>,
    pub order_id: String,
    pub seq: i32,
    pub hash: String,
    pub executed_at: String,
    pub error: Option<String>,
}
