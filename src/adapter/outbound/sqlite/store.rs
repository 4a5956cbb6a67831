//! SQLite order store implementation.
//!
//! Orders are read with their wallet joined and their executed trades in
//! sequence order. Saves are guarded by the `version` column; they append
//! new trades and rewrite the error of stored ones, which is how a trade
//! awaiting its receipt is resolved.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{NewTradeRow, OrderRow, TradeRow, WalletRow};
use crate::adapter::outbound::sqlite::database::schema::{executed_trades, orders, wallets};
use crate::domain::id::{OrderId, UserId};
use crate::domain::order::{ExecutedTrade, NewOrder, Order, OrderKind, OrderState, OrderStatus};
use crate::domain::token::{address_key, parse_address, parse_amount, SellToken};
use crate::domain::wallet::Wallet;
use crate::error::{Error, Result, StoreError};
use crate::port::outbound::store::OrderStore;

type DbConnection = diesel::r2d2::PooledConnection<
    diesel::r2d2::ConnectionManager<diesel::SqliteConnection>,
>;

/// Order ids bound per trade query, well below SQLite's variable limit.
const TRADE_LOOKUP_CHUNK: usize = 500;

/// Result of the guarded update inside the save transaction.
enum SaveOutcome {
    Saved,
    Missing,
    Stale,
}

/// SQLite-backed order store.
pub struct SqliteOrderStore {
    pool: DbPool,
}

impl SqliteOrderStore {
    /// Create a new SQLite order store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()).into())
    }

    fn wallet_row(wallet: &Wallet) -> WalletRow {
        WalletRow {
            id: wallet.id.to_string(),
            address: address_key(&wallet.address),
            key_material: wallet.key_material.clone(),
        }
    }

    fn to_row(order: &Order) -> OrderRow {
        OrderRow {
            id: order.id.to_string(),
            owner_id: order.owner.to_string(),
            wallet_id: order.wallet.id.to_string(),
            sell_token: address_key(&order.sell.address),
            sell_decimals: i32::from(order.sell.decimals),
            sell_symbol: order.sell.symbol.clone(),
            sell_amount: order.sell_amount.to_string(),
            buy_token: address_key(&order.buy_token),
            target_buy_amount: order.target_buy_amount.to_string(),
            slippage: order.slippage().to_string(),
            kind: order.kind.as_str().to_string(),
            status: order.status().as_str().to_string(),
            version: order.version(),
            created_at: timestamp(&order.created_at),
        }
    }

    fn trade_rows(order: &Order, from: usize) -> Result<Vec<NewTradeRow>> {
        order
            .trades()
            .iter()
            .enumerate()
            .skip(from)
            .map(|(seq, trade)| {
                Ok(NewTradeRow {
                    order_id: order.id.to_string(),
                    seq: i32::try_from(seq).map_err(|e| corrupt(order.id.as_str(), e))?,
                    hash: trade.hash.clone(),
                    executed_at: timestamp(&trade.executed_at),
                    error: trade.error.clone(),
                })
            })
            .collect()
    }

    fn from_row(row: OrderRow, wallet: WalletRow, trades: Vec<TradeRow>) -> Result<Order> {
        let id = row.id.as_str();
        let wallet = Wallet::new(
            wallet.id,
            parse_address("wallet_address", &wallet.address).map_err(|e| corrupt(id, e))?,
            wallet.key_material,
        );
        let sell = SellToken::new(
            parse_address("sell_token", &row.sell_token).map_err(|e| corrupt(id, e))?,
            u8::try_from(row.sell_decimals).map_err(|e| corrupt(id, e))?,
            row.sell_symbol.clone(),
        );
        let draft = NewOrder {
            owner: UserId::new(row.owner_id.clone()),
            sell,
            sell_amount: parse_amount("sell_amount", &row.sell_amount)
                .map_err(|e| corrupt(id, e))?,
            buy_token: parse_address("buy_token", &row.buy_token).map_err(|e| corrupt(id, e))?,
            target_buy_amount: parse_amount("target_buy_amount", &row.target_buy_amount)
                .map_err(|e| corrupt(id, e))?,
            slippage: Some(Decimal::from_str(&row.slippage).map_err(|e| corrupt(id, e))?),
            kind: OrderKind::from_str(&row.kind).map_err(|e| corrupt(id, e))?,
        };
        let trades = trades
            .into_iter()
            .map(|t| {
                Ok(ExecutedTrade {
                    hash: t.hash,
                    executed_at: parse_timestamp(id, &t.executed_at)?,
                    error: t.error,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let state = OrderState {
            status: OrderStatus::from_str(&row.status).map_err(|e| corrupt(id, e))?,
            trades,
            version: row.version,
            created_at: parse_timestamp(id, &row.created_at)?,
        };

        Ok(Order::restore(OrderId::new(row.id), draft, wallet, state))
    }

    fn load(conn: &mut DbConnection, rows: Vec<(OrderRow, WalletRow)>) -> Result<Vec<Order>> {
        let ids: Vec<&str> = rows.iter().map(|(o, _)| o.id.as_str()).collect();
        let mut by_order: HashMap<String, Vec<TradeRow>> = HashMap::new();
        for chunk in ids.chunks(TRADE_LOOKUP_CHUNK) {
            let trade_rows: Vec<TradeRow> = executed_trades::table
                .filter(executed_trades::order_id.eq_any(chunk.iter().copied()))
                .order((executed_trades::order_id, executed_trades::seq))
                .select(TradeRow::as_select())
                .load(conn)
                .map_err(database)?;
            for trade in trade_rows {
                by_order.entry(trade.order_id.clone()).or_default().push(trade);
            }
        }

        rows.into_iter()
            .map(|(order, wallet)| {
                let trades = by_order.remove(&order.id).unwrap_or_default();
                Self::from_row(order, wallet, trades)
            })
            .collect()
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(order_id: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| corrupt(order_id, e))
}

fn corrupt(order_id: &str, reason: impl ToString) -> Error {
    StoreError::Corrupt {
        order_id: order_id.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn database(e: diesel::result::Error) -> Error {
    StoreError::Database(e.to_string()).into()
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn find_active(&self) -> Result<Vec<Order>> {
        let mut conn = self.conn()?;
        let rows: Vec<(OrderRow, WalletRow)> = orders::table
            .inner_join(wallets::table)
            .filter(orders::status.eq(OrderStatus::Active.as_str()))
            .order((orders::created_at, orders::id))
            .select((OrderRow::as_select(), WalletRow::as_select()))
            .load(&mut conn)
            .map_err(database)?;

        Self::load(&mut conn, rows)
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>> {
        let mut conn = self.conn()?;
        let row: Option<(OrderRow, WalletRow)> = orders::table
            .inner_join(wallets::table)
            .filter(orders::id.eq(id.as_str()))
            .select((OrderRow::as_select(), WalletRow::as_select()))
            .first(&mut conn)
            .optional()
            .map_err(database)?;

        match row {
            Some(row) => Ok(Self::load(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, order: &Order) -> Result<Order> {
        let row = Self::to_row(order);
        let mut conn = self.conn()?;
        let id = order.id.as_str();

        let outcome = conn
            .transaction::<_, Error, _>(|conn| {
                let updated = diesel::update(
                    orders::table
                        .filter(orders::id.eq(id))
                        .filter(orders::version.eq(order.version())),
                )
                .set((
                    orders::status.eq(&row.status),
                    orders::slippage.eq(&row.slippage),
                    orders::version.eq(order.version() + 1),
                ))
                .execute(conn)
                .map_err(database)?;

                if updated == 0 {
                    let exists: i64 = orders::table
                        .filter(orders::id.eq(id))
                        .count()
                        .get_result(conn)
                        .map_err(database)?;
                    return Ok(if exists == 0 {
                        SaveOutcome::Missing
                    } else {
                        SaveOutcome::Stale
                    });
                }

                let stored: i64 = executed_trades::table
                    .filter(executed_trades::order_id.eq(id))
                    .count()
                    .get_result(conn)
                    .map_err(database)?;
                let from = usize::try_from(stored).map_err(|e| corrupt(id, e))?;
                for (seq, trade) in order.trades().iter().enumerate().take(from) {
                    let seq = i32::try_from(seq).map_err(|e| corrupt(id, e))?;
                    diesel::update(
                        executed_trades::table
                            .filter(executed_trades::order_id.eq(id))
                            .filter(executed_trades::seq.eq(seq)),
                    )
                    .set(executed_trades::error.eq(&trade.error))
                    .execute(conn)
                    .map_err(database)?;
                }
                let new_trades = Self::trade_rows(order, from)?;
                if !new_trades.is_empty() {
                    diesel::insert_into(executed_trades::table)
                        .values(&new_trades)
                        .execute(conn)
                        .map_err(database)?;
                }
                Ok(SaveOutcome::Saved)
            })?;

        match outcome {
            SaveOutcome::Saved => {
                let mut saved = order.clone();
                saved.increment_version();
                Ok(saved)
            }
            SaveOutcome::Missing => Err(StoreError::NotFound(id.to_string()).into()),
            SaveOutcome::Stale => Err(StoreError::VersionConflict {
                order_id: id.to_string(),
                expected: order.version(),
            }
            .into()),
        }
    }

    async fn insert(&self, order: &Order) -> Result<()> {
        let wallet = Self::wallet_row(&order.wallet);
        let row = Self::to_row(order);
        let trades = Self::trade_rows(order, 0)?;
        let mut conn = self.conn()?;

        conn.transaction::<_, Error, _>(|conn| {
            diesel::insert_or_ignore_into(wallets::table)
                .values(&wallet)
                .execute(conn)
                .map_err(database)?;
            diesel::insert_into(orders::table)
                .values(&row)
                .execute(conn)
                .map_err(database)?;
            if !trades.is_empty() {
                diesel::insert_into(executed_trades::table)
                    .values(&trades)
                    .execute(conn)
                    .map_err(database)?;
            }
            Ok(())
        })
    }
}
