//! SQLite persistence adapter for orders, wallets and executed trades.

pub mod database;
pub mod store;

pub use store::SqliteOrderStore;
