//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::keystore::KeystoreResolver;
use crate::adapter::outbound::realtime::SessionHub;
use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
use crate::adapter::outbound::sqlite::SqliteOrderStore;
use crate::application::broadcast::QuoteBroadcaster;
use crate::application::claims::OrderClaims;
use crate::application::evaluation::OrderEvaluator;
use crate::application::execution::ExecutionEngine;
use crate::application::pool::PoolManager;
use crate::application::pricing::PriceEvaluator;
use crate::error::Result;
use crate::infrastructure::config::keys::read_keystore_password;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::chain::ChainClient;
use crate::port::outbound::channel::RealtimeChannel;
use crate::port::outbound::keys::KeyResolver;
use crate::port::outbound::store::OrderStore;

/// Adapters the scheduler runs against.
#[derive(Clone)]
pub struct Components {
    pub store: Arc<dyn OrderStore>,
    pub chain: Arc<dyn ChainClient>,
    pub keys: Arc<dyn KeyResolver>,
    pub channel: Arc<dyn RealtimeChannel>,
}

/// Open the SQLite order store and apply pending migrations.
///
/// # Errors
/// Returns an error if the pool cannot be created or migrations fail.
pub fn open_store(config: &Config) -> Result<Arc<SqliteOrderStore>> {
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    info!(database = %config.database, "Database initialized");
    Ok(Arc::new(SqliteOrderStore::new(pool)))
}

/// Build the chain client for the configured deployment.
///
/// # Errors
/// Returns a configuration error for a bad RPC URL or contract address.
#[cfg(feature = "evm")]
pub fn build_chain_client(config: &Config) -> Result<Arc<dyn ChainClient>> {
    use crate::adapter::outbound::evm::EvmChainClient;

    let client = EvmChainClient::new(
        config.chain.rpc_url()?,
        config.chain.chain_id,
        config.chain.addresses()?,
        config.execution.receipt_poll(),
    );
    info!(chain_id = config.chain.chain_id, "Chain client initialized");
    Ok(Arc::new(client))
}

#[cfg(not(feature = "evm"))]
pub fn build_chain_client(_config: &Config) -> Result<Arc<dyn ChainClient>> {
    Err(crate::error::ConfigError::Other(
        "chain access requires the evm feature".to_string(),
    )
    .into())
}

/// Build the keystore resolver. The passphrase is read from the environment.
///
/// # Errors
/// Returns an error when no passphrase is configured.
pub fn build_key_resolver(config: &Config) -> Result<Arc<dyn KeyResolver>> {
    let password = read_keystore_password()?;
    Ok(Arc::new(KeystoreResolver::new(
        &config.keys.keystore_dir,
        password,
    )))
}

/// Build every production adapter. Quotes are pushed to sessions of `hub`,
/// which is owned by whatever serves client connections.
///
/// # Errors
/// Returns the first adapter that fails to initialize.
pub fn build_components(config: &Config, hub: &Arc<SessionHub>) -> Result<Components> {
    Ok(Components {
        store: open_store(config)?,
        chain: build_chain_client(config)?,
        keys: build_key_resolver(config)?,
        channel: Arc::clone(hub) as Arc<dyn RealtimeChannel>,
    })
}

/// Wire the per-order evaluation pipeline.
#[must_use]
pub fn build_evaluator(config: &Config, components: &Components) -> Arc<OrderEvaluator> {
    let engine = ExecutionEngine::new(
        Arc::clone(&components.chain),
        Arc::clone(&components.store),
        config.execution.settings(),
    );
    Arc::new(OrderEvaluator::new(
        PriceEvaluator::new(Arc::clone(&components.chain)),
        config.trigger.policy(),
        engine,
        Arc::clone(&components.keys),
        Arc::clone(&components.store),
        OrderClaims::new(),
    ))
}

#[must_use]
pub fn build_pool(config: &Config, components: &Components) -> Arc<PoolManager> {
    Arc::new(PoolManager::new(
        Arc::clone(&components.store),
        build_evaluator(config, components),
        config.scheduler.settings(),
    ))
}

#[must_use]
pub fn build_broadcaster(components: &Components) -> Arc<QuoteBroadcaster> {
    Arc::new(QuoteBroadcaster::new(
        Arc::clone(&components.store),
        PriceEvaluator::new(Arc::clone(&components.chain)),
        Arc::clone(&components.channel),
    ))
}
