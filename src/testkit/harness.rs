//! Scheduler wired against the in-memory adapters.

use std::sync::Arc;

use crate::application::broadcast::QuoteBroadcaster;
use crate::application::claims::OrderClaims;
use crate::application::evaluation::OrderEvaluator;
use crate::application::execution::{ExecutionEngine, ExecutionSettings};
use crate::application::pool::{PoolManager, SchedulerSettings};
use crate::application::pricing::PriceEvaluator;
use crate::domain::order::Order;
use crate::domain::trigger::{TriggerPolicy, DEFAULT_TRIGGER_BAND};
use crate::infrastructure::bootstrap::Components;
use crate::port::outbound::chain::ChainClient;
use crate::port::outbound::channel::RealtimeChannel;
use crate::port::outbound::keys::KeyResolver;
use crate::port::outbound::store::OrderStore;

use super::chain::ScriptedChain;
use super::channel::RecordingChannel;
use super::config;
use super::keys::StaticKeyResolver;
use super::store::MemoryStore;

/// Fakes for every port, shared with the components built from them.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub chain: Arc<ScriptedChain>,
    pub keys: Arc<StaticKeyResolver>,
    pub channel: Arc<RecordingChannel>,
    pub execution: ExecutionSettings,
    pub policy: TriggerPolicy,
}

impl Harness {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            store: Arc::new(MemoryStore::with_orders(orders)),
            chain: Arc::new(ScriptedChain::new()),
            keys: Arc::new(StaticKeyResolver::new()),
            channel: Arc::new(RecordingChannel::new()),
            execution: config::execution(),
            policy: TriggerPolicy::new(DEFAULT_TRIGGER_BAND),
        }
    }

    pub fn components(&self) -> Components {
        Components {
            store: Arc::clone(&self.store) as Arc<dyn OrderStore>,
            chain: Arc::clone(&self.chain) as Arc<dyn ChainClient>,
            keys: Arc::clone(&self.keys) as Arc<dyn KeyResolver>,
            channel: Arc::clone(&self.channel) as Arc<dyn RealtimeChannel>,
        }
    }

    pub fn engine(&self) -> ExecutionEngine {
        ExecutionEngine::new(
            Arc::clone(&self.chain) as Arc<dyn ChainClient>,
            Arc::clone(&self.store) as Arc<dyn OrderStore>,
            self.execution,
        )
    }

    /// Evaluator with its own claim registry.
    pub fn evaluator(&self) -> Arc<OrderEvaluator> {
        self.evaluator_with_claims(OrderClaims::new())
    }

    pub fn evaluator_with_claims(&self, claims: OrderClaims) -> Arc<OrderEvaluator> {
        Arc::new(OrderEvaluator::new(
            PriceEvaluator::new(Arc::clone(&self.chain) as Arc<dyn ChainClient>),
            self.policy,
            self.engine(),
            Arc::clone(&self.keys) as Arc<dyn KeyResolver>,
            Arc::clone(&self.store) as Arc<dyn OrderStore>,
            claims,
        ))
    }

    pub fn pool(&self, settings: SchedulerSettings) -> Arc<PoolManager> {
        Arc::new(PoolManager::new(
            Arc::clone(&self.store) as Arc<dyn OrderStore>,
            self.evaluator(),
            settings,
        ))
    }

    pub fn broadcaster(&self) -> Arc<QuoteBroadcaster> {
        Arc::new(QuoteBroadcaster::new(
            Arc::clone(&self.store) as Arc<dyn OrderStore>,
            PriceEvaluator::new(Arc::clone(&self.chain) as Arc<dyn ChainClient>),
            Arc::clone(&self.channel) as Arc<dyn RealtimeChannel>,
        ))
    }
}
