//! Chain-agnostic domain logic: orders, pricing math and trigger rules.

pub mod deviation;
pub mod error;
pub mod id;
pub mod order;
pub mod quote;
pub mod token;
pub mod trigger;
pub mod wallet;
