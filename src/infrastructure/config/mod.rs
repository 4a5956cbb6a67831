//! Infrastructure configuration modules.

pub mod chain;
pub mod execution;
pub mod keys;
pub mod logging;
pub mod scheduler;
pub mod settings;
