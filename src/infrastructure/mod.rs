//! Configuration, adapter wiring and the process runtime.

pub mod bootstrap;
pub mod config;
pub mod runtime;
