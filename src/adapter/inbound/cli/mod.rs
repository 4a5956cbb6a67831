//! CLI module graph.

pub mod check;
pub mod command;
pub mod orders;
pub mod output;
pub mod run;
