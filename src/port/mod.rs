//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points of the scheduler. They are traits that
//! adapters implement to integrate with external systems.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                    ▼              ▼                   ▼
//! ┌─────────┐       ┌───────────┐   ┌───────────┐      ┌────────────┐
//! │  Chain  │       │   Store   │   │   Keys    │      │  Realtime  │
//! │ Adapter │       │  Adapter  │   │  Adapter  │      │  Adapter   │
//! └─────────┘       └───────────┘   └───────────┘      └────────────┘
//! ```

pub mod outbound;
