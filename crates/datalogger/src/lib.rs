//! Top-level facade crate for datalogger.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use datalogger_core::*;
}

pub mod gateway {
    pub use datalogger_gateway::*;
}
