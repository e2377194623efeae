//! Policy layer (origin whitelist).
//!
//! Compiles the allowed origins once at startup into header values the CORS
//! middleware matches against.

pub mod origin;

pub use origin::OriginPolicy;
