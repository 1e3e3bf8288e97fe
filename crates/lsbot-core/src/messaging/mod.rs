//! Platform-agnostic messaging model (Discord today, behind the adapter crate).

pub mod port;
pub mod types;
