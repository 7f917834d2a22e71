//! sqlscope core - shared abstractions for the SQL observability layer
//!
//! This crate provides the fundamental traits and types the other sqlscope
//! crates depend on. It defines:
//!
//! - `Connection` - Trait for the database collaborator
//! - `PlanAnalyzer` - Optional plan-analysis capability for a connection
//! - `Config` - Process-wide thresholds with scoped overrides
//! - Common types like `Value`, `Row`, `QueryResult`

mod config;
mod connection;
mod error;
pub mod test_support;
mod types;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use types::*;
