//! sqlscope capture - per-request query capture and aggregation
//!
//! This crate provides the request-scoped half of sqlscope:
//! - `QueryAnalysis`/`QueryInfo` - the aggregation container and per-query record
//! - `context` - execution-context-local current-analysis and flag scopes
//! - `cache_scope` - attribution of queries executed inside cache fetches
//! - `AnalyzedConnection` - the intercepting connection decorator

pub mod analysis;
pub mod cache_scope;
pub mod context;
pub mod intercept;

pub use analysis::{QueryAnalysis, QueryInfo, QueryMeasures};
pub use intercept::{AnalyzedConnection, is_select_statement};
