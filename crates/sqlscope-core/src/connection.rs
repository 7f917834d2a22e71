//! Connection and plan-analysis traits
//!
//! The database is an external collaborator; sqlscope only needs the two
//! row-returning execution entry points and, optionally, the ability to
//! analyze a statement's execution plan.

use crate::{QueryResult, Result, Row, Value};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

static SELECT_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*SELECT\b").expect("valid regex"));

/// True when `sql` is a SELECT statement, ignoring leading whitespace and case
pub fn is_select_statement(sql: &str) -> bool {
    SELECT_STATEMENT.is_match(sql)
}

/// Statement tags identifying internal payload kinds.
///
/// Interception decides by tag, never by parsing the statement: queries the
/// layer itself issues (EXPLAIN round-trips, schema introspection, cache
/// probes) carry one of these tags and are exempt from capture.
pub mod tags {
    /// Plan-analysis EXPLAIN round-trip
    pub const EXPLAIN: &str = "EXPLAIN";
    /// Schema introspection
    pub const SCHEMA: &str = "SCHEMA";
    /// Cache probe
    pub const CACHE: &str = "CACHE";
}

/// True when a statement tag names an internal payload exempt from capture
pub fn is_ignored_tag(tag: &str) -> bool {
    matches!(tag, tags::EXPLAIN | tags::SCHEMA | tags::CACHE)
}

/// A database connection
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "postgres", "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a query and return a decoded result.
    ///
    /// `tag` names the payload for logging and interception decisions; use
    /// the statement's purpose (a model name, a [`tags`] constant) rather
    /// than anything derived from the SQL text.
    async fn query(&self, sql: &str, tag: &str, params: &[Value]) -> Result<QueryResult>;

    /// Execute a query and return raw rows
    async fn query_rows(&self, sql: &str, tag: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Get the plan-analysis capability if this connection supports it.
    ///
    /// This is an optional-capability test: adapters for backends with a
    /// usable EXPLAIN attach an analyzer, others return `None` and queries
    /// are measured without plan alerts.
    fn plan_analyzer(&self) -> Option<&dyn PlanAnalyzer> {
        None
    }
}

/// Plan-analysis capability for a connection.
///
/// Implementations issue `EXPLAIN <sql>` through the connection they were
/// built with and translate the resulting plan rows into human-readable
/// alert strings. Analysis is best-effort: a failure here must never fail
/// the query that triggered it, so callers treat errors as "no alerts".
#[async_trait]
pub trait PlanAnalyzer: Send + Sync {
    /// Analyze the plan for `sql`, returning alert strings for anything the
    /// configured thresholds flag. An empty vec means the plan looks fine.
    async fn analyze_query(&self, sql: &str, params: &[Value]) -> Result<Vec<String>>;
}
