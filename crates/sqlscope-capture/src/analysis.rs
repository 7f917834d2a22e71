//! Query records and the per-request aggregation container

use crate::context;
use parking_lot::Mutex;
use serde::Serialize;
use sqlscope_core::Config;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Measured facts about one executed query, used to build a [`QueryInfo`].
///
/// Every field defaults to its zero equivalent so call sites only state
/// what they measured.
#[derive(Debug, Clone, Default)]
pub struct QueryMeasures {
    /// Wall-clock execution time
    pub elapsed: Duration,
    /// Rows returned
    pub rows: u64,
    /// Approximate result size in bytes
    pub result_size: u64,
    /// Whether the query ran inside a cache-fetch scope
    pub cached: bool,
    /// Alerts already known at construction time
    pub alerts: Vec<String>,
}

impl QueryMeasures {
    /// Create empty measures
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the elapsed time
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Builder method: set the row count
    pub fn with_rows(mut self, rows: u64) -> Self {
        self.rows = rows;
        self
    }

    /// Builder method: set the approximate result size
    pub fn with_result_size(mut self, result_size: u64) -> Self {
        self.result_size = result_size;
        self
    }

    /// Builder method: set the cached attribution
    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    /// Builder method: seed the alert list
    pub fn with_alerts(mut self, alerts: Vec<String>) -> Self {
        self.alerts = alerts;
        self
    }
}

/// Record of one executed query.
///
/// Threshold alerts are derived from the live [`Config`] at construction;
/// plan-derived alerts may be appended before the record is stored in a
/// [`QueryAnalysis`]. After storage the record is treated as read-only.
#[derive(Debug, Clone, Serialize)]
pub struct QueryInfo {
    sql: String,
    elapsed: Duration,
    rows: u64,
    result_size: u64,
    cached: bool,
    alerts: Vec<String>,
}

impl QueryInfo {
    /// Create a query record, deriving threshold alerts immediately.
    ///
    /// All comparisons are strictly greater-than: a query exactly at a
    /// limit is not alerted.
    pub fn new(sql: impl Into<String>, measures: QueryMeasures) -> Self {
        let config = Config::get();
        let mut alerts = measures.alerts;
        if measures.elapsed > config.elapsed_time_limit {
            alerts.push(format!("query took {}ms", measures.elapsed.as_millis()));
        }
        if measures.rows > config.returned_rows_limit {
            alerts.push(format!("returned {} rows", measures.rows));
        }
        if measures.result_size > config.result_size_limit {
            alerts.push(format!("returned ~{} bytes", measures.result_size));
        }
        Self {
            sql: sql.into(),
            elapsed: measures.elapsed,
            rows: measures.rows,
            result_size: measures.result_size,
            cached: measures.cached,
            alerts,
        }
    }

    /// The SQL text, possibly annotated with bind values for display
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Wall-clock execution time
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Rows returned
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Approximate result size in bytes
    pub fn result_size(&self) -> u64 {
        self.result_size
    }

    /// True when the query ran inside a cache-fetch scope
    pub fn cached(&self) -> bool {
        self.cached
    }

    /// Threshold- and plan-derived alerts, in the order they were raised
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// True when at least one alert was raised
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Merge plan-derived alerts. Called by the interceptor before the
    /// record is stored.
    pub fn append_alerts(&mut self, alerts: impl IntoIterator<Item = String>) {
        self.alerts.extend(alerts);
    }
}

/// Aggregation container for the queries captured in one scope.
///
/// Running totals are updated on every [`push`](Self::push) and always
/// equal the sums over [`queries`](Self::queries).
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryAnalysis {
    queries: Vec<QueryInfo>,
    elapsed: Duration,
    rows: u64,
    result_size: u64,
}

impl QueryAnalysis {
    /// Create an empty analysis
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query record, updating the running totals
    pub fn push(&mut self, info: QueryInfo) {
        self.elapsed += info.elapsed;
        self.rows += info.rows;
        self.result_size += info.result_size;
        self.queries.push(info);
    }

    /// The captured queries, in execution order
    pub fn queries(&self) -> &[QueryInfo] {
        &self.queries
    }

    /// Number of captured queries
    pub fn total_queries(&self) -> u64 {
        self.queries.len() as u64
    }

    /// Summed execution time
    pub fn elapsed_time(&self) -> Duration {
        self.elapsed
    }

    /// Summed rows returned
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Summed approximate result size in bytes
    pub fn result_size(&self) -> u64 {
        self.result_size
    }

    /// True when more queries ran than the configured limit
    pub fn too_many_queries(&self) -> bool {
        self.total_queries() > Config::get().query_limit
    }

    /// True when more rows were returned than the configured limit
    pub fn too_many_rows(&self) -> bool {
        self.rows > Config::get().returned_rows_limit
    }

    /// True when the summed result size exceeds the configured limit
    pub fn results_too_big(&self) -> bool {
        self.result_size > Config::get().result_size_limit
    }

    /// True when the summed execution time exceeds the configured limit
    pub fn too_much_time(&self) -> bool {
        self.elapsed > Config::get().elapsed_time_limit
    }

    /// True when any captured query carries an alert
    pub fn has_alerts(&self) -> bool {
        self.queries.iter().any(QueryInfo::has_alerts)
    }

    /// Number of captured queries carrying at least one alert
    pub fn alerted_query_count(&self) -> u64 {
        self.queries.iter().filter(|q| q.has_alerts()).count() as u64
    }

    /// True when any aggregate threshold tripped or any query is alerted
    pub fn flagged(&self) -> bool {
        self.too_many_queries()
            || self.too_many_rows()
            || self.results_too_big()
            || self.too_much_time()
            || self.has_alerts()
    }

    /// Capture every intercepted query executed by `fut` into a fresh
    /// analysis, returning the future's output and the finished analysis.
    ///
    /// The fresh analysis is current for the extent of `fut`; the previous
    /// current analysis (if any) is shadowed and reinstated when the scope
    /// exits, on every exit path. Nested captures compose: inner queries
    /// never reach the outer totals.
    pub async fn capture<Fut>(fut: Fut) -> (Fut::Output, QueryAnalysis)
    where
        Fut: Future,
    {
        let handle = Arc::new(Mutex::new(QueryAnalysis::new()));
        let output = context::analysis_scope(handle.clone(), fut).await;
        let analysis = Arc::try_unwrap(handle)
            .map(Mutex::into_inner)
            .unwrap_or_else(|handle| handle.lock().clone());
        (output, analysis)
    }

    /// The analysis currently receiving intercepted queries in this
    /// execution context, if a capture scope is open
    pub fn current() -> Option<Arc<Mutex<QueryAnalysis>>> {
        context::current_analysis()
    }
}

#[cfg(test)]
mod tests;
