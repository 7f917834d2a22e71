//! The intercepting connection decorator
//!
//! [`AnalyzedConnection`] wraps any [`Connection`] and measures every SELECT
//! executed while a capture scope is open. Non-SELECT statements, internally
//! tagged statements, and statements run with interception disabled pass
//! through unmodified. Measurement never changes what the caller observes:
//! results and errors come back exactly as the inner connection produced
//! them.

use crate::analysis::{QueryInfo, QueryMeasures};
use crate::context;
use async_trait::async_trait;
use sqlscope_core::{Connection, PlanAnalyzer, QueryResult, Result, Row, Value, is_ignored_tag};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

pub use sqlscope_core::is_select_statement;

/// Row-count and display-size measurement over a query outcome
trait Measured {
    fn measured_rows(&self) -> u64;
    fn measured_size(&self) -> u64;
}

impl Measured for QueryResult {
    fn measured_rows(&self) -> u64 {
        self.row_count() as u64
    }

    fn measured_size(&self) -> u64 {
        self.display_size()
    }
}

impl Measured for Vec<Row> {
    fn measured_rows(&self) -> u64 {
        self.len() as u64
    }

    fn measured_size(&self) -> u64 {
        self.iter().map(Row::display_size).sum()
    }
}

/// Connection decorator that captures SELECT measurements into the current
/// analysis.
///
/// The wrapped connection keeps its full behavior; callers use the decorator
/// wherever they would use the connection itself. A plan analyzer may be
/// attached; it is consulted once per measured SELECT and its EXPLAIN
/// round-trips run with interception disabled so they are never captured
/// themselves.
pub struct AnalyzedConnection {
    inner: Arc<dyn Connection>,
    plan_analyzer: Option<Arc<dyn PlanAnalyzer>>,
}

impl AnalyzedConnection {
    /// Wrap a connection without plan analysis
    pub fn new(inner: Arc<dyn Connection>) -> Self {
        Self {
            inner,
            plan_analyzer: None,
        }
    }

    /// Attach a plan analyzer consulted for every measured SELECT
    pub fn with_plan_analyzer(mut self, analyzer: Arc<dyn PlanAnalyzer>) -> Self {
        self.plan_analyzer = Some(analyzer);
        self
    }

    /// The wrapped connection
    pub fn inner(&self) -> &Arc<dyn Connection> {
        &self.inner
    }

    /// Run `fut` and, when the statement qualifies for capture, record a
    /// query entry in the current analysis.
    async fn observe<T, Fut>(&self, sql: &str, tag: &str, params: &[Value], fut: Fut) -> Result<T>
    where
        T: Measured,
        Fut: Future<Output = Result<T>>,
    {
        if context::interception_disabled() || !is_select_statement(sql) || is_ignored_tag(tag) {
            return fut.await;
        }
        let Some(handle) = context::current_analysis() else {
            return fut.await;
        };

        let start = Instant::now();
        let value = fut.await?;
        let elapsed = start.elapsed();

        let mut info = QueryInfo::new(
            annotate_sql(sql, params),
            QueryMeasures::new()
                .with_elapsed(elapsed)
                .with_rows(value.measured_rows())
                .with_result_size(value.measured_size())
                .with_cached(context::in_cache_fetch()),
        );
        if let Some(analyzer) = &self.plan_analyzer {
            match context::without_interception(analyzer.analyze_query(sql, params)).await {
                Ok(alerts) => info.append_alerts(alerts),
                Err(err) => tracing::debug!(sql, error = %err, "plan analysis failed"),
            }
        }
        handle.lock().push(info);
        Ok(value)
    }
}

/// Render the statement with its bind values appended, for display only
fn annotate_sql(sql: &str, params: &[Value]) -> String {
    if params.is_empty() {
        return sql.to_string();
    }
    let rendered: Vec<String> = params.iter().map(Value::to_display_literal).collect();
    format!("{} [{}]", sql, rendered.join(", "))
}

#[async_trait]
impl Connection for AnalyzedConnection {
    fn driver_name(&self) -> &str {
        self.inner.driver_name()
    }

    async fn query(&self, sql: &str, tag: &str, params: &[Value]) -> Result<QueryResult> {
        self.observe(sql, tag, params, self.inner.query(sql, tag, params))
            .await
    }

    async fn query_rows(&self, sql: &str, tag: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.observe(sql, tag, params, self.inner.query_rows(sql, tag, params))
            .await
    }

    fn plan_analyzer(&self) -> Option<&dyn PlanAnalyzer> {
        self.plan_analyzer.as_deref()
    }
}
