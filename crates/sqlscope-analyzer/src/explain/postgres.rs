//! Text-tree plan analysis for the PostgreSQL family
//!
//! PostgreSQL EXPLAIN returns the plan as indented text lines, one node per
//! line, each carrying a `rows=N` estimate. A `Limit` node clips the
//! estimates of everything examined beneath it, so a huge scan feeding a
//! `LIMIT 1` is not flagged.

use sqlscope_core::{Config, Connection, PlanAnalyzer, Result, Value, is_select_statement, tags};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static PLAN_ROWS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\brows=(\d+)").expect("valid regex"));
static LIMIT_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s|(->))*Limit\s").expect("valid regex"));
static SEQ_SCAN_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s|(->))*Seq Scan").expect("valid regex"));

/// Apply the rules to EXPLAIN text lines.
///
/// Pure function of the lines and the configuration. Lines without a
/// `rows=` estimate count as zero rows; alert order follows line order.
/// The clip applies to `Limit` lines themselves, so a `Limit` nested under
/// a smaller one cannot widen it.
pub fn analyze_plan_lines(lines: &[String], config: &Config) -> Vec<String> {
    let mut alerts = Vec::new();
    let mut limit: Option<u64> = None;
    for line in lines {
        let mut rows: u64 = PLAN_ROWS
            .captures(line)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);
        if let Some(clip) = limit {
            rows = rows.min(clip);
        }
        if LIMIT_NODE.is_match(line) {
            limit = Some(rows);
        } else if SEQ_SCAN_NODE.is_match(line) {
            if rows > config.table_scan_limit {
                alerts.push(format!("table scan on ~{rows} rows"));
            }
        } else if rows > config.examined_rows_limit {
            alerts.push(format!("examined ~{rows} rows"));
        }
    }
    alerts
}

/// Plan analyzer issuing `EXPLAIN <sql>` against a PostgreSQL-family
/// connection.
///
/// Built with the raw connection, never the intercepting decorator, so the
/// EXPLAIN round-trip cannot be captured.
pub struct PostgresExplainAnalyzer {
    conn: Arc<dyn Connection>,
}

impl PostgresExplainAnalyzer {
    /// Create an analyzer over the given connection
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl PlanAnalyzer for PostgresExplainAnalyzer {
    async fn analyze_query(&self, sql: &str, params: &[Value]) -> Result<Vec<String>> {
        if !is_select_statement(sql) {
            return Ok(Vec::new());
        }
        let plan = self
            .conn
            .query_rows(&format!("EXPLAIN {sql}"), tags::EXPLAIN, params)
            .await?;
        // plan text is the first (only) column of each row
        let lines: Vec<String> = plan
            .iter()
            .filter_map(|row| row.get(0))
            .map(|value| value.to_string())
            .collect();
        let alerts = analyze_plan_lines(&lines, &Config::get());
        if !alerts.is_empty() {
            tracing::debug!(sql, ?alerts, "query plan flagged");
        }
        Ok(alerts)
    }
}
