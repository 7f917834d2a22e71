//! Row-oriented plan analysis for the MySQL family
//!
//! MySQL EXPLAIN returns one row per plan node with columns like
//! `select_type`, `type`, `key` and `Extra`. The rule table below inspects
//! each row independently; matches across all rows accumulate into one flat
//! alert list.

use sqlscope_core::{Config, Connection, PlanAnalyzer, Result, Row, Value, is_select_statement, tags};
use async_trait::async_trait;
use std::sync::Arc;

fn field_text(row: &Row, name: &str) -> String {
    match row.get_ci(name) {
        None | Some(Value::Null) => String::new(),
        Some(value) => value.to_string().to_lowercase(),
    }
}

fn field_is_empty(row: &Row, name: &str) -> bool {
    match row.get_ci(name) {
        None | Some(Value::Null) => true,
        Some(value) => value.to_string().is_empty(),
    }
}

fn field_rows(row: &Row) -> u64 {
    row.get_ci("rows").and_then(Value::as_u64).unwrap_or(0)
}

/// Apply the rule table to decoded EXPLAIN rows.
///
/// Pure function of the rows and the configuration. Column names are
/// matched case-insensitively and values are compared lower-cased, so
/// server and driver casing differences do not matter.
pub fn analyze_plan_rows(plan: &[Row], config: &Config) -> Vec<String> {
    let mut alerts = Vec::new();
    for row in plan {
        let select_type = field_text(row, "select_type");
        let access_type = field_text(row, "type");
        let extra = field_text(row, "Extra");
        let plan_rows = field_rows(row);

        if access_type.contains("all") && plan_rows > config.table_scan_limit {
            alerts.push("table scan".to_string());
        }
        if access_type.contains("fulltext") {
            alerts.push("fulltext search".to_string());
        }
        if field_is_empty(row, "key") && plan_rows > config.table_scan_limit {
            alerts.push("no index used".to_string());
        }
        if field_is_empty(row, "possible_keys") && plan_rows > config.table_scan_limit {
            alerts.push("no indexes possible".to_string());
        }
        if select_type.contains("dependent") {
            alerts.push("dependent subquery".to_string());
        }
        if select_type.contains("uncacheable") {
            alerts.push("uncacheable subquery".to_string());
        }
        if extra.contains("full scan on null key") {
            alerts.push("full scan on null key".to_string());
        }
        if extra.contains("using temporary") && plan_rows > config.temporary_table_limit {
            alerts.push(format!("uses temporary table for {plan_rows} rows"));
        }
        if extra.contains("filesort") && plan_rows > config.filesort_limit {
            alerts.push(format!("uses filesort for {plan_rows} rows"));
        }
        if plan_rows > config.examined_rows_limit {
            alerts.push(format!("examines {plan_rows} rows"));
        }
    }
    alerts
}

/// Plan analyzer issuing `EXPLAIN <sql>` against a MySQL-family connection.
///
/// Built with the raw connection, never the intercepting decorator, so the
/// EXPLAIN round-trip cannot be captured.
pub struct MysqlExplainAnalyzer {
    conn: Arc<dyn Connection>,
}

impl MysqlExplainAnalyzer {
    /// Create an analyzer over the given connection
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl PlanAnalyzer for MysqlExplainAnalyzer {
    async fn analyze_query(&self, sql: &str, params: &[Value]) -> Result<Vec<String>> {
        if !is_select_statement(sql) {
            return Ok(Vec::new());
        }
        let plan = self
            .conn
            .query_rows(&format!("EXPLAIN {sql}"), tags::EXPLAIN, params)
            .await?;
        let alerts = analyze_plan_rows(&plan, &Config::get());
        if !alerts.is_empty() {
            tracing::debug!(sql, ?alerts, "query plan flagged");
        }
        Ok(alerts)
    }
}
