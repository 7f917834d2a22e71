//! Test scaffolding shared by the sqlscope crates
//!
//! Provides a scripted in-memory connection that serves canned results and
//! records every statement executed through it. Downstream crates use it to
//! exercise interception, plan analysis, and reporting without a database.
//!
//! Usage:
//! ```ignore
//! let conn = ScriptedConnection::new("mysql");
//! conn.push_rows(rows_result(&["id"], &[&[Value::Int64(1)]]));
//! let rows = conn.query_rows("SELECT id FROM users", "User load", &[]).await?;
//! assert_eq!(conn.executed(), vec![("SELECT id FROM users".to_string(), "User load".to_string())]);
//! ```

use crate::{Connection, QueryResult, Result, Row, SqlScopeError, Value};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// One scripted reply: a row set or an error
enum Reply {
    Rows(Vec<Row>),
    Error(SqlScopeError),
}

/// In-memory connection serving queued replies in FIFO order.
///
/// When the queue is empty, queries return an empty row set; this keeps
/// tests that only care about the executed-statement log short.
pub struct ScriptedConnection {
    driver: String,
    replies: Mutex<VecDeque<Reply>>,
    executed: Mutex<Vec<(String, String)>>,
}

impl ScriptedConnection {
    /// Create a scripted connection reporting the given driver name
    pub fn new(driver: &str) -> Self {
        Self {
            driver: driver.to_string(),
            replies: Mutex::new(VecDeque::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Queue a row set to be served by the next query
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.replies.lock().push_back(Reply::Rows(rows));
    }

    /// Queue an error to be served by the next query
    pub fn push_error(&self, error: SqlScopeError) {
        self.replies.lock().push_back(Reply::Error(error));
    }

    /// Every `(sql, tag)` pair executed through this connection, in order
    pub fn executed(&self) -> Vec<(String, String)> {
        self.executed.lock().clone()
    }

    /// Number of statements executed through this connection
    pub fn executed_count(&self) -> usize {
        self.executed.lock().len()
    }

    fn next_rows(&self, sql: &str, tag: &str) -> Result<Vec<Row>> {
        self.executed
            .lock()
            .push((sql.to_string(), tag.to_string()));
        match self.replies.lock().pop_front() {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Error(err)) => Err(err),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    async fn query(&self, sql: &str, tag: &str, params: &[Value]) -> Result<QueryResult> {
        let _ = params;
        let rows = self.next_rows(sql, tag)?;
        let columns = rows
            .first()
            .map(|r| r.columns().to_vec())
            .unwrap_or_default();
        Ok(QueryResult::new(columns, rows))
    }

    async fn query_rows(&self, sql: &str, tag: &str, params: &[Value]) -> Result<Vec<Row>> {
        let _ = params;
        self.next_rows(sql, tag)
    }
}

/// Build rows sharing one set of column names.
///
/// # Example
/// ```ignore
/// let rows = make_rows(&["id", "name"], vec![
///     vec![Value::Int64(1), Value::String("a".into())],
/// ]);
/// ```
pub fn make_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Vec<Row> {
    let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    rows.into_iter()
        .map(|values| Row::new(columns.clone(), values))
        .collect()
}

/// Build single-text-column rows, the shape PostgreSQL EXPLAIN output takes
pub fn plan_text_rows(lines: &[&str]) -> Vec<Row> {
    make_rows(
        &["QUERY PLAN"],
        lines
            .iter()
            .map(|l| vec![Value::String(l.to_string())])
            .collect(),
    )
}
