//! Capture a couple of queries against a scripted connection and print the
//! text report plus the response-header value.
//!
//! Run with `RUST_LOG=debug` to see the analyzer's trace output.

use sqlscope_analyzer::analyzer_for;
use sqlscope_capture::{AnalyzedConnection, QueryAnalysis};
use sqlscope_core::test_support::{ScriptedConnection, make_rows};
use sqlscope_core::{Connection, Value};
use sqlscope_report::{Formatter, SQLSCOPE_HEADER};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let raw = Arc::new(ScriptedConnection::new("mysql"));
    // reply to the SELECT
    raw.push_rows(make_rows(
        &["id", "name"],
        (1..=150)
            .map(|id| vec![Value::Int64(id), Value::String(format!("user-{id}"))])
            .collect(),
    ));
    // reply to the analyzer's EXPLAIN
    raw.push_rows(make_rows(
        &["select_type", "type", "possible_keys", "key", "rows", "Extra"],
        vec![vec![
            Value::String("SIMPLE".to_string()),
            Value::String("ALL".to_string()),
            Value::Null,
            Value::Null,
            Value::Int64(150),
            Value::String(String::new()),
        ]],
    ));

    let analyzer = analyzer_for(raw.clone()).expect("mysql has an analyzer");
    let conn = AnalyzedConnection::new(raw).with_plan_analyzer(analyzer);

    let (result, analysis) = QueryAnalysis::capture(async {
        conn.query_rows("SELECT * FROM users", "User load", &[]).await
    })
    .await;
    result.expect("scripted query");

    let formatter = Formatter::new(&analysis);
    println!("{}", formatter.to_text());
    println!();
    println!("{SQLSCOPE_HEADER}: {}", formatter.header_value());
}
