//! Plan analyzers
//!
//! Each backend family gets its own module with a pure rule function over
//! decoded plan rows plus a [`PlanAnalyzer`] implementation that issues the
//! EXPLAIN round-trip. The rule functions take the live configuration as an
//! argument so they stay deterministic under test.

pub mod mysql;
pub mod postgres;

use sqlscope_core::{Connection, PlanAnalyzer};
use std::sync::Arc;

/// Pick the plan analyzer matching a connection's driver, if any.
///
/// Unknown drivers get `None`; their queries are measured without plan
/// alerts.
pub fn analyzer_for(conn: Arc<dyn Connection>) -> Option<Arc<dyn PlanAnalyzer>> {
    match conn.driver_name() {
        "mysql" | "mysql2" | "mariadb" => Some(Arc::new(mysql::MysqlExplainAnalyzer::new(conn))),
        "postgres" | "postgresql" => Some(Arc::new(postgres::PostgresExplainAnalyzer::new(conn))),
        _ => None,
    }
}
