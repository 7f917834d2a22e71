//! sqlscope analyzer - EXPLAIN-based query plan analysis
//!
//! Backend-specific analyzers that run `EXPLAIN <sql>` through a connection
//! and translate the plan into alert strings:
//!
//! - `MysqlExplainAnalyzer` - row-oriented EXPLAIN output (MySQL family)
//! - `PostgresExplainAnalyzer` - text-tree EXPLAIN output (PostgreSQL family)
//!
//! Use [`explain::analyzer_for`] to pick the analyzer matching a
//! connection's driver.

pub mod explain;

pub use explain::analyzer_for;
pub use explain::mysql::MysqlExplainAnalyzer;
pub use explain::postgres::PostgresExplainAnalyzer;
