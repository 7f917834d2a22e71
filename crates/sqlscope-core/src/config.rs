//! Configuration for sqlscope
//!
//! There is one process-wide configuration. Values can be replaced for the
//! whole process with [`Config::set_global`], or overridden for the dynamic
//! extent of a future with [`Config::override_scope`]. Overrides are
//! task-local: concurrent requests overriding independently never observe
//! each other's values, and nested overrides restore the outer value on
//! every exit path.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

static GLOBAL_CONFIG: Lazy<RwLock<Arc<Config>>> =
    Lazy::new(|| RwLock::new(Arc::new(Config::default())));

tokio::task_local! {
    static CONFIG_OVERRIDE: Arc<Config>;
}

/// Thresholds and display options for query analysis.
///
/// Queries are flagged when a measurement or a query-plan estimate exceeds
/// a limit. All comparisons are strictly greater-than. Limits are not
/// validated; callers are expected to supply non-negative values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Aggregate limit on the number of SELECTs per capture scope
    pub query_limit: u64,
    /// Limit on rows returned (per query and per capture scope)
    pub returned_rows_limit: u64,
    /// Limit on approximate result bytes (per query and per capture scope)
    pub result_size_limit: u64,
    /// Limit on execution time (per query and per capture scope)
    pub elapsed_time_limit: Duration,
    /// Plan rows above which a table scan is flagged
    pub table_scan_limit: u64,
    /// Plan rows above which a temporary table is flagged
    pub temporary_table_limit: u64,
    /// Plan rows above which a filesort is flagged
    pub filesort_limit: u64,
    /// Plan rows above which row examination is flagged
    pub examined_rows_limit: u64,
    /// Show the overlay even when nothing is flagged
    pub always_show: bool,
    /// Emit the debug report and overlay
    pub debug: bool,
    /// CSS overrides for the injected overlay container
    pub style: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            query_limit: 10,
            returned_rows_limit: 100,
            result_size_limit: 16_384,
            elapsed_time_limit: Duration::from_millis(300),
            table_scan_limit: 100,
            temporary_table_limit: 100,
            filesort_limit: 100,
            examined_rows_limit: 5_000,
            always_show: false,
            debug: false,
            style: HashMap::new(),
        }
    }
}

impl Config {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the per-scope query count limit
    pub fn with_query_limit(mut self, limit: u64) -> Self {
        self.query_limit = limit;
        self
    }

    /// Builder method: set the returned-rows limit
    pub fn with_returned_rows_limit(mut self, limit: u64) -> Self {
        self.returned_rows_limit = limit;
        self
    }

    /// Builder method: set the result size limit in bytes
    pub fn with_result_size_limit(mut self, limit: u64) -> Self {
        self.result_size_limit = limit;
        self
    }

    /// Builder method: set the elapsed time limit
    pub fn with_elapsed_time_limit(mut self, limit: Duration) -> Self {
        self.elapsed_time_limit = limit;
        self
    }

    /// Builder method: set the table scan limit
    pub fn with_table_scan_limit(mut self, limit: u64) -> Self {
        self.table_scan_limit = limit;
        self
    }

    /// Builder method: set the examined rows limit
    pub fn with_examined_rows_limit(mut self, limit: u64) -> Self {
        self.examined_rows_limit = limit;
        self
    }

    /// Builder method: set the debug flag
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builder method: set the always-show flag
    pub fn with_always_show(mut self, always_show: bool) -> Self {
        self.always_show = always_show;
        self
    }

    /// Get the live configuration: the innermost task-local override if one
    /// is in scope, else the global instance.
    pub fn get() -> Arc<Config> {
        CONFIG_OVERRIDE
            .try_with(|c| c.clone())
            .unwrap_or_else(|_| GLOBAL_CONFIG.read().clone())
    }

    /// Replace the global configuration. Intended for process start-up.
    pub fn set_global(config: Config) {
        *GLOBAL_CONFIG.write() = Arc::new(config);
    }

    /// Run a future with a modified copy of the live configuration.
    ///
    /// The live config is cloned (style map included), `mutate` is applied
    /// to the clone, and the clone becomes current for the extent of `fut`.
    /// The previous config is restored when the future completes, fails, or
    /// is dropped. Overrides nest.
    pub async fn override_scope<M, Fut>(mutate: M, fut: Fut) -> Fut::Output
    where
        M: FnOnce(&mut Config),
        Fut: std::future::Future,
    {
        let mut dup = (*Self::get()).clone();
        mutate(&mut dup);
        CONFIG_OVERRIDE.scope(Arc::new(dup), fut).await
    }
}
