//! Execution-context-local capture state
//!
//! All three pieces of dynamic state (the current analysis, the cache-fetch
//! flag, the interception-disable flag) live in task-local scopes: entering
//! a scope shadows the enclosing value and exiting restores it, on every
//! exit path including errors and cancellation. Concurrent tasks never see
//! each other's values. Nothing here is a shared mutable global.

use crate::QueryAnalysis;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    static CURRENT_ANALYSIS: Arc<Mutex<QueryAnalysis>>;
    static IN_CACHE_FETCH: bool;
    static INTERCEPT_DISABLED: bool;
}

/// The analysis currently receiving intercepted queries, if any
pub(crate) fn current_analysis() -> Option<Arc<Mutex<QueryAnalysis>>> {
    CURRENT_ANALYSIS.try_with(|a| a.clone()).ok()
}

/// Run `fut` with `handle` as the current analysis
pub(crate) async fn analysis_scope<Fut>(handle: Arc<Mutex<QueryAnalysis>>, fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    CURRENT_ANALYSIS.scope(handle, fut).await
}

/// True while execution is inside a cache-fetch scope
pub(crate) fn in_cache_fetch() -> bool {
    IN_CACHE_FETCH.try_with(|v| *v).unwrap_or(false)
}

/// Run `fut` with the cache-fetch flag raised
pub(crate) async fn cache_fetch_scope<Fut>(fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    IN_CACHE_FETCH.scope(true, fut).await
}

/// True while interception is disabled for this context
pub fn interception_disabled() -> bool {
    INTERCEPT_DISABLED.try_with(|v| *v).unwrap_or(false)
}

/// Run `fut` with interception disabled.
///
/// Queries executed inside the scope pass straight through to the
/// underlying connection unmeasured. Used around plan-analysis EXPLAIN
/// round-trips, and available to callers issuing housekeeping queries they
/// do not want counted.
pub async fn without_interception<Fut>(fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    INTERCEPT_DISABLED.scope(true, fut).await
}

#[cfg(test)]
mod tests;
