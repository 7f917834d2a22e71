//! Cache-fetch attribution
//!
//! Application cache layers wrap their miss handlers in
//! [`run_in_fetch_scope`] so that queries executed while computing a cache
//! entry are recorded as cached. On a later hit the handler does not run,
//! no queries execute, and the report's cached section shows what the hit
//! saved.

use crate::context;
use std::future::Future;

/// Run a cache miss handler, marking every query it executes as cached.
///
/// `key` identifies the cache entry being computed and is only used for
/// trace output. Scopes nest; the flag stays raised until the outermost
/// scope exits.
pub async fn run_in_fetch_scope<Fut>(key: &str, fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    tracing::trace!(key, "computing cache entry");
    context::cache_fetch_scope(fut).await
}

/// True while execution is inside a cache-fetch scope
pub fn in_fetch_scope() -> bool {
    context::in_cache_fetch()
}
