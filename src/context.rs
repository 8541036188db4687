//! Request-scoped key/value store.
//!
//! Every inbound request gets its own [`RequestContext`]. The handle travels in
//! the request extensions, and `middleware::context` additionally runs the
//! request inside a task-local scope so code deeper in the call chain can reach
//! the store through the free functions in this module without threading it
//! through every signature.
//!
//! The store is cleared when the scope ends, whether the request returned, failed,
//! panicked, or was dropped by a timeout.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Well-known keys recorded by the boundary layer and the identity handlers.
pub mod keys {
    pub const REQUEST_ID: &str = "requestId";
    pub const METHOD: &str = "method";
    pub const PATH: &str = "path";
    pub const LOGIN_NAME: &str = "loginName";
    pub const USER_ID: &str = "userId";
    pub const CLIENT_ID: &str = "clientId";
}

tokio::task_local! {
    static CURRENT: RequestContext;
}

/// Scratch space for one request.
///
/// Cloning yields another handle to the same entries; it is not a copy.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Snapshot of every entry.
    pub fn get_all(&self) -> HashMap<String, String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

// Clears the store on drop so every exit path (including cancellation) empties it.
struct ScopeGuard(RequestContext);

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.0.clear();
    }
}

/// Run `fut` with `ctx` as the current request context, clearing it afterwards.
pub async fn scope<F>(ctx: RequestContext, fut: F) -> F::Output
where
    F: Future,
{
    let _guard = ScopeGuard(ctx.clone());
    CURRENT.scope(ctx, fut).await
}

/// Set `key` in the current scope. Outside a scope this does nothing.
pub fn set(key: impl Into<String>, value: impl Into<String>) {
    let _ = CURRENT.try_with(|ctx| ctx.set(key, value));
}

pub fn get(key: &str) -> Option<String> {
    CURRENT.try_with(|ctx| ctx.get(key)).ok().flatten()
}

pub fn get_all() -> HashMap<String, String> {
    CURRENT.try_with(|ctx| ctx.get_all()).unwrap_or_default()
}

pub fn clear() {
    let _ = CURRENT.try_with(|ctx| ctx.clear());
}
