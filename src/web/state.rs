//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::rate_limit::RateLimiter;
use crate::store::ContactStore;

/// Handlers hold the lock across their whole load/validate/save sequence, so
/// writes from concurrent requests in this process are serialized.
pub struct AppState {
    pub store: ContactStore,
}

pub type SharedState = Arc<Mutex<AppState>>;

pub type SharedLimiter = Arc<RateLimiter>;

pub fn shared_state(store: ContactStore) -> SharedState {
    Arc::new(Mutex::new(AppState { store }))
}
