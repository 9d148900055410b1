//! Ephemeral in-process stores.
//!
//! Nothing here survives a restart or is shared between instances. The
//! traits are the seam for moving a store out of process (e.g. Redis) if the
//! site is ever scaled horizontally.
//!
//! ## Stores
//!
//! - **rate_limit** - Per-client submission counters, one limiter per form
//!
//! ## Usage in Handlers
//!
//! Stores are accessed via `state.stores`:
//!
//! ```ignore
//! async fn handler(State(state): State<AppState>, client: ClientKey) -> Result<impl IntoResponse, AppError> {
//!     if !state.stores.contact_limiter.check(client.as_str()).await.is_allowed() {
//!         return Err(AppError::RateLimited);
//!     }
//! }
//! ```

mod rate_limit;

pub use rate_limit::{
    InMemoryRateLimiter, RateLimitPolicy, RateLimitResult, RateLimiter, spawn_sweeper,
};

#[cfg(test)]
pub use rate_limit::MockRateLimiter;

use std::sync::Arc;

/// Collection of all ephemeral stores.
#[derive(Clone)]
pub struct Stores {
    pub contact_limiter: Arc<dyn RateLimiter>,
    pub join_limiter: Arc<dyn RateLimiter>,
}

impl Stores {
    /// Independent in-memory limiters for each form, sharing one policy.
    pub fn in_memory(policy: RateLimitPolicy) -> Self {
        Self {
            contact_limiter: Arc::new(InMemoryRateLimiter::new(policy)),
            join_limiter: Arc::new(InMemoryRateLimiter::new(policy)),
        }
    }

    pub fn limiters(&self) -> Vec<Arc<dyn RateLimiter>> {
        vec![self.contact_limiter.clone(), self.join_limiter.clone()]
    }
}
