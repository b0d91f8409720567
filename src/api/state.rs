//! Application State
//!
//! Shared state accessible by all API handlers, wrapped in Arc for
//! thread-safe sharing across async tasks.

use crate::query::QueryService;
use crate::store::SampleStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
pub struct AppState {
    /// Query service backing the read endpoints
    pub query: QueryService,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<SampleStore>) -> Self {
        Self {
            query: QueryService::new(store),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
