//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::contacts::ContactService;
use crate::report::ReportService;
use crate::store::Store;
use std::sync::Arc;
use std::time::Instant;

pub use crate::config::ApiConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store for contacts and saved reports
    pub store: Arc<Store>,
    pub contacts: ContactService,
    pub reports: ReportService,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state whose services share one store
    pub fn new(store: Arc<Store>, config: ApiConfig) -> Self {
        Self {
            contacts: ContactService::new(Arc::clone(&store)),
            reports: ReportService::new(Arc::clone(&store)),
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
