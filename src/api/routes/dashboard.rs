//! Dashboard Routes
//!
//! - GET /api/v1/dashboard - Summary widgets

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::dashboard::{self, DashboardSummary};
use crate::report::EvalContext;

/// GET /api/v1/dashboard
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSummary> {
    Json(dashboard::summarize(&state.store, &EvalContext::default()).await)
}
