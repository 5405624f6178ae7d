//! flora-id library - Plant Identification service
//!
//! Classifies uploaded plant photos and returns the top-3 candidates with
//! taxonomy, botanical descriptions and the family tree of the best match.

pub mod analysis;
pub mod api;
pub mod error;
pub mod knowledge;
pub mod model;
pub mod preprocess;
pub mod taxonomy;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::analysis::Analyzer;

/// Default request body cap for uploads
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Classifier plus taxonomy/knowledge lookups (read-only)
    pub analyzer: Analyzer,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Upload size cap enforced on the router
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer,
            startup_time: Utc::now(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .merge(api::identify_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
