//! Sample identification endpoint
//!
//! `GET /` serves the landing page. `POST /` takes a multipart upload with a
//! `file` field, runs the analysis pipeline and returns:
//!
//! ```json
//! {
//!   "status": "success",
//!   "analysis": [ { "prediction": {...}, "probability": "90.00%", ... } ],
//!   "taxonomic_tree": { "科": "...", "属": [...], "种": [...] }
//! }
//! ```

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::analysis::{AnalysisError, PredictionResult};
use crate::api::ui::serve_index;
use crate::error::{ApiError, ApiResult};
use crate::taxonomy::TaxonomicTree;
use crate::AppState;

/// Multipart field carrying the sample image
pub const SAMPLE_FIELD: &str = "file";

/// Successful identification response
#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub status: &'static str,
    pub analysis: Vec<PredictionResult>,
    pub taxonomic_tree: TaxonomicTree,
}

/// POST /
///
/// Identify an uploaded plant sample.
pub async fn identify_sample(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<IdentifyResponse>> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            warn!("POST / without multipart body: {}", rejection);
            return Err(ApiError::MissingSample);
        }
    };

    let sample = match read_sample(&mut multipart).await? {
        Some(sample) => sample,
        None => {
            warn!("POST / without '{}' field", SAMPLE_FIELD);
            return Err(ApiError::MissingSample);
        }
    };

    info!("Received sample ({} bytes)", sample.len());

    // Inference is CPU-bound; keep it off the async workers
    let analyzer = state.analyzer.clone();
    let outcome = tokio::task::spawn_blocking(move || analyzer.analyze(&sample))
        .await
        .map_err(|e| AnalysisError::Worker(e.to_string()))
        .and_then(|result| result);

    let analysis = match outcome {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Sample analysis failed: {}", e);
            return Err(e.into());
        }
    };

    let family = analysis
        .first()
        .map(|top| top.prediction.family.as_str())
        .unwrap_or_default();
    let taxonomic_tree = state.analyzer.taxonomy().build_tree(family);

    if let Some(top) = analysis.first() {
        info!(
            "Identified sample as {} ({})",
            top.prediction.common_name, top.probability
        );
    }

    Ok(Json(IdentifyResponse {
        status: "success",
        analysis,
        taxonomic_tree,
    }))
}

/// Find the sample file part and read its bytes
///
/// Only a `file` part carrying a filename counts as an upload; plain form
/// values (even one named `file`) and other fields are skipped. Returns `None`
/// when no sample file is present.
async fn read_sample(multipart: &mut Multipart) -> ApiResult<Option<Bytes>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(e.to_string()))?
    {
        if field.name() == Some(SAMPLE_FIELD) && field.file_name().is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidUpload(e.to_string()))?;
            return Ok(Some(bytes));
        }
    }

    Ok(None)
}

/// Build identification routes (`GET /` page, `POST /` upload)
pub fn identify_routes() -> Router<AppState> {
    Router::new().route("/", get(serve_index).post(identify_sample))
}
