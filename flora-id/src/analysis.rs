//! Sample analysis pipeline
//!
//! image bytes → preprocess → classifier logits → softmax → top-3 →
//! join with taxonomy table and knowledge store.
//!
//! Any failure before the join is reported as one [`AnalysisError`]; no
//! partial results are returned.

use crate::knowledge::KnowledgeStore;
use crate::model::{Classifier, ModelError};
use crate::preprocess::{preprocess, PreprocessError};
use crate::taxonomy::{TaxonomicRecord, TaxonomyTable, NUM_CLASSES};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Number of predictions returned per sample
pub const TOP_K: usize = 3;

/// Per-request analysis failures
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Uploaded bytes are not a decodable image
    #[error("{0}")]
    Decode(#[from] PreprocessError),

    /// Classifier failed
    #[error("{0}")]
    Inference(#[from] ModelError),

    /// Classifier output has the wrong number of scores
    #[error("Model output shape mismatch: expected {expected} scores, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The blocking analysis task did not complete
    #[error("Analysis worker failed: {0}")]
    Worker(String),
}

/// One ranked prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: TaxonomicRecord,
    /// Percentage with two decimals, e.g. `"90.00%"`
    pub probability: String,
    /// Raw softmax probability in [0, 1]
    pub confidence: f32,
    pub morphology: Option<String>,
    pub ecology: Option<String>,
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Indices of the `k` largest probabilities, descending
///
/// Equal probabilities keep ascending class id order.
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    // stable sort: ties stay in index order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

/// Format a probability as a two-decimal percentage
///
/// Scaled in `f64` so values near a rounding boundary are not shifted by
/// `f32` multiplication error.
pub fn format_percentage(probability: f32) -> String {
    format!("{:.2}%", f64::from(probability) * 100.0)
}

/// Analysis orchestrator
///
/// Holds the classifier and the read-only lookup tables. Cloning is cheap
/// (shared `Arc`s).
#[derive(Clone)]
pub struct Analyzer {
    classifier: Arc<dyn Classifier>,
    taxonomy: Arc<TaxonomyTable>,
    knowledge: Arc<KnowledgeStore>,
}

impl Analyzer {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        taxonomy: Arc<TaxonomyTable>,
        knowledge: Arc<KnowledgeStore>,
    ) -> Self {
        Self {
            classifier,
            taxonomy,
            knowledge,
        }
    }

    pub fn taxonomy(&self) -> &TaxonomyTable {
        &self.taxonomy
    }

    /// Classify one sample and return the top-3 enriched predictions
    pub fn analyze(&self, image_bytes: &[u8]) -> Result<Vec<PredictionResult>, AnalysisError> {
        let tensor = preprocess(image_bytes)?;
        let logits = self.classifier.classify(&tensor)?;

        if logits.len() != NUM_CLASSES {
            return Err(AnalysisError::ShapeMismatch {
                expected: NUM_CLASSES,
                actual: logits.len(),
            });
        }

        let non_finite = logits.iter().enumerate().find(|(_, l)| !l.is_finite());
        if let Some((class_id, logit)) = non_finite {
            return Err(AnalysisError::Inference(ModelError::Inference(format!(
                "non-finite score {} for class {}",
                logit, class_id
            ))));
        }

        let probabilities = softmax(&logits);
        let ranked = top_k(&probabilities, TOP_K);
        debug!("Top-{} classes: {:?}", TOP_K, ranked);

        Ok(ranked
            .into_iter()
            .map(|(class_id, probability)| self.enrich(class_id, probability))
            .collect())
    }

    fn enrich(&self, class_id: usize, probability: f32) -> PredictionResult {
        let knowledge = self.knowledge.lookup(class_id);
        PredictionResult {
            prediction: self.taxonomy.lookup(class_id),
            probability: format_percentage(probability),
            confidence: probability,
            morphology: knowledge.morphology,
            ecology: knowledge.ecology,
        }
    }
}
