//! Classifier model loading and inference
//!
//! The production classifier is an ONNX export of the plant model, run with
//! ONNX Runtime (`ort`). It is loaded once at startup; a missing or corrupt
//! artifact is fatal.
//!
//! Inference goes through the [`Classifier`] trait so the analysis pipeline
//! can be exercised with a fake model in tests.

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact does not exist
    #[error("Model file not found: {0}")]
    NotFound(PathBuf),

    /// Artifact exists but could not be loaded
    #[error("Model load failed: {0}")]
    Load(String),

    /// Inference call failed
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Image classifier: input batch tensor → raw class scores (logits)
///
/// Implementations must be safe to call concurrently from multiple requests.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError>;
}

/// ONNX Runtime backed classifier
pub struct OnnxClassifier {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    path: PathBuf,
}

impl OnnxClassifier {
    /// Load the ONNX artifact at `path`
    pub fn load(path: &Path, intra_threads: usize) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(load_error(path))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_error(path))?
            .with_intra_threads(intra_threads.max(1))
            .map_err(load_error(path))?
            .commit_from_file(path)
            .map_err(load_error(path))?;

        info!(
            "Loaded classifier {} ({} intra-op threads)",
            path.display(),
            intra_threads.max(1)
        );

        Ok(Self {
            session: Mutex::new(session),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_error<E: Display>(path: &Path) -> impl Fn(E) -> ModelError + '_ {
    move |e| ModelError::Load(format!("{}: {}", path.display(), e))
}

/// Lock the session, recovering from poisoning
///
/// A panic in an earlier run leaves the session itself usable.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Classifier for OnnxClassifier {
    fn classify(&self, input: &Array4<f32>) -> Result<Vec<f32>, ModelError> {
        let input_tensor = Tensor::from_array(input.clone())
            .map_err(|e| ModelError::Inference(format!("Input tensor: {}", e)))?;

        let mut session = lock_session(&self.session);

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let (_shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(format!("Extract logits: {}", e)))?;

        debug!("Classifier produced {} logits", logits.len());
        Ok(logits.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_artifact_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.onnx");

        let result = OnnxClassifier::load(&path, 1);
        assert!(matches!(result, Err(ModelError::NotFound(p)) if p == path));
    }

    #[test]
    fn test_poisoned_session_lock_is_recovered() {
        let session = Mutex::new(7u32);
        let _ = std::panic::catch_unwind(|| {
            let _guard = session.lock().unwrap();
            panic!("inference panicked");
        });
        assert!(session.is_poisoned());

        let guard = lock_session(&session);
        assert_eq!(*guard, 7);
    }
}
