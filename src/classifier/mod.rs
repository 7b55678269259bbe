//! Classifier Adapter - local URL model
//!
//! `classify` never fails: any internal problem degrades to
//! `{Unknown, 0.0}` (model unavailable) or `{Error, 0.0}` (inference failed).

pub mod tokenizer;
#[cfg(feature = "onnx")]
pub mod onnx;

use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::models::{LocalLabel, LocalPrediction};

pub use tokenizer::{Tokenizer, MAX_LEN};

/// Output index -> label, as trained
pub const LABELS: [LocalLabel; 2] = [LocalLabel::Malicious, LocalLabel::Safe];

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

pub trait UrlClassifier: Send + Sync {
    fn classify(&self, url: &str) -> LocalPrediction;

    /// Whether a model is loaded
    fn is_ready(&self) -> bool;
}

/// Stand-in used when the model could not be loaded
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl UrlClassifier for UnavailableClassifier {
    fn classify(&self, url: &str) -> LocalPrediction {
        tracing::debug!("Local model unavailable ({}), skipping {}", self.reason, url);
        LocalPrediction::unknown()
    }

    fn is_ready(&self) -> bool {
        false
    }
}

/// Load the configured classifier, falling back to `UnavailableClassifier`
pub fn load(config: &Config) -> Arc<dyn UrlClassifier> {
    match try_load(config) {
        Ok(classifier) => classifier,
        Err(e) => {
            tracing::warn!("Local classifier disabled: {}", e);
            Arc::new(UnavailableClassifier::new(e.to_string()))
        }
    }
}

#[cfg(feature = "onnx")]
fn try_load(config: &Config) -> Result<Arc<dyn UrlClassifier>, ClassifierError> {
    let tokenizer = Tokenizer::from_file(&config.tokenizer_path)?;
    let classifier = onnx::OnnxClassifier::load(&config.model_path, tokenizer)?;
    Ok(Arc::new(classifier))
}

#[cfg(not(feature = "onnx"))]
fn try_load(_config: &Config) -> Result<Arc<dyn UrlClassifier>, ClassifierError> {
    Err(ClassifierError::ModelUnavailable(
        "built without the `onnx` feature".to_string(),
    ))
}

/// Turn raw model scores into a prediction.
///
/// Two outputs are softmax over `LABELS`; a single output is the
/// probability of the Safe class.
pub fn prediction_from_scores(scores: &[f32]) -> Result<LocalPrediction, ClassifierError> {
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ClassifierError::Inference("non-finite model output".to_string()));
    }

    match scores {
        [] => Err(ClassifierError::Inference("empty model output".to_string())),
        [p_safe] => {
            let p_safe = f64::from(*p_safe).clamp(0.0, 1.0);
            if p_safe >= 0.5 {
                Ok(LocalPrediction::new(LocalLabel::Safe, p_safe))
            } else {
                Ok(LocalPrediction::new(LocalLabel::Malicious, 1.0 - p_safe))
            }
        }
        _ => {
            let (index, best) = scores
                .iter()
                .enumerate()
                .fold((0, f32::MIN), |acc, (i, &s)| if s > acc.1 { (i, s) } else { acc });

            let label = LABELS.get(index).copied().unwrap_or(LocalLabel::Unknown);
            Ok(LocalPrediction::new(label, f64::from(best).clamp(0.0, 1.0)))
        }
    }
}
