//! ONNX Runtime backend for the local URL model

use std::path::Path;
use std::time::Instant;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::{prediction_from_scores, ClassifierError, Tokenizer, UrlClassifier, MAX_LEN};
use crate::models::LocalPrediction;

pub struct OnnxClassifier {
    // `run` needs exclusive access to the session
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    output_name: String,
}

impl OnnxClassifier {
    pub fn load(model_path: impl AsRef<Path>, tokenizer: Tokenizer) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ClassifierError::ModelUnavailable(format!(
                "model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelUnavailable(format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelUnavailable(format!("optimization level: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::ModelUnavailable(format!("load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifierError::ModelUnavailable("model has no outputs".to_string()))?;

        tracing::info!(
            "ONNX model loaded (vocab size {}, output '{}')",
            tokenizer.vocab_size(),
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            output_name,
        })
    }

    fn predict(&self, url: &str) -> Result<LocalPrediction, ClassifierError> {
        let start = Instant::now();

        let input = Array2::<f32>::from_shape_vec((1, MAX_LEN), self.tokenizer.encode(url))
            .map_err(|e| ClassifierError::Inference(format!("array error: {}", e)))?;
        let input_tensor = Value::from_array(input)
            .map_err(|e| ClassifierError::Inference(format!("tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ClassifierError::Inference("missing output".to_string()))?;
        let (_, scores) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("extract error: {}", e)))?;

        let prediction = prediction_from_scores(scores)?;
        tracing::debug!(
            "Local prediction {} ({:.4}) in {}us",
            prediction.label,
            prediction.confidence,
            start.elapsed().as_micros()
        );
        Ok(prediction)
    }
}

impl UrlClassifier for OnnxClassifier {
    fn classify(&self, url: &str) -> LocalPrediction {
        match self.predict(url) {
            Ok(prediction) => prediction,
            Err(e) => {
                tracing::warn!("Prediction error: {}", e);
                LocalPrediction::error()
            }
        }
    }

    fn is_ready(&self) -> bool {
        true
    }
}
