//! Remote Arbiter Adapter
//!
//! One attempt per request, no retries. Implementations must be
//! side-effect free so a caller may retry without changing semantics.

pub mod gemini;
pub mod schema;

use async_trait::async_trait;

use crate::models::{ArbiterOutcome, LocalPrediction};

pub use gemini::GeminiArbiter;

#[async_trait]
pub trait Arbiter: Send + Sync {
    async fn arbitrate(&self, url: &str, local: &LocalPrediction) -> ArbiterOutcome;

    /// Whether a credential/endpoint is set
    fn is_configured(&self) -> bool;
}
