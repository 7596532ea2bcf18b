//! Generation-service providers.
//!
//! The workflow talks to an opaque text-generation collaborator through
//! [`GenerationProvider`]: one prompt in, one raw text string out. Parsing
//! and shape-checking of that string is the validator's job, never the
//! provider's.

pub mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;

use crate::error::Result;
use crate::prompt::GenerationRequest;

/// An external text-generation service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run one generation call and return the raw text the model produced.
    ///
    /// A transport failure or non-success status is a
    /// [`crate::error::DreamError::Provider`]; the caller decides whether to
    /// resubmit. No internal retries.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}
