//! Remote reasoning backend port.

use crate::error::BackendError;

/// A chat-style request to a reasoning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningRequest {
    /// Instruction block: criteria and output schema.
    pub system_prompt: String,
    /// The serialized evidence to judge.
    pub user_prompt: String,
}

/// Port for an external reasoning service that answers with a JSON object.
pub trait ReasoningBackend: Send + Sync {
    /// Short identifier (model name) of the backend.
    fn name(&self) -> &str;

    /// Sends one request and returns the raw message content.
    ///
    /// Implementations must bound the call with a deadline. No retries.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] on transport, status or timeout failures.
    fn complete(&self, request: &ReasoningRequest) -> Result<String, BackendError>;
}
