//! LlmProvider trait definition.
//!
//! The abstraction over the external language-model completion service.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).
//! Implementations live in colloquy-infra (e.g., `AnthropicProvider`).

use colloquy_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// Transport and service errors surface as [`LlmError`]; they are not
    /// retried here -- the caller decides whether to retry.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
