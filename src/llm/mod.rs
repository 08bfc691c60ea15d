pub mod ollama;
pub mod prompt_builder;
pub mod prompts;
mod stream;

use crate::error::Result;

/// Trait for talking to a text-generation backend.
///
/// Implementations check that the service is reachable before every call.
pub trait LlmClient {
    /// Single-shot generation; returns the full response text.
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Incremental generation. Each fragment goes to `on_chunk` as it arrives, in order;
    /// the return value is their concatenation.
    fn generate_stream(&self, prompt: &str, on_chunk: &mut dyn FnMut(&str)) -> Result<String>;
}
