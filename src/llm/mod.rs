//! Language model abstraction
//!
//! The API layer and the background worker only need "prompt in, text out";
//! provider details live behind [`LanguageModel`].

use async_trait::async_trait;

use crate::types::RecipeModel;
use crate::Result;

pub mod openai;

pub use openai::OpenAiClient;

/// Token usage reported by the provider for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Generated text plus optional usage
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a single user prompt and return the generated text.
    async fn complete(&self, model: RecipeModel, prompt: &str) -> Result<Completion>;
}
