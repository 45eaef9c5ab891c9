pub mod openrouter;
pub mod prompt;
pub mod summarizer;

use std::{fmt::Display, future::Future};

/// A single-turn chat completion endpoint
pub trait ChatCompletion {
    type Error: Display;

    /// Sends `prompt` as the only user message and returns the first choice's text
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
