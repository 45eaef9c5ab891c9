pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod error;
mod llm;
pub mod parser;
mod processor;
pub mod report;
pub mod resolver;
pub mod tracing;
pub mod types;
pub mod yt;

pub use llm::{openrouter, prompt};
pub use llm::{summarizer::VideoSummarizer, ChatCompletion};
pub use processor::{builder::DigestProcessorBuilder, DigestProcessor, RunSummary};
