//! Prompt refinement client.

mod client;
mod error;
mod types;

pub use client::{ClientConfig, RefineClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::RefineError;
pub use types::{Domain, ExpertiseLevel, OutputFormat, PromptRequest, PromptResponse, RefineOptions};
