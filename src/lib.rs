// Copyright 2025 The prompt-refiner Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Prompt Refiner
//!
//! Client for a remote prompt-enhancement service.
//!
//! A terse "lazy prompt" plus optional refinement parameters is sent to
//! `POST {base_url}/refine-prompt`; the service answers with a refined
//! prompt, the topics it detected and recommended references. Transient
//! failures (transport errors, 5xx) are retried with bounded exponential
//! backoff; client errors (4xx) and malformed success bodies are not.
//!
//! ## Simple Example
//!
//! ```rust,no_run
//! use prompt_refiner::RefineClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RefineClient::new("http://localhost:8080", Duration::from_secs(10))?;
//!     let refined = client.refine("set up a k8s cluster").await?;
//!     println!("{}", refined);
//!     Ok(())
//! }
//! ```
//!
//! ## With Options
//!
//! ```rust,no_run
//! use prompt_refiner::{
//!     Domain, ExpertiseLevel, OutputFormat, RefineClient, RefineOptions, RetryConfig,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RefineClient::new("http://localhost:8080", Duration::from_secs(10))?
//!         .with_retry_config(RetryConfig::with_retries(5));
//!
//!     let options = RefineOptions::default()
//!         .with_domain(Domain::Infrastructure)
//!         .with_expertise_level(ExpertiseLevel::Expert)
//!         .with_output_format(OutputFormat::Tutorial)
//!         .with_best_practices(true)
//!         .with_examples(false);
//!
//!     let response = client.refine_with_options("set up a k8s cluster", options).await?;
//!     println!("{}", response.refined_prompt);
//!     for topic in &response.detected_topics {
//!         println!("- {}", topic);
//!     }
//!     Ok(())
//! }
//! ```

pub mod refine;
pub mod retry;
pub mod settings;

pub use refine::{
    ClientConfig, Domain, ExpertiseLevel, OutputFormat, PromptRequest, PromptResponse,
    RefineClient, RefineError, RefineOptions,
};
pub use retry::{classify_status, RetryConfig, StatusClass};
pub use settings::{AppSettings, SettingsError};
