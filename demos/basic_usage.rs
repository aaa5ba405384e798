//! Basic usage example for Prompt Refiner.

use prompt_refiner::{
    Domain, ExpertiseLevel, OutputFormat, RefineClient, RefineError, RefineOptions, RetryConfig,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing so retries show up with RUST_LOG=warn
    tracing_subscriber::fmt::init();

    // Configure the client
    // Adjust the base URL to wherever the refinement service runs
    let client = RefineClient::new("http://localhost:8080", Duration::from_secs(10))?
        .with_retry_config(
            RetryConfig::with_retries(4)
                .with_initial_delay(Duration::from_millis(200))
                .with_max_delay(Duration::from_secs(3)),
        );

    // Simplest form: just the refined text
    match client.refine("write a dockerfile").await {
        Ok(refined) => println!("Refined:\n{}\n", refined),
        Err(e) => eprintln!("Refinement failed: {}\n", e),
    }

    // Full form: options and structured response
    let options = RefineOptions::default()
        .with_domain(Domain::Security)
        .with_expertise_level(ExpertiseLevel::Intermediate)
        .with_output_format(OutputFormat::Checklist)
        .with_best_practices(true);

    match client.refine_with_options("lock down ssh", options).await {
        Ok(response) => {
            println!("Refined:\n{}\n", response.refined_prompt);
            println!("Topics: {}", response.detected_topics.join(", "));
            if let Some(refs) = response.recommended_references {
                println!("References: {}", refs.join(", "));
            }
        }
        Err(RefineError::ClientStatus { status }) => {
            eprintln!("Service rejected the request ({})", status);
        }
        Err(e) => eprintln!("Refinement failed: {}", e),
    }

    Ok(())
}
