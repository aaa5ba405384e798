//! Prompt Refiner - turn lazy prompts into structured ones
//!
//! This is the CLI entry point for the prompt-refiner tool.
//! Run with: cargo run --bin prompt-refiner -- [options] <prompt>

use anyhow::{bail, Context};
use prompt_refiner::{
    AppSettings, Domain, ExpertiseLevel, OutputFormat, PromptRequest, PromptResponse,
    RefineClient, RefineError, RefineOptions,
};
use std::env;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: prompt-refiner [options] [prompt...]

Options:
  --domain <architecture|development|infrastructure|security|general>
  --expertise <beginner|intermediate|expert>
  --format <simple|detailed|tutorial|checklist>
  --best-practices / --no-best-practices
  --examples / --no-examples
  --save-settings   Persist the effective settings and exit
  -h, --help        Show this help

Without a prompt, prompts are read interactively from stdin.";

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    options: RefineOptions,
    prompt: Option<String>,
    save_settings: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut words = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--domain" => {
                let value = iter.next().context("--domain needs a value")?;
                parsed.options = parsed.options.with_domain(value.parse::<Domain>()?);
            }
            "--expertise" => {
                let value = iter.next().context("--expertise needs a value")?;
                parsed.options = parsed.options.with_expertise_level(value.parse::<ExpertiseLevel>()?);
            }
            "--format" => {
                let value = iter.next().context("--format needs a value")?;
                parsed.options = parsed.options.with_output_format(value.parse::<OutputFormat>()?);
            }
            "--best-practices" => parsed.options = parsed.options.with_best_practices(true),
            "--no-best-practices" => parsed.options = parsed.options.with_best_practices(false),
            "--examples" => parsed.options = parsed.options.with_examples(true),
            "--no-examples" => parsed.options = parsed.options.with_examples(false),
            "--save-settings" => parsed.save_settings = true,
            "-h" | "--help" => parsed.help = true,
            flag if flag.starts_with("--") => bail!("unknown option: {}", flag),
            word => words.push(word),
        }
    }

    if !words.is_empty() {
        parsed.prompt = Some(words.join(" "));
    }
    Ok(parsed)
}

/// Overlay `REFINER_*` environment variables onto persisted settings.
fn apply_env(mut settings: AppSettings) -> AppSettings {
    if let Ok(base_url) = env::var("REFINER_BASE_URL") {
        settings.base_url = base_url;
    }
    if let Some(timeout) = env::var("REFINER_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()) {
        settings.timeout_secs = timeout;
    }
    if let Some(retries) = env::var("REFINER_MAX_RETRIES").ok().and_then(|s| s.parse().ok()) {
        settings.max_retries = retries;
    }
    if let Some(delay) = env::var("REFINER_RETRY_DELAY_MS").ok().and_then(|s| s.parse().ok()) {
        settings.initial_delay_ms = delay;
    }
    if let Some(delay) = env::var("REFINER_MAX_DELAY_MS").ok().and_then(|s| s.parse().ok()) {
        settings.max_delay_ms = delay;
    }
    settings
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    if cli.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut settings = apply_env(AppSettings::load());

    if cli.save_settings {
        settings.apply_options(cli.options);
        let path = settings.save()?;
        println!("Settings saved to {}", path.display());
        return Ok(());
    }

    let client = RefineClient::from_config(settings.to_client_config())?;
    let options = cli.options.or(settings.default_options());

    let retry = client.retry_config();
    eprintln!("Prompt Refiner @ {}", client.base_url());
    eprintln!(
        "Retry: max {} retries, {}ms initial delay, {}ms cap, x{}",
        retry.max_retries,
        retry.initial_delay.as_millis(),
        retry.max_delay.as_millis(),
        retry.multiplier
    );

    // Ctrl-C abandons the request in flight, including pending retries.
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    if let Some(prompt) = cli.prompt {
        let request = PromptRequest::new(prompt, options)?;
        let response = client.send_with_cancel(&request, &cancel).await?;
        print_response(&response);
        return Ok(());
    }

    eprintln!("Interactive mode. Type a prompt and press Enter.");
    eprintln!("Type 'quit' or 'exit' (or press Ctrl-C) to exit.\n");

    run_interactive(BufReader::new(tokio::io::stdin()), &client, options, &cancel).await?;

    if cancel.is_cancelled() {
        // The stdin read runs on a blocking thread that cannot be aborted, so
        // runtime shutdown would wait for another line of input.
        std::process::exit(130);
    }
    Ok(())
}

/// Read prompts line by line until EOF, `quit`/`exit`, or cancellation.
///
/// Cancellation ends the loop both while waiting for input and while a
/// request is in flight.
async fn run_interactive<R>(
    input: R,
    client: &RefineClient,
    options: RefineOptions,
    cancel: &CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        let prompt = line.trim();

        if prompt.is_empty() {
            continue;
        }
        if prompt == "quit" || prompt == "exit" {
            break;
        }

        let request = PromptRequest::new(prompt, options)?;
        match client.send_with_cancel(&request, cancel).await {
            Ok(response) => print_response(&response),
            Err(RefineError::Cancelled { .. }) => break,
            Err(e) => eprintln!("Error: {}\n", e),
        }
    }

    println!();
    Ok(())
}

fn print_response(response: &PromptResponse) {
    println!("{}\n", response.refined_prompt);

    if !response.detected_topics.is_empty() {
        println!("Detected topics:");
        for topic in &response.detected_topics {
            println!("  - {}", topic);
        }
    }

    if let Some(references) = &response.recommended_references {
        println!("Recommended references:");
        for reference in references {
            println!("  - {}", reference);
        }
    }
}
