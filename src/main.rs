//! NLP Agent - Entry Point
//!
//! Reads change requests from the terminal, extracts move commands through
//! the hosted NLP models and applies them to an in-memory element model.

use nlp_agent::command::{reply, CommandExtractor, ElementModel, ElementSink};
use nlp_agent::core::config::{ExtractorConfig, DEFAULT_CONFIG_PATH};
use nlp_agent::core::error::Result;
use nlp_agent::nlp::InferenceClient;

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Turn natural language change requests into element move commands
#[derive(Parser, Debug)]
#[command(name = "nlp-agent")]
#[command(about = "Extract and apply element move commands from natural language")]
struct Args {
    /// Extractor configuration file (defaults to data/extractor.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print extracted commands as JSON
    #[arg(long)]
    json: bool,

    /// Process a single instruction and exit
    #[arg(long)]
    once: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nlp_agent=info")),
        )
        .init();

    let config = load_config(args.config.as_deref())?;

    // Create the async runtime for inference calls
    let rt = Runtime::new()?;

    let client = InferenceClient::from_env()?;
    let mut model = ElementModel::from_seeds(&config.elements)
        .with_generic_kind(config.generic_element.clone());
    let extractor = CommandExtractor::new(config, client)?;

    tracing::info!(elements = model.len(), "NLP agent ready");

    if let Some(text) = args.once {
        return handle_instruction(&rt, &extractor, &mut model, &text, args.json);
    }

    println!("\n=== NLP AGENT ===");
    println!("Describe how an element should move, e.g. \"lower beam B125 by 0.2 m\"");
    println!();
    println!("Commands:");
    println!("  status / s      - List elements and positions");
    println!("  quit / q        - Exit");
    println!("  <any text>      - Change request");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "status" || input == "s" {
            display_status(&model);
            continue;
        }

        handle_instruction(&rt, &extractor, &mut model, input, args.json)?;
    }

    println!("Goodbye.");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ExtractorConfig> {
    match path {
        Some(path) => ExtractorConfig::load(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            ExtractorConfig::load(Path::new(DEFAULT_CONFIG_PATH))
        }
        None => {
            tracing::warn!("No configuration file found - using built-in defaults");
            Ok(ExtractorConfig::default())
        }
    }
}

fn handle_instruction(
    rt: &Runtime,
    extractor: &CommandExtractor<InferenceClient>,
    model: &mut ElementModel,
    input: &str,
    json: bool,
) -> Result<()> {
    match rt.block_on(extractor.extract(input)) {
        Ok(command) => {
            println!("{}", reply::success(&command));
            if json {
                println!("{}", serde_json::to_string_pretty(&command)?);
            }

            match model.move_element(&command) {
                Ok(ack) => println!(
                    "Moved {} by {:+.3} m along {} -> ({:.3}, {:.3}, {:.3}) [receipt {}]",
                    ack.target_id,
                    ack.offset,
                    command.axis(),
                    ack.position[0],
                    ack.position[1],
                    ack.position[2],
                    ack.receipt
                ),
                Err(e) => println!("Could not execute command: {}", e),
            }
        }
        Err(rejection) => {
            println!("{}", reply::rejection(&rejection));
            if rejection.reason.is_transient() {
                println!("(The failure was temporary - the same request can be retried.)");
            }
        }
    }
    println!();
    Ok(())
}

fn display_status(model: &ElementModel) {
    if model.is_empty() {
        println!("No elements loaded.");
        return;
    }

    println!("{:<8} {:<8} {:>9} {:>9} {:>9}", "ID", "KIND", "X", "Y", "Z");
    for element in model.elements() {
        println!(
            "{:<8} {:<8} {:>9.3} {:>9.3} {:>9.3}",
            element.id, element.kind, element.position[0], element.position[1], element.position[2]
        );
    }
    println!();
}
