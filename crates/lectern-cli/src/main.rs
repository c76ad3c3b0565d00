//! Lectern CLI - AI-assisted literature review over a Zotero library.

use clap::Parser;
use lectern_cli::commands;
use lectern_cli::{Cli, Command, Config, Formatter, Pipeline};
use lectern_llm::RoutedProvider;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> lectern_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let config = Config::load(Some(&config_path))?;

    let formatter = Formatter::new(!cli.no_color && config.settings.color);

    if let Command::Config(args) = cli.command {
        return commands::execute_config(args, &config, &config_path, &formatter);
    }

    config.validate()?;
    let provider = Arc::new(RoutedProvider::new(&config.chat_completion, &config.messages));

    match cli.command {
        Command::Analyze(args) => {
            let model = config.model(args.model.as_deref()).to_string();
            config.validate_model(&model)?;
            let pipeline = Pipeline::new(&config, provider, &model)?;
            commands::execute_analyze(args, &pipeline, &config, &formatter).await?;
        }
        Command::Watch(args) => {
            let model = config.model(args.model.as_deref()).to_string();
            config.validate_model(&model)?;
            let pipeline = Pipeline::new(&config, provider, &model)?;
            commands::execute_watch(args, &pipeline, &config, &formatter).await?;
        }
        Command::Save(args) => {
            let model = config.model(None).to_string();
            let pipeline = Pipeline::new(&config, provider, &model)?;
            commands::execute_save(args, &pipeline, &formatter).await?;
        }
        Command::Chat(args) => {
            commands::execute_chat(args, provider, &config, &formatter).await?;
        }
        Command::Config(_) => {}
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins unless `-v` is given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
