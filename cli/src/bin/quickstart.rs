use anyhow::Result;
use clap::Parser;
use cosyvoice_cli::commands::quickstart::{self, QuickstartArgs};
use cosyvoice_core::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cosyvoice-quickstart")]
#[command(author, version, about = "Quick start launcher for CosyVoice", long_about = None)]
#[command(after_help = "Examples:
  # Check which models are available
  cosyvoice-quickstart --check-models

  # Run basic example
  cosyvoice-quickstart --example

  # Start web demo with default model
  cosyvoice-quickstart --web-demo

  # Start web demo with specific model
  cosyvoice-quickstart --web-demo --model pretrained_models/CosyVoice-300M-SFT

  # Start web demo on custom port
  cosyvoice-quickstart --web-demo --port 8080")]
struct Cli {
    /// Check which models are available
    #[arg(long)]
    check_models: bool,

    /// Run the basic example script
    #[arg(long)]
    example: bool,

    /// Start the web demo
    #[arg(long)]
    web_demo: bool,

    /// Model directory to use (for web demo)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Port for web demo [default: 50000]
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    cosyvoice_cli::init_logging();

    let cli = Cli::parse();
    let args = QuickstartArgs {
        check_models: cli.check_models,
        example: cli.example,
        web_demo: cli.web_demo,
        model: cli.model,
        port: cli.port,
    };

    let config = Config::load()?;
    if !quickstart::execute(&args, &config).await {
        std::process::exit(1);
    }

    Ok(())
}
