use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{Parser, ValueEnum};
use cosyvoice_cli::commands::download::{self, DownloadArgs};
use cosyvoice_core::{downloaders, Config, ModelId, ModelSelection, ModelSource};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cosyvoice-download")]
#[command(author, version, about = "Download CosyVoice pretrained models", long_about = None)]
#[command(after_help = "Examples:
  # Download using ModelScope (recommended for users in China)
  cosyvoice-download --source modelscope

  # Download using HuggingFace (recommended for overseas users)
  cosyvoice-download --source huggingface

  # Download specific models only
  cosyvoice-download --source huggingface --models cosyvoice3 cosyvoice2

  # Install ttsfrd package after download
  cosyvoice-download --install-ttsfrd")]
struct Cli {
    /// Download source: modelscope (China) or huggingface (overseas) [default: modelscope]
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    /// Models to download
    #[arg(long, num_args = 1.., default_value = "all", value_parser = model_choices())]
    models: Vec<String>,

    /// Install ttsfrd package for better text normalization (optional)
    #[arg(long)]
    install_ttsfrd: bool,

    /// Directory to download models into [default: pretrained_models]
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Modelscope,
    Huggingface,
}

impl From<SourceArg> for ModelSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Modelscope => ModelSource::ModelScope,
            SourceArg::Huggingface => ModelSource::HuggingFace,
        }
    }
}

fn model_choices() -> PossibleValuesParser {
    let mut names: Vec<&'static str> = ModelId::ALL.iter().map(|id| id.as_str()).collect();
    names.push("all");
    PossibleValuesParser::new(names)
}

#[tokio::main]
async fn main() -> Result<()> {
    cosyvoice_cli::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    let args = DownloadArgs {
        source: cli.source.map(Into::into).unwrap_or(config.models.source),
        selection: ModelSelection::from_names(&cli.models)?,
        install_ttsfrd: cli.install_ttsfrd,
        models_dir: cli.models_dir.unwrap_or_else(|| config.models.root.clone()),
    };

    let fetcher = downloaders::for_source(args.source, &config);
    if !download::execute(&args, &config, fetcher).await? {
        std::process::exit(1);
    }

    Ok(())
}
