use cosyvoice_core::{Config, Launcher};
use std::path::PathBuf;

use super::{banner_result, check, example, menu, web_demo};

#[derive(Debug, Clone, Default)]
pub struct QuickstartArgs {
    pub check_models: bool,
    pub example: bool,
    pub web_demo: bool,
    pub model: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Run the requested launcher operations, example before web demo.
/// Returns false if any requested operation failed.
pub async fn execute(args: &QuickstartArgs, config: &Config) -> bool {
    if !(args.check_models || args.example || args.web_demo) {
        menu::execute();
        return true;
    }

    let results = check::execute(&config.models.root);
    if !results.iter().any(|r| r.available) {
        println!("\nNo models available. Please download models first.");
        return true;
    }

    let launcher = Launcher::new(config);
    let mut success = true;

    if args.example {
        success = example::execute(&launcher).await && success;
    }

    if args.web_demo {
        let port = args.port.unwrap_or(config.launcher.port);
        success = web_demo::execute(&launcher, args.model.as_deref(), port).await && success;
    }

    banner_result(success);
    success
}
