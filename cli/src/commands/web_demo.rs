use cosyvoice_core::launch::launch_until;
use cosyvoice_core::{signal, Error, LaunchOutcome, Launcher};
use std::path::Path;

use super::{banner, DOWNLOAD_HINT};

/// Start the web demo and wait for it. Ctrl+C counts as a normal stop.
pub async fn execute(launcher: &Launcher, model: Option<&Path>, port: u16) -> bool {
    banner("Starting Web Demo");

    let (spec, model_dir) = match launcher.web_demo(model, port) {
        Ok(found) => found,
        Err(Error::NoModelFound) => {
            println!("Error: No suitable model found.");
            println!("Please download models first:");
            println!("{}", DOWNLOAD_HINT);
            return false;
        }
        Err(e) => {
            println!("Error: {}", e);
            return false;
        }
    };

    if model.is_none() {
        println!("Found model: {}", model_dir.display());
    }
    println!("\nStarting web demo with model: {}", model_dir.display());
    println!("Server will be available at: http://localhost:{}", port);
    println!("Press Ctrl+C to stop the server.\n");

    let outcome = match launch_until(&spec, signal::interrupted()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("\n✗ Web demo failed with error: {}", e);
            return false;
        }
    };

    match outcome.into_result(&spec) {
        Ok(()) if outcome == LaunchOutcome::Interrupted => {
            println!("\n\nWeb demo stopped by user.");
            true
        }
        Ok(()) => true,
        Err(e) => {
            println!("\n✗ Web demo failed with error: {}", e);
            false
        }
    }
}
