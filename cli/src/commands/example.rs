use cosyvoice_core::launch::launch_until;
use cosyvoice_core::{signal, Error, LaunchOutcome, Launcher};

use super::{banner, DOWNLOAD_HINT};

/// Run the example script. Returns whether it completed.
pub async fn execute(launcher: &Launcher) -> bool {
    banner("Running Basic Usage Example");

    let spec = match launcher.example() {
        Ok(spec) => spec,
        Err(Error::ModelNotFound(dir)) => {
            println!("Warning: Recommended model '{}' not found.", dir.display());
            println!("Please download models first:");
            println!("{}", DOWNLOAD_HINT);
            return false;
        }
        Err(e) => {
            println!("Error: {}", e);
            return false;
        }
    };

    println!("\nRunning example...");
    println!("This will demonstrate CosyVoice3 usage (recommended).");
    println!("\nNote: Generated audio files will be saved in the current directory.");
    println!("Press Ctrl+C to stop at any time.\n");

    let outcome = match launch_until(&spec, signal::interrupted()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("\n✗ Example failed with error: {}", e);
            return false;
        }
    };

    match outcome.into_result(&spec) {
        Ok(()) => {
            println!("\n✓ Example completed successfully!");
            println!("Check the generated .wav files in the current directory.");
            true
        }
        Err(_) if outcome == LaunchOutcome::Interrupted => {
            println!("\n\nExample interrupted by user.");
            false
        }
        Err(e) => {
            println!("\n✗ Example failed with error: {}", e);
            false
        }
    }
}
