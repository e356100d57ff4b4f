use cosyvoice_core::availability::scan;
use cosyvoice_core::{resolve_in, AvailabilityResult, ModelSource};
use std::path::Path;

use super::{banner, DOWNLOAD_HINT};

/// Print the availability table for every catalog model under `root`.
pub fn execute(root: &Path) -> Vec<AvailabilityResult> {
    banner("Checking Available Models");

    // Local paths are the same for both registries.
    let results = scan(&resolve_in(ModelSource::default(), root));

    println!("\nModel Status:");
    println!("{}", "-".repeat(60));
    for result in &results {
        if result.available {
            println!("✓ {:<30} [Available]", result.name);
        } else {
            println!("✗ {:<30} [Missing]", result.name);
        }
    }
    println!("{}", "-".repeat(60));

    let available = results.iter().filter(|r| r.available).count();
    println!("\nAvailable: {}/{}", available, results.len());

    if available < results.len() {
        println!("\nMissing models. Download them with:");
        println!("{}", DOWNLOAD_HINT);
    }

    results
}
