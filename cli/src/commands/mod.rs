pub mod check;
pub mod download;
pub mod example;
pub mod menu;
pub mod quickstart;
pub mod web_demo;

pub(crate) fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

pub(crate) const DOWNLOAD_HINT: &str = "  cosyvoice-download --source huggingface";

/// Closing summary for a launcher run.
pub(crate) fn banner_result(success: bool) {
    if success {
        banner("All operations completed successfully!");
    } else {
        banner("Some operations failed. Please check the errors above.");
    }
}
