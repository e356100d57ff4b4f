use super::banner;

pub fn execute() {
    banner("CosyVoice Quick Start");
    println!("\nAvailable options:");
    println!("  1. Check available models");
    println!("  2. Run basic example");
    println!("  3. Start web demo");
    println!("\nUsage examples:");
    println!("  cosyvoice-quickstart --check-models");
    println!("  cosyvoice-quickstart --example");
    println!("  cosyvoice-quickstart --web-demo");
    println!("\nFor more options, run: cosyvoice-quickstart --help");
}
