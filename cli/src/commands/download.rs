use anyhow::Result;
use cosyvoice_core::catalog::local_path;
use cosyvoice_core::install::{post_install, PipInstaller};
use cosyvoice_core::downloaders::Fetcher;
use cosyvoice_core::{
    download_batch_until, resolve_in, signal, Config, Error, ModelId, ModelSelection,
    ModelSource,
};
use std::fs;
use std::future::Future;
use std::path::PathBuf;

use super::banner;

pub struct DownloadArgs {
    pub source: ModelSource,
    pub selection: ModelSelection,
    pub install_ttsfrd: bool,
    pub models_dir: PathBuf,
}

/// Download the selected models and optionally run the ttsfrd post-install.
/// Returns whether every model was fetched.
///
/// `fetcher` is the outcome of building the registry client; a missing
/// capability stops the run before anything touches the disk.
pub async fn execute(
    args: &DownloadArgs,
    config: &Config,
    fetcher: cosyvoice_core::Result<Box<dyn Fetcher>>,
) -> Result<bool> {
    execute_until(args, config, fetcher, signal::interrupted()).await
}

/// Like [`execute`], but the batch stops once `interrupt` resolves.
pub async fn execute_until<I>(
    args: &DownloadArgs,
    config: &Config,
    fetcher: cosyvoice_core::Result<Box<dyn Fetcher>>,
    interrupt: I,
) -> Result<bool>
where
    I: Future<Output = ()>,
{
    let fetcher = match fetcher {
        Ok(fetcher) => fetcher,
        Err(e @ Error::MissingCapability { .. }) => {
            println!("Error: {}", e);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    fs::create_dir_all(&args.models_dir)?;

    if let ModelSelection::Only(ids) = &args.selection {
        let names: Vec<_> = ids.iter().map(|id| id.as_str()).collect();
        println!("Downloading selected models: {}", names.join(", "));
    }

    let entries = args
        .selection
        .select(resolve_in(args.source, &args.models_dir));
    tracing::info!(
        source = %args.source,
        models = entries.len(),
        root = %args.models_dir.display(),
        "starting download batch"
    );
    let result = download_batch_until(&entries, fetcher.as_ref(), interrupt).await;

    if result.interrupted {
        println!("\nDownload stopped by user before the batch completed.");
        return Ok(false);
    }

    if !result.is_success() {
        if result.not_attempted() > 0 {
            println!(
                "\n{} model(s) were not attempted.",
                result.not_attempted()
            );
        }
        println!("\nError: Some models failed to download.");
        return Ok(false);
    }

    if args.install_ttsfrd {
        banner("Installing ttsfrd package...");
        let installer = PipInstaller::new(config.installer.program.clone());
        let ttsfrd_dir = local_path(&args.models_dir, ModelId::Ttsfrd);
        match post_install(&ttsfrd_dir, &installer) {
            Ok(report) => {
                if !report.fallback_frontend {
                    println!("✓ Successfully installed ttsfrd package");
                }
            }
            Err(Error::ModelDirMissing(dir)) => {
                println!("Error: {} directory not found.", dir.display());
                println!("Please download CosyVoice-ttsfrd first.");
            }
            Err(e) => println!("✗ {}", e),
        }
    }

    print_next_steps(&args.models_dir);
    Ok(true)
}

fn print_next_steps(models_dir: &std::path::Path) {
    banner("Model download completed!");
    println!("\nNext steps:");
    println!("\n1. Check which models are available:");
    println!("   cosyvoice-quickstart --check-models");
    println!("\n2. Run basic example (recommended):");
    println!("   cosyvoice-quickstart --example");
    println!("\n3. Start web demo for interactive testing:");
    println!("   cosyvoice-quickstart --web-demo");
    println!(
        "   # or directly: python webui.py --port 50000 --model_dir {}",
        local_path(models_dir, ModelId::CosyVoice3).display()
    );
    println!("\n4. (Optional) Install ttsfrd for better text normalization:");
    println!("   cosyvoice-download --install-ttsfrd");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cosyvoice_core::downloaders::FetchReport;
    use cosyvoice_core::install::RESOURCE_ARCHIVE;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Populates each model dir; the ttsfrd bundle gets a broken archive.
    #[derive(Default)]
    struct FakeRegistry {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for FakeRegistry {
        fn source(&self) -> ModelSource {
            ModelSource::ModelScope
        }

        async fn fetch(
            &self,
            registry_id: &str,
            local_dir: &Path,
        ) -> cosyvoice_core::Result<FetchReport> {
            self.calls.lock().unwrap().push(registry_id.to_string());
            if self.fail_on == Some(registry_id) {
                return Err(Error::TransferFailure {
                    model: registry_id.to_string(),
                    reason: "timed out".to_string(),
                });
            }
            fs::create_dir_all(local_dir)?;
            fs::write(local_dir.join("config.json"), "{}")?;
            if registry_id.ends_with("ttsfrd") {
                fs::write(local_dir.join(RESOURCE_ARCHIVE), b"not a zip")?;
            }
            Ok(FetchReport::default())
        }
    }

    fn args_in(root: &Path, selection: ModelSelection, install_ttsfrd: bool) -> DownloadArgs {
        DownloadArgs {
            source: ModelSource::ModelScope,
            selection,
            install_ttsfrd,
            models_dir: root.join("pretrained_models"),
        }
    }

    #[tokio::test]
    async fn missing_capability_stops_before_any_work() {
        let tmp = TempDir::new().unwrap();
        let args = args_in(tmp.path(), ModelSelection::All, false);
        let fetcher = Err(Error::MissingCapability {
            capability: "ModelScope client".to_string(),
            remedy: "install it".to_string(),
        });

        let ok = execute(&args, &Config::default(), fetcher).await.unwrap();
        assert!(!ok);
        assert!(!args.models_dir.exists());
    }

    #[tokio::test]
    async fn full_batch_succeeds() {
        let tmp = TempDir::new().unwrap();
        let args = args_in(tmp.path(), ModelSelection::All, false);

        let ok = execute(&args, &Config::default(), Ok(Box::new(FakeRegistry::default())))
            .await
            .unwrap();
        assert!(ok);
        assert!(cosyvoice_core::is_available(&local_path(&args.models_dir, ModelId::CosyVoice300M)));
    }

    #[tokio::test]
    async fn failed_entry_fails_the_run() {
        let tmp = TempDir::new().unwrap();
        let args = args_in(tmp.path(), ModelSelection::All, true);
        let registry = FakeRegistry {
            fail_on: Some("iic/CosyVoice2-0.5B"),
            ..Default::default()
        };

        let ok = execute(&args, &Config::default(), Ok(Box::new(registry)))
            .await
            .unwrap();
        assert!(!ok);
        assert!(!local_path(&args.models_dir, ModelId::CosyVoice300M).exists());
    }

    #[tokio::test]
    async fn interrupted_batch_fails_without_post_install() {
        let tmp = TempDir::new().unwrap();
        let args = args_in(
            tmp.path(),
            ModelSelection::Only(vec![ModelId::Ttsfrd]),
            true,
        );

        // The interrupt has already fired, so the fetch is never started.
        let ok = execute_until(
            &args,
            &Config::default(),
            Ok(Box::new(FakeRegistry::default())),
            async {},
        )
        .await
        .unwrap();
        assert!(!ok);
        assert!(args.models_dir.exists());
        assert!(!local_path(&args.models_dir, ModelId::Ttsfrd).exists());
    }

    #[tokio::test]
    async fn post_install_failure_keeps_success() {
        let tmp = TempDir::new().unwrap();
        let args = args_in(
            tmp.path(),
            ModelSelection::Only(vec![ModelId::Ttsfrd]),
            true,
        );

        let ok = execute(&args, &Config::default(), Ok(Box::new(FakeRegistry::default())))
            .await
            .unwrap();
        assert!(ok);
        assert!(local_path(&args.models_dir, ModelId::Ttsfrd)
            .join(RESOURCE_ARCHIVE)
            .exists());
    }
}
