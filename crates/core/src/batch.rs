//! Sequential download of a batch of catalog entries.
//!
//! Entries are fetched one at a time in the order given. The first failure
//! stops the batch; entries after it are left untouched and count as not
//! attempted rather than failed.

use std::collections::BTreeSet;
use std::future::Future;

use crate::catalog::{ModelEntry, ModelId};
use crate::downloaders::Fetcher;
use crate::error::Error;

#[derive(Debug, Default)]
pub struct BatchResult {
    /// Entries a fetch was started for, in order
    pub attempted: Vec<ModelEntry>,
    pub succeeded: BTreeSet<ModelId>,
    pub failed: BTreeSet<ModelId>,
    /// Set when the user interrupted a pending fetch
    pub interrupted: bool,
    /// Why the batch stopped early, if it did because of a failure
    pub error: Option<Error>,
    total: usize,
}

impl BatchResult {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// True iff every entry in the batch was fetched.
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.failed.is_empty() && self.succeeded.len() == self.total
    }

    /// Number of entries the batch was asked to fetch.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Entries never started because the batch stopped early.
    pub fn not_attempted(&self) -> usize {
        self.total - self.attempted.len()
    }
}

/// Fetch every entry, stopping at the first failure.
pub async fn download_batch<F>(entries: &[ModelEntry], fetcher: &F) -> BatchResult
where
    F: Fetcher + ?Sized,
{
    download_batch_until(entries, fetcher, std::future::pending()).await
}

/// Like [`download_batch`], but gives up cleanly once `interrupt` resolves.
pub async fn download_batch_until<F, I>(
    entries: &[ModelEntry],
    fetcher: &F,
    interrupt: I,
) -> BatchResult
where
    F: Fetcher + ?Sized,
    I: Future<Output = ()>,
{
    let mut result = BatchResult::new(entries.len());
    tokio::pin!(interrupt);

    println!("Downloading models using {}...", fetcher.source());

    for entry in entries {
        println!(
            "\nDownloading {} to {}...",
            entry.registry_id,
            entry.local_path.display()
        );
        result.attempted.push(entry.clone());

        let outcome = tokio::select! {
            biased;
            _ = &mut interrupt => None,
            res = fetcher.fetch(entry.registry_id, &entry.local_path) => Some(res),
        };

        match outcome {
            Some(Ok(report)) => {
                tracing::info!(
                    model = %entry.id,
                    downloaded = report.downloaded,
                    skipped = report.skipped,
                    bytes = report.bytes,
                    "model fetched"
                );
                println!("✓ Successfully downloaded {}", entry.registry_id);
                result.succeeded.insert(entry.id);
            }
            Some(Err(e)) => {
                println!("✗ Failed to download {}: {}", entry.registry_id, e);
                tracing::warn!(
                    model = %entry.id,
                    remaining = entries.len() - result.attempted.len(),
                    "aborting batch after failed download"
                );
                result.failed.insert(entry.id);
                result.error = Some(e);
                break;
            }
            None => {
                println!("\nDownload of {} interrupted by user.", entry.registry_id);
                result.interrupted = true;
                break;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{resolve_in, ModelSource};
    use crate::downloaders::FetchReport;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// Records calls and fails for one registry id.
    struct ScriptedFetcher {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                fail_on,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        fn source(&self) -> ModelSource {
            ModelSource::ModelScope
        }

        async fn fetch(&self, registry_id: &str, _local_dir: &Path) -> Result<FetchReport> {
            self.calls.lock().unwrap().push(registry_id.to_string());
            if self.fail_on == Some(registry_id) {
                return Err(Error::TransferFailure {
                    model: registry_id.to_string(),
                    reason: "connection reset".to_string(),
                });
            }
            Ok(FetchReport::default())
        }
    }

    fn three_entries() -> Vec<ModelEntry> {
        resolve_in(ModelSource::ModelScope, Path::new("models"))
            .into_iter()
            .take(3)
            .collect()
    }

    #[tokio::test]
    async fn all_succeed() {
        let entries = three_entries();
        let fetcher = ScriptedFetcher::new(None);
        let result = download_batch(&entries, &fetcher).await;
        assert!(result.is_success());
        assert_eq!(result.succeeded.len(), 3);
        assert_eq!(result.not_attempted(), 0);
        assert_eq!(fetcher.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failure_aborts_remaining_entries() {
        let entries = three_entries();
        let fetcher = ScriptedFetcher::new(Some(entries[1].registry_id));
        let result = download_batch(&entries, &fetcher).await;

        assert!(!result.is_success());
        assert_eq!(result.succeeded, BTreeSet::from([entries[0].id]));
        assert_eq!(result.failed, BTreeSet::from([entries[1].id]));
        assert!(!result.succeeded.contains(&entries[2].id));
        assert!(!result.failed.contains(&entries[2].id));
        assert_eq!(result.attempted.len(), 2);
        assert_eq!(result.not_attempted(), 1);
        assert!(matches!(result.error, Some(Error::TransferFailure { .. })));
        assert_eq!(fetcher.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn interrupt_stops_cleanly() {
        struct Hanging;

        #[async_trait]
        impl Fetcher for Hanging {
            fn source(&self) -> ModelSource {
                ModelSource::HuggingFace
            }

            async fn fetch(&self, _registry_id: &str, _local_dir: &Path) -> Result<FetchReport> {
                std::future::pending().await
            }
        }

        let entries = three_entries();
        let result = download_batch_until(&entries, &Hanging, async {}).await;
        assert!(result.interrupted);
        assert!(!result.is_success());
        assert!(result.failed.is_empty());
        assert!(result.succeeded.is_empty());
        assert_eq!(result.attempted.len(), 1);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn interrupt_wins_over_a_ready_fetch() {
        let entries = three_entries();
        let fetcher = ScriptedFetcher::new(None);
        let result = download_batch_until(&entries, &fetcher, async {}).await;
        assert!(result.interrupted);
        assert!(result.succeeded.is_empty());
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_trivially_successful() {
        let fetcher = ScriptedFetcher::new(None);
        let result = download_batch(&[], &fetcher).await;
        assert!(result.is_success());
        assert_eq!(result.total(), 0);
    }
}
