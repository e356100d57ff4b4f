use async_trait::async_trait;
use hf_hub::api::tokio::{Api, ApiBuilder};
use reqwest::Client;
use std::path::Path;

use super::{download_file, http_client, repo_file_path, FetchReport, Fetcher};
use crate::catalog::ModelSource;
use crate::error::{Error, Result};

const CAPABILITY: &str = "HuggingFace hub client";

/// Mirrors a HuggingFace model repo into a plain directory.
///
/// The repo listing comes from the hub API; files are streamed straight
/// into the target directory rather than the hub's own cache layout.
pub struct HuggingFaceFetcher {
    api: Api,
    client: Client,
    token: Option<String>,
}

impl HuggingFaceFetcher {
    pub fn new(token: Option<String>) -> Result<Self> {
        let api = ApiBuilder::new()
            .with_token(token.clone())
            .with_progress(false)
            .build()
            .map_err(|e| Error::MissingCapability {
                capability: CAPABILITY.to_string(),
                remedy: format!("check HF_HOME and network settings ({})", e),
            })?;

        Ok(Self {
            api,
            client: http_client(CAPABILITY)?,
            token,
        })
    }
}

#[async_trait]
impl Fetcher for HuggingFaceFetcher {
    fn source(&self) -> ModelSource {
        ModelSource::HuggingFace
    }

    async fn fetch(&self, registry_id: &str, local_dir: &Path) -> Result<FetchReport> {
        let repo = self.api.model(registry_id.to_string());
        let info = repo.info().await.map_err(|e| Error::TransferFailure {
            model: registry_id.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            repo = registry_id,
            files = info.siblings.len(),
            "fetched repo listing"
        );

        tokio::fs::create_dir_all(local_dir).await?;

        let mut report = FetchReport::default();
        for sibling in &info.siblings {
            let Some(dest) = repo_file_path(local_dir, &sibling.rfilename) else {
                tracing::warn!(file = %sibling.rfilename, "skipping file with unsafe path");
                continue;
            };
            let url = repo.url(&sibling.rfilename);
            let outcome = download_file(&self.client, &url, &dest, None, self.token.as_deref())
                .await
                .map_err(|e| Error::TransferFailure {
                    model: registry_id.to_string(),
                    reason: format!("{}: {}", sibling.rfilename, e),
                })?;
            report.record(outcome);
        }

        Ok(report)
    }
}
