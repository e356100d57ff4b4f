use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::path::Path;

use super::{download_file, http_client, repo_file_path, FetchReport, Fetcher};
use crate::catalog::ModelSource;
use crate::error::{Error, Result};

const MODELSCOPE_API_BASE: &str = "https://www.modelscope.cn/api/v1";
const REVISION: &str = "master";

pub struct ModelScopeFetcher {
    client: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct MsResponse<T> {
    #[serde(rename = "Code", default)]
    code: i64,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "Data")]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MsFileList {
    #[serde(rename = "Files", default)]
    files: Vec<MsFile>,
}

#[derive(Debug, Deserialize)]
pub struct MsFile {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Size", default)]
    pub size: Option<u64>,
}

impl ModelScopeFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client("ModelScope client")?,
            api_base: MODELSCOPE_API_BASE.to_string(),
        })
    }

    /// Point the fetcher at another ModelScope-compatible endpoint.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn files_url(&self, model_id: &str) -> Result<Url> {
        let mut url = parse_url(&format!("{}/models/{}/repo/files", self.api_base, model_id))?;
        url.query_pairs_mut()
            .append_pair("Revision", REVISION)
            .append_pair("Recursive", "True");
        Ok(url)
    }

    fn file_url(&self, model_id: &str, path: &str) -> Result<Url> {
        let mut url = parse_url(&format!("{}/models/{}/repo", self.api_base, model_id))?;
        url.query_pairs_mut()
            .append_pair("Revision", REVISION)
            .append_pair("FilePath", path);
        Ok(url)
    }

    async fn list_files(&self, model_id: &str) -> Result<Vec<MsFile>> {
        let url = self.files_url(model_id)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Error::TransferFailure {
                model: model_id.to_string(),
                reason: format!("file listing returned {}", response.status()),
            });
        }

        let body: MsResponse<MsFileList> = response.json().await?;
        match body.data {
            Some(list) if body.code == 200 || body.code == 0 => Ok(list
                .files
                .into_iter()
                .filter(|f| f.kind == "blob")
                .collect()),
            _ => Err(Error::TransferFailure {
                model: model_id.to_string(),
                reason: body
                    .message
                    .unwrap_or_else(|| format!("registry returned code {}", body.code)),
            }),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Config(format!("invalid ModelScope URL {}: {}", raw, e)))
}

#[async_trait]
impl Fetcher for ModelScopeFetcher {
    fn source(&self) -> ModelSource {
        ModelSource::ModelScope
    }

    async fn fetch(&self, registry_id: &str, local_dir: &Path) -> Result<FetchReport> {
        let files = self.list_files(registry_id).await?;
        tracing::info!(repo = registry_id, files = files.len(), "fetched repo listing");

        tokio::fs::create_dir_all(local_dir).await?;

        let mut report = FetchReport::default();
        for file in &files {
            let Some(dest) = repo_file_path(local_dir, &file.path) else {
                tracing::warn!(file = %file.path, "skipping file with unsafe path");
                continue;
            };
            let url = self.file_url(registry_id, &file.path)?;
            let outcome = download_file(&self.client, url.as_str(), &dest, file.size, None)
                .await
                .map_err(|e| Error::TransferFailure {
                    model: registry_id.to_string(),
                    reason: format!("{}: {}", file.path, e),
                })?;
            report.record(outcome);
        }

        Ok(report)
    }
}
