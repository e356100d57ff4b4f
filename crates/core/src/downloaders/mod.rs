pub mod huggingface;
pub mod modelscope;

use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::catalog::ModelSource;
use crate::config::Config;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("cosyvoice-tools/", env!("CARGO_PKG_VERSION"));

/// Snapshot download of one remote repository into a local directory.
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn source(&self) -> ModelSource;

    async fn fetch(&self, registry_id: &str, local_dir: &Path) -> Result<FetchReport>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub bytes: u64,
}

impl FetchReport {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Downloaded(bytes) => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            FileOutcome::Skipped => self.skipped += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Downloaded(u64),
    Skipped,
}

pub use huggingface::HuggingFaceFetcher;
pub use modelscope::ModelScopeFetcher;

/// Build the fetcher for `source`.
pub fn for_source(source: ModelSource, config: &Config) -> Result<Box<dyn Fetcher>> {
    let fetcher: Box<dyn Fetcher> = match source {
        ModelSource::ModelScope => {
            let mut fetcher = ModelScopeFetcher::new()?;
            if let Some(endpoint) = &config.models.modelscope_endpoint {
                fetcher = fetcher.with_api_base(endpoint.as_str());
            }
            Box::new(fetcher)
        }
        ModelSource::HuggingFace => Box::new(HuggingFaceFetcher::new(config.models.hf_token())?),
    };
    Ok(fetcher)
}

pub(crate) fn http_client(capability: &str) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::MissingCapability {
            capability: capability.to_string(),
            remedy: format!("could not initialise the HTTP client ({})", e),
        })
}

/// Join a repository-relative file name onto `dir`, refusing anything that
/// would escape it.
pub(crate) fn repo_file_path(dir: &Path, name: &str) -> Option<PathBuf> {
    let rel = Path::new(name);
    let clean = rel
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if name.is_empty() || !clean {
        return None;
    }
    Some(dir.join(rel))
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Stream `url` into `dest` through a `.part` file.
///
/// An existing `dest` is kept when its size matches `expected_size`, or when
/// the remote size is unknown.
pub(crate) async fn download_file(
    client: &Client,
    url: &str,
    dest: &Path,
    expected_size: Option<u64>,
    token: Option<&str>,
) -> Result<FileOutcome> {
    if let Ok(meta) = fs::metadata(dest).await {
        if meta.is_file() && expected_size.map_or(true, |size| size == meta.len()) {
            tracing::debug!(file = %dest.display(), "already present, skipping");
            return Ok(FileOutcome::Skipped);
        }
    }

    let mut request = client.get(url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?.error_for_status()?;
    let total_size = response.content_length().or(expected_size).unwrap_or(0);

    let label = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(label.clone());

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }

    let part = part_path(dest);
    let mut file = File::create(&part).await?;
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush().await?;
    drop(file);
    fs::rename(&part, dest).await?;

    pb.finish_with_message(format!("Downloaded {}", label));
    Ok(FileOutcome::Downloaded(downloaded))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer every request with the same status line and body.
    pub(crate) async fn serve_fixed(status: &'static str, body: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        addr
    }
}
