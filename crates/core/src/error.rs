//! Error types for the model tools.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An external capability (hub client, installer, interpreter) is unusable
    #[error("{capability} is not available: {remedy}")]
    MissingCapability { capability: String, remedy: String },

    #[error("failed to download {model}: {reason}")]
    TransferFailure { model: String, reason: String },

    #[error("failed to extract {archive}: {reason}")]
    ArchiveFailure { archive: PathBuf, reason: String },

    #[error("model directory {0} does not exist")]
    ModelDirMissing(PathBuf),

    #[error("model directory '{0}' not found or invalid")]
    ModelNotFound(PathBuf),

    #[error("no suitable model found")]
    NoModelFound,

    #[error("{0} not found in current directory")]
    ScriptNotFound(PathBuf),

    #[error("{program} exited with {}", exit_label(.code))]
    ChildProcessFailure { program: String, code: Option<i32> },

    #[error("interrupted by user")]
    UserInterrupt,

    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
