use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::catalog::{ModelSource, DEFAULT_MODELS_ROOT};
use crate::error::{Error, Result};

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "COSYVOICE_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model storage and download settings
    #[serde(default)]
    pub models: ModelsConfig,

    /// Example / web demo launcher settings
    #[serde(default)]
    pub launcher: LauncherConfig,

    /// External package installer
    #[serde(default)]
    pub installer: InstallerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Directory holding one subdirectory per model (default: ./pretrained_models)
    #[serde(default = "default_models_root")]
    pub root: PathBuf,

    /// Registry used when --source is not given
    #[serde(default)]
    pub source: ModelSource,

    /// HuggingFace token for gated repos (falls back to HF_TOKEN)
    #[serde(default)]
    pub hf_token: Option<String>,

    /// ModelScope API base, e.g. a mirror (default: https://www.modelscope.cn/api/v1)
    #[serde(default)]
    pub modelscope_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Interpreter used to run the example and web demo scripts
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_example_script")]
    pub example_script: PathBuf,

    #[serde(default = "default_webui_script")]
    pub webui_script: PathBuf,

    /// Web demo port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// Program invoked as `<program> install <wheel>`
    #[serde(default = "default_installer")]
    pub program: String,
}

fn default_models_root() -> PathBuf {
    PathBuf::from(DEFAULT_MODELS_ROOT)
}

fn default_python() -> String {
    if cfg!(windows) {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

fn default_example_script() -> PathBuf {
    PathBuf::from("example.py")
}

fn default_webui_script() -> PathBuf {
    PathBuf::from("webui.py")
}

fn default_port() -> u16 {
    50000
}

fn default_installer() -> String {
    "pip".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            root: default_models_root(),
            source: ModelSource::default(),
            hf_token: None,
            modelscope_endpoint: None,
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            example_script: default_example_script(),
            webui_script: default_webui_script(),
            port: default_port(),
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            program: default_installer(),
        }
    }
}

impl ModelsConfig {
    /// Configured token, else the HF_TOKEN environment variable.
    pub fn hf_token(&self) -> Option<String> {
        self.hf_token
            .clone()
            .or_else(|| std::env::var("HF_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }
}

impl Config {
    /// Get the base directory: ~/.config/cosyvoice/
    pub fn base_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("USERPROFILE").map(PathBuf::from))
            .map_err(|_| Error::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".config").join("cosyvoice"))
    }

    /// Config file path: $COSYVOICE_CONFIG, else ~/.config/cosyvoice/config.toml
    pub fn config_path() -> Result<PathBuf> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Ok(Self::base_dir()?.join("config.toml")),
        }
    }

    /// Load config from the default location, or defaults if there is none.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}
