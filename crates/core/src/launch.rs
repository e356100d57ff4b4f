//! Model selection and child-process launching for the example script and
//! the web demo.

use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::availability::is_available;
use crate::catalog::{local_path, ModelId};
use crate::config::Config;
use crate::error::{Error, Result};

/// Model the example script expects.
pub const RECOMMENDED_MODEL: ModelId = ModelId::CosyVoice3;

/// Auto-selection order for the web demo. The ttsfrd bundle is not a TTS model.
pub const WEB_DEMO_PRIORITY: [ModelId; 5] = [
    ModelId::CosyVoice3,
    ModelId::CosyVoice2,
    ModelId::CosyVoice300MSft,
    ModelId::CosyVoice300M,
    ModelId::CosyVoice300MInstruct,
];

pub fn default_priority(root: &Path) -> Vec<PathBuf> {
    WEB_DEMO_PRIORITY
        .iter()
        .map(|id| local_path(root, *id))
        .collect()
}

/// Pick the model directory to launch with.
///
/// An explicit directory is used as-is if it passes the availability check
/// and is an error otherwise; the priority list is not consulted. Without
/// one, the first available entry of `priority` wins.
pub fn select_model(explicit: Option<&Path>, priority: &[PathBuf]) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return if is_available(dir) {
            Ok(dir.to_path_buf())
        } else {
            Err(Error::ModelNotFound(dir.to_path_buf()))
        };
    }

    priority
        .iter()
        .find(|candidate| is_available(candidate))
        .cloned()
        .ok_or(Error::NoModelFound)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    /// One-shot example run
    Example,
    /// Long-running server, normally stopped with Ctrl+C
    WebDemo,
}

#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub kind: LaunchKind,
    pub program: String,
    pub args: Vec<OsString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Child exited on its own; `None` when killed by a signal
    Exited(Option<i32>),
    /// The user interrupted the wait; the child has been reaped
    Interrupted,
}

impl LaunchOutcome {
    /// An interrupted web demo is a normal stop; an interrupted example is not.
    pub fn succeeded(&self, kind: LaunchKind) -> bool {
        match self {
            LaunchOutcome::Exited(code) => *code == Some(0),
            LaunchOutcome::Interrupted => kind == LaunchKind::WebDemo,
        }
    }

    pub fn into_result(self, spec: &LaunchSpec) -> Result<()> {
        if self.succeeded(spec.kind) {
            return Ok(());
        }
        match self {
            LaunchOutcome::Exited(code) => Err(Error::ChildProcessFailure {
                program: spec.program.clone(),
                code,
            }),
            LaunchOutcome::Interrupted => Err(Error::UserInterrupt),
        }
    }
}

/// Run the child to completion.
pub async fn launch(spec: &LaunchSpec) -> Result<LaunchOutcome> {
    launch_until(spec, std::future::pending()).await
}

/// Run the child until it exits or `interrupt` resolves.
///
/// The child is killed and reaped on every path out of this function,
/// including when the returned future is dropped.
pub async fn launch_until<I>(spec: &LaunchSpec, interrupt: I) -> Result<LaunchOutcome>
where
    I: Future<Output = ()>,
{
    tracing::info!(program = %spec.program, args = ?spec.args, "spawning child process");

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| spawn_error(&spec.program, e))?;

    tokio::pin!(interrupt);
    // Ctrl+C reaches the child too; the interrupt must win if both are ready.
    let status = tokio::select! {
        biased;
        _ = &mut interrupt => None,
        status = child.wait() => Some(status),
    };

    match status {
        Some(status) => {
            let status = status?;
            tracing::info!(program = %spec.program, code = ?status.code(), "child exited");
            Ok(LaunchOutcome::Exited(status.code()))
        }
        None => {
            if let Err(e) = child.kill().await {
                tracing::warn!(program = %spec.program, error = %e, "failed to stop child");
            }
            Ok(LaunchOutcome::Interrupted)
        }
    }
}

fn spawn_error(program: &str, e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::NotFound => Error::MissingCapability {
            capability: program.to_string(),
            remedy: "install it or set [launcher] python in the config".to_string(),
        },
        _ => Error::Io(e),
    }
}

/// Builds launch specs for the example script and the web demo.
#[derive(Debug, Clone)]
pub struct Launcher {
    python: String,
    example_script: PathBuf,
    webui_script: PathBuf,
    models_root: PathBuf,
}

impl Launcher {
    pub fn new(config: &Config) -> Self {
        Self {
            python: config.launcher.python.clone(),
            example_script: config.launcher.example_script.clone(),
            webui_script: config.launcher.webui_script.clone(),
            models_root: config.models.root.clone(),
        }
    }

    pub fn recommended_model(&self) -> PathBuf {
        local_path(&self.models_root, RECOMMENDED_MODEL)
    }

    /// `<python> example.py`, once the script and the recommended model are present.
    pub fn example(&self) -> Result<LaunchSpec> {
        if !self.example_script.exists() {
            return Err(Error::ScriptNotFound(self.example_script.clone()));
        }

        let recommended = self.recommended_model();
        if !is_available(&recommended) {
            return Err(Error::ModelNotFound(recommended));
        }

        Ok(LaunchSpec {
            kind: LaunchKind::Example,
            program: self.python.clone(),
            args: vec![self.example_script.clone().into_os_string()],
        })
    }

    /// `<python> webui.py --port <port> --model_dir <dir>` plus the chosen directory.
    pub fn web_demo(&self, model: Option<&Path>, port: u16) -> Result<(LaunchSpec, PathBuf)> {
        if !self.webui_script.exists() {
            return Err(Error::ScriptNotFound(self.webui_script.clone()));
        }

        let model_dir = select_model(model, &default_priority(&self.models_root))?;

        let spec = LaunchSpec {
            kind: LaunchKind::WebDemo,
            program: self.python.clone(),
            args: vec![
                self.webui_script.clone().into_os_string(),
                "--port".into(),
                port.to_string().into(),
                "--model_dir".into(),
                model_dir.clone().into_os_string(),
            ],
        };
        Ok((spec, model_dir))
    }
}
