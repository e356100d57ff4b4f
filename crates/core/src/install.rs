//! Post-install step for the ttsfrd text frontend bundle.
//!
//! Unpacks the resource archive shipped inside the model directory and hands
//! the bundled wheels to an external package installer. Only a missing model
//! directory or a broken archive stops the step. Installer results are
//! logged and otherwise ignored.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

pub const RESOURCE_ARCHIVE: &str = "resource.zip";
pub const DEPENDENCY_WHEEL: &str = "ttsfrd_dependency-0.1-py3-none-any.whl";
pub const TTSFRD_WHEEL: &str = "ttsfrd-0.4.2-cp310-cp310-linux_x86_64.whl";

/// Something that can install a package file into the current environment.
pub trait PackageInstaller {
    fn install(&self, package: &Path) -> Result<()>;
}

/// Runs `<program> install <package>`.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    program: String,
}

impl PipInstaller {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PackageInstaller for PipInstaller {
    fn install(&self, package: &Path) -> Result<()> {
        let status = Command::new(&self.program)
            .arg("install")
            .arg(package)
            .status()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::MissingCapability {
                    capability: self.program.clone(),
                    remedy: "install pip or set [installer] program in the config".to_string(),
                },
                _ => Error::Io(e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ChildProcessFailure {
                program: self.program.clone(),
                code: status.code(),
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct PostInstallReport {
    /// Entries unpacked from the resource archive, if it was present
    pub extracted: Option<usize>,
    /// Packages handed to the installer, in order
    pub installed: Vec<PathBuf>,
    /// The ttsfrd wheel was missing, so the WeText frontend stays in use
    pub fallback_frontend: bool,
}

/// Run the post-install step against `model_dir`.
pub fn post_install<I>(model_dir: &Path, installer: &I) -> Result<PostInstallReport>
where
    I: PackageInstaller + ?Sized,
{
    if !model_dir.is_dir() {
        return Err(Error::ModelDirMissing(model_dir.to_path_buf()));
    }

    let mut report = PostInstallReport::default();

    let archive = model_dir.join(RESOURCE_ARCHIVE);
    if archive.exists() {
        println!("\nUnzipping {}...", RESOURCE_ARCHIVE);
        let count = extract_zip(&archive, model_dir)?;
        println!("✓ Successfully unzipped {}", RESOURCE_ARCHIVE);
        report.extracted = Some(count);
    } else {
        println!("Warning: {} not found, skipping unzip step.", RESOURCE_ARCHIVE);
    }

    let dependency = model_dir.join(DEPENDENCY_WHEEL);
    if dependency.exists() {
        println!("\nInstalling {}...", DEPENDENCY_WHEEL);
        run_installer(installer, &dependency);
        report.installed.push(dependency);
    } else {
        println!("Warning: {} not found, skipping installation.", DEPENDENCY_WHEEL);
    }

    let wheel = model_dir.join(TTSFRD_WHEEL);
    if wheel.exists() {
        println!("\nInstalling {}...", TTSFRD_WHEEL);
        run_installer(installer, &wheel);
        report.installed.push(wheel);
    } else {
        println!("Warning: {} not found.", TTSFRD_WHEEL);
        println!(
            "Note: ttsfrd installation is optional. WeText will be used by default if ttsfrd is not available."
        );
        report.fallback_frontend = true;
    }

    Ok(report)
}

fn run_installer<I>(installer: &I, package: &Path)
where
    I: PackageInstaller + ?Sized,
{
    if let Err(e) = installer.install(package) {
        tracing::warn!(package = %package.display(), error = %e, "package installer reported an error");
    }
}

/// Extract a zip archive into `dest`, returning the number of entries written.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize> {
    let fail = |reason: String| Error::ArchiveFailure {
        archive: archive_path.to_path_buf(),
        reason,
    };

    let file = File::open(archive_path).map_err(|e| fail(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| fail(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(fail(format!("entry '{}' escapes the target directory", entry.name())));
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| fail(e.to_string()))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| fail(e.to_string()))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| fail(e.to_string()))?;
        written += 1;
    }

    tracing::debug!(archive = %archive_path.display(), written, "archive extracted");
    Ok(written)
}
