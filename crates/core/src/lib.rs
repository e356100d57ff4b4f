//! cosyvoice_core - Core library for the CosyVoice model tools
//!
//! This crate provides:
//! - The static model catalog for the ModelScope and HuggingFace registries
//! - Snapshot downloads and the sequential download batch
//! - Local availability checks, model selection and child-process launching
//! - The optional ttsfrd post-install step

pub mod availability;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod downloaders;
pub mod error;
pub mod install;
pub mod launch;
pub mod signal;

pub use availability::{is_available, AvailabilityResult};
pub use batch::{download_batch, download_batch_until, BatchResult};
pub use catalog::{resolve, resolve_in, ModelEntry, ModelId, ModelSelection, ModelSource};
pub use config::Config;
pub use error::{Error, Result};
pub use launch::{select_model, LaunchKind, LaunchOutcome, LaunchSpec, Launcher};
