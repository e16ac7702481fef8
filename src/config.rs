//! Run configuration.
//!
//! A publish run is driven by an immutable [`RunConfig`]. It is assembled
//! from two layers, later layers overriding earlier ones key by key:
//!
//! 1. An optional settings file (`galerie.toml`)
//! 2. Command-line flags
//!
//! ## Settings File
//!
//! ```toml
//! # All keys are optional; command-line flags override them.
//!
//! title = "Summer 2024"          # Gallery title shown by the viewer
//! source = "pictures"            # Folder with the source pictures (not recursive)
//! target = "publish/current"     # Output tree, rewritten on every run
//! reference = "publish/previous" # Previous output, baseline for the delta tree
//! delta = "publish/delta"        # Receives only files that differ from `reference`
//! assets_dir = "viewer"          # Replaces bundled viewer files by name
//! ```
//!
//! Relative paths are resolved against the directory containing the file.
//! Unknown keys are rejected to catch typos early.
//!
//! ## Validation
//!
//! [`Settings::into_run_config`] refuses to start a run when the source
//! directory is missing, no target is set, or the title is empty. The
//! reference and delta roots are **not** validated: whether delta
//! publishing happens is decided when the run starts, see
//! [`RunConfig::delta_trees`].

use crate::delta::DeltaTrees;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings file looked up in the working directory when `--config` isn't given.
pub const DEFAULT_SETTINGS_FILE: &str = "galerie.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// One configuration layer. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub title: Option<String>,
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub delta: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
}

impl Settings {
    /// Overlay `other` on top of `self`: every key set in `other` wins.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            title: other.title.or(self.title),
            source: other.source.or(self.source),
            target: other.target.or(self.target),
            reference: other.reference.or(self.reference),
            delta: other.delta.or(self.delta),
            assets_dir: other.assets_dir.or(self.assets_dir),
        }
    }

    /// Resolve relative paths against `base`.
    fn resolve_paths(mut self, base: &Path) -> Settings {
        for path in [
            &mut self.source,
            &mut self.target,
            &mut self.reference,
            &mut self.delta,
            &mut self.assets_dir,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Validate and freeze into a [`RunConfig`].
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let source = self
            .source
            .ok_or_else(|| ConfigError::Validation("source directory is not set".into()))?;
        if !source.is_dir() {
            return Err(ConfigError::Validation(format!(
                "source directory does not exist: {}",
                source.display()
            )));
        }

        let target = self
            .target
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ConfigError::Validation("target directory is not set".into()))?;

        let title = self
            .title
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::Validation("title must not be empty".into()))?;

        if let Some(assets_dir) = &self.assets_dir
            && !assets_dir.is_dir()
        {
            return Err(ConfigError::Validation(format!(
                "assets_dir does not exist: {}",
                assets_dir.display()
            )));
        }

        Ok(RunConfig {
            source,
            target,
            reference: self.reference.filter(|p| !p.as_os_str().is_empty()),
            delta: self.delta.filter(|p| !p.as_os_str().is_empty()),
            title,
            assets_dir: self.assets_dir,
        })
    }
}

/// Load a settings file. Returns `None` if it doesn't exist.
pub fn load_settings(path: &Path) -> Result<Option<Settings>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(Some(settings.resolve_paths(base)))
}

/// Everything a publish run needs. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub reference: Option<PathBuf>,
    pub delta: Option<PathBuf>,
    pub title: String,
    pub assets_dir: Option<PathBuf>,
}

impl RunConfig {
    /// Decide whether this run publishes deltas.
    ///
    /// Delta publishing needs a reference root that is a directory on disk
    /// right now *and* a delta root. Otherwise the run writes the target tree only and
    /// any configured delta root is left untouched.
    pub fn delta_trees(&self) -> Option<DeltaTrees> {
        let reference = self.reference.as_ref().filter(|r| r.is_dir())?;
        let delta = self.delta.as_ref()?;
        Some(DeltaTrees {
            reference_root: reference.clone(),
            delta_root: delta.clone(),
        })
    }
}

/// Stock settings file with every key documented.
pub fn stock_settings_toml() -> &'static str {
    r#"# galerie settings
#
# Every key is optional. Command-line flags override values set here.
# Relative paths are resolved against the directory containing this file.

# Gallery title shown by the viewer.
# title = "Summer 2024"

# Folder with the source pictures. Only .jpg, .jpeg, .png, .gif and .bmp
# files directly inside it are published; subfolders are ignored.
# source = "pictures"

# Output tree. Every file in it is rewritten on each run.
# target = "publish/current"

# Previous output tree. When it exists, files that differ from it are also
# copied into `delta`, so only those need to be uploaded.
# reference = "publish/previous"

# Receives changed files when `reference` exists. Ignored otherwise.
# delta = "publish/delta"

# Folder whose index.html, galerie.js, galerie-lib.js or galerie.css replace
# the bundled viewer files.
# assets_dir = "viewer"
"#
}
