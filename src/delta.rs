//! Target and delta tree writes.
//!
//! Every file a run produces goes through [`DeltaPublisher::publish`]. The
//! file is always written to the target tree. When delta publishing is
//! active, the same bytes are compared against the file at the same relative
//! path in the reference tree (the previous publish):
//!
//! | Reference file | Bytes | Delta tree |
//! |---|---|---|
//! | missing | n/a | untouched |
//! | present | identical | stale entry removed, if any |
//! | present | different | new bytes written |
//!
//! After a complete run the delta tree holds exactly the files present in
//! both target and reference whose bytes differ. Uploading the delta tree
//! over the previous publish therefore brings every changed file up to date.
//!
//! ## New files
//!
//! A file with no counterpart in the reference tree is **not** staged. Newly
//! added pictures (and their thumbnails) only reach the server through a full
//! upload of the target tree. Deployments that rely on the delta tree alone
//! will miss them.
//!
//! ## Tree layout
//!
//! All three trees share one relative layout, see [`TreeDir`]. Directories
//! in the delta tree are only created when a file is actually staged there.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeltaError {
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("Failed to read reference file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to remove stale delta file {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("Failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
}

/// Subdirectory of a published tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeDir {
    /// The tree root: landing page.
    Root,
    /// `pics/`: full-size pictures, thumbnails and the manifest.
    Pictures,
    /// `content/`: style sheet.
    Content,
    /// `scripts/`: viewer script and its library.
    Scripts,
}

impl TreeDir {
    pub const ALL: [TreeDir; 4] = [
        TreeDir::Root,
        TreeDir::Pictures,
        TreeDir::Content,
        TreeDir::Scripts,
    ];

    /// Directory name relative to a tree root (empty for the root itself).
    pub fn as_str(self) -> &'static str {
        match self {
            TreeDir::Root => "",
            TreeDir::Pictures => "pics",
            TreeDir::Content => "content",
            TreeDir::Scripts => "scripts",
        }
    }

    /// Absolute directory under the given tree root.
    pub fn under(self, root: &Path) -> PathBuf {
        match self {
            TreeDir::Root => root.to_path_buf(),
            other => root.join(other.as_str()),
        }
    }

    /// `dir/name` as displayed in progress output.
    pub fn relative_path(self, file_name: &str) -> String {
        match self {
            TreeDir::Root => file_name.to_string(),
            other => format!("{}/{}", other.as_str(), file_name),
        }
    }
}

/// One file to publish.
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub dir: TreeDir,
    pub file_name: &'a str,
    pub content: &'a [u8],
}

impl<'a> PublishRequest<'a> {
    pub fn new(dir: TreeDir, file_name: &'a str, content: &'a [u8]) -> Self {
        Self {
            dir,
            file_name,
            content,
        }
    }
}

/// What happened to the delta tree for one published file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// Delta publishing is off for this run.
    TargetOnly,
    /// No reference counterpart; nothing staged.
    NotInReference,
    /// Identical to the reference.
    Unchanged,
    /// Identical to the reference; a stale delta copy was removed.
    UnchangedPruned,
    /// Differs from the reference; copied into the delta tree.
    Staged,
}

/// Reference and delta roots of an active delta run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaTrees {
    pub reference_root: PathBuf,
    pub delta_root: PathBuf,
}

/// Writes published files to the target tree and mirrors changes into the
/// delta tree.
#[derive(Debug, Clone)]
pub struct DeltaPublisher {
    target_root: PathBuf,
    delta: Option<DeltaTrees>,
}

impl DeltaPublisher {
    pub fn new(target_root: impl Into<PathBuf>, delta: Option<DeltaTrees>) -> Self {
        Self {
            target_root: target_root.into(),
            delta,
        }
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn delta_enabled(&self) -> bool {
        self.delta.is_some()
    }

    /// Create the target root with every subdirectory, plus the bare delta
    /// root when delta publishing is active.
    pub fn prepare(&self) -> Result<(), DeltaError> {
        for dir in TreeDir::ALL {
            create_dir_all(&dir.under(&self.target_root))?;
        }
        if let Some(delta) = &self.delta {
            create_dir_all(&delta.delta_root)?;
        }
        Ok(())
    }

    /// Write one file to the target tree and update the delta tree.
    pub fn publish(&self, request: &PublishRequest<'_>) -> Result<DeltaOutcome, DeltaError> {
        let target_path = request.dir.under(&self.target_root).join(request.file_name);
        fs::write(&target_path, request.content).map_err(|source| DeltaError::Write {
            path: target_path.clone(),
            source,
        })?;

        let Some(delta) = &self.delta else {
            return Ok(DeltaOutcome::TargetOnly);
        };

        let reference_path = request
            .dir
            .under(&delta.reference_root)
            .join(request.file_name);
        if !reference_path.is_file() {
            return Ok(DeltaOutcome::NotInReference);
        }

        let delta_dir = request.dir.under(&delta.delta_root);
        let delta_path = delta_dir.join(request.file_name);

        if same_content(&reference_path, request.content)? {
            if delta_path.is_file() {
                fs::remove_file(&delta_path).map_err(|source| DeltaError::Remove {
                    path: delta_path.clone(),
                    source,
                })?;
                return Ok(DeltaOutcome::UnchangedPruned);
            }
            return Ok(DeltaOutcome::Unchanged);
        }

        create_dir_all(&delta_dir)?;
        fs::write(&delta_path, request.content).map_err(|source| DeltaError::Write {
            path: delta_path.clone(),
            source,
        })?;
        Ok(DeltaOutcome::Staged)
    }
}

/// Byte-for-byte comparison of a reference file against new content.
///
/// The length check comes first so differently sized files are never read.
fn same_content(reference_path: &Path, content: &[u8]) -> Result<bool, DeltaError> {
    let read_error = |source: io::Error| DeltaError::Read {
        path: reference_path.to_path_buf(),
        source,
    };
    let len = fs::metadata(reference_path).map_err(read_error)?.len();
    if len != content.len() as u64 {
        return Ok(false);
    }
    let existing = fs::read(reference_path).map_err(read_error)?;
    Ok(existing == content)
}

fn create_dir_all(path: &Path) -> Result<(), DeltaError> {
    fs::create_dir_all(path).map_err(|source| DeltaError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
