//! Implementation of `cybuild clean`.

use std::path::PathBuf;

use anyhow::Result;
use walkdir::WalkDir;

use crate::core::Workspace;
use crate::util::fs::remove_dir_all_if_exists;

/// Options for the clean command.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Remove the whole build directory, configure output included
    pub all: bool,
}

/// Clean result.
#[derive(Debug)]
pub struct CleanResult {
    /// Directory that was removed
    pub removed: PathBuf,

    /// Number of files it held
    pub files: usize,
}

/// Remove the build library, or the whole build directory with `all`.
pub fn clean(ws: &Workspace, opts: &CleanOptions) -> Result<CleanResult> {
    let target = if opts.all {
        ws.build_dir()
    } else {
        ws.build_lib()
    };

    let files = WalkDir::new(&target)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count();

    remove_dir_all_if_exists(&target)?;
    tracing::debug!("removed {} ({} files)", target.display(), files);

    Ok(CleanResult {
        removed: target,
        files,
    })
}
