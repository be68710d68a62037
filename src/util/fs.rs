//! Filesystem utilities.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Write `text` to `path`, but only if it differs from the current content.
///
/// Missing parent directories and the file itself are created on demand.
/// When the file already holds exactly `text` nothing is written, so its
/// modification time stays put and mtime-driven rebuild tools see no change.
///
/// Returns `true` if the file was (re)written.
pub fn write_if_changed(path: &Path, text: &str) -> Result<bool> {
    let mut file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(mut file) => {
            let mut current = String::new();
            let up_to_date = match file.read_to_string(&mut current) {
                Ok(_) => current == text,
                // Non-UTF-8 content can never match; overwrite it
                Err(e) if e.kind() == io::ErrorKind::InvalidData => false,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to read file: {}", path.display()))
                }
            };

            if up_to_date {
                tracing::debug!("{} is up to date", path.display());
                return Ok(false);
            }

            file.seek(SeekFrom::Start(0))
                .and_then(|_| file.set_len(0))
                .with_context(|| format!("failed to truncate file: {}", path.display()))?;
            file
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                match fs::create_dir_all(parent) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                    Err(e) => {
                        return Err(e).with_context(|| {
                            format!("failed to create directory: {}", parent.display())
                        })
                    }
                }
            }
            File::create(path)
                .with_context(|| format!("failed to create file: {}", path.display()))?
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to open file: {}", path.display()))
        }
    };

    tracing::info!("generating {}", path.display());
    file.write_all(text.as_bytes())
        .and_then(|_| file.flush())
        .with_context(|| format!("failed to write file: {}", path.display()))?;

    Ok(true)
}

/// Copy `src` to `dst` unless `dst` already holds identical bytes.
///
/// Returns `true` if a copy happened.
pub fn copy_if_changed(src: &Path, dst: &Path) -> Result<bool> {
    let data = fs::read(src).with_context(|| format!("failed to read file: {}", src.display()))?;

    if let Ok(existing) = fs::read(dst) {
        if existing == data {
            return Ok(false);
        }
    }

    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::write(dst, &data).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dst.display())
    })?;
    tracing::debug!("copying {} -> {}", src.display(), dst.display());

    Ok(true)
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Find files matching glob patterns relative to a base directory.
///
/// Results are sorted and deduplicated; directories are skipped.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
