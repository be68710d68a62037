//! Build fingerprinting for incremental builds.
//!
//! A fingerprint captures every input of an extension's compile and link:
//! its C sources, header dependencies, compiler and flags, and the target
//! interpreter's headers and module suffix. An extension
//! whose fingerprint matches the cached one and whose output still exists
//! is not rebuilt.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::translate::CompiledExtension;
use crate::util::hash::Fingerprint;

/// Toolchain side of an extension build.
#[derive(Debug, Clone, Copy)]
pub struct CompileInputs<'a> {
    pub compiler: &'a Path,
    pub cflags: &'a [String],
    pub ldflags: &'a [String],
    pub python_include: Option<&'a Path>,
    pub ext_suffix: &'a str,
}

/// Compute the fingerprint of one extension build.
pub fn extension_fingerprint(ext: &CompiledExtension, inputs: &CompileInputs<'_>) -> Result<String> {
    let CompileInputs {
        compiler,
        cflags,
        ldflags,
        python_include,
        ext_suffix,
    } = *inputs;

    let mut fp = Fingerprint::new();
    fp.update_str(&ext.name);
    fp.update_str(&compiler.to_string_lossy());
    fp.update_str(ext_suffix);
    fp.update_str(&python_include.map(|p| p.to_string_lossy()).unwrap_or_default());

    for flag in cflags {
        fp.update_str(flag);
    }
    fp.update_str("--");
    for flag in ldflags {
        fp.update_str(flag);
    }

    for dir in &ext.include_dirs {
        fp.update_str(&dir.to_string_lossy());
    }
    for source in &ext.sources {
        fp.update_file(source)?;
    }
    for dep in &ext.depends {
        fp.update_file(dep)?;
    }

    Ok(fp.finish())
}

/// Fingerprints of previously built extensions, keyed by module name.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FingerprintCache {
    extensions: BTreeMap<String, String>,
}

impl FingerprintCache {
    /// Load the cache; a missing or unreadable file yields an empty cache.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return FingerprintCache::default();
        }

        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str(&content)?))
        {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("ignoring fingerprint cache {}: {:#}", path.display(), e);
                FingerprintCache::default()
            }
        }
    }

    /// Save the cache to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            crate::util::fs::ensure_dir(parent)?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write fingerprints: {}", path.display()))
    }

    /// Whether `name` must be rebuilt given its current fingerprint.
    pub fn is_stale(&self, name: &str, current: &str) -> bool {
        self.extensions.get(name).map(String::as_str) != Some(current)
    }

    pub fn update(&mut self, name: impl Into<String>, fingerprint: String) {
        self.extensions.insert(name.into(), fingerprint);
    }
}
