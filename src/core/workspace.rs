//! Workspace - central configuration hub.
//!
//! A Workspace is a loaded manifest anchored at its project root. It
//! turns the manifest's relative paths into the absolute locations the
//! build reads and writes.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::manifest::Manifest;

/// Name of the fingerprint file kept in the build directory.
const FINGERPRINT_FILE: &str = ".fingerprints.json";

/// A project root and its manifest.
#[derive(Debug, Clone)]
pub struct Workspace {
    manifest: Manifest,
    root: PathBuf,
}

impl Workspace {
    /// Create a new workspace from a manifest path.
    pub fn new(manifest_path: &Path) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        let root = manifest_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();

        Ok(Workspace { manifest, root })
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Name of the package being built.
    pub fn package_name(&self) -> &str {
        &self.manifest.package.name
    }

    /// Scratch directory for generated sources (`<root>/<build-dir>`).
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.build.build_dir)
    }

    /// Staging directory mirroring the install tree.
    pub fn build_lib(&self) -> PathBuf {
        self.root.join(self.manifest.build.build_lib())
    }

    /// Directory for intermediate object files.
    pub fn temp_dir(&self) -> PathBuf {
        self.build_dir().join("temp")
    }

    /// Directory copied scripts are staged in.
    pub fn scripts_dir(&self) -> PathBuf {
        self.build_dir().join("scripts")
    }

    /// Root of the source tree (the Cython include path).
    pub fn source_root(&self) -> PathBuf {
        self.root.join(&self.manifest.build.source_root)
    }

    /// Fragment left behind by the configure step:
    /// `<build-dir>/src/<package>/__init__.pxd`.
    pub fn configure_fragment_path(&self) -> PathBuf {
        self.build_dir()
            .join("src")
            .join(self.package_name())
            .join("__init__.pxd")
    }

    /// Descriptor installed with the package:
    /// `<build-lib>/<package>/__init__.pxd`.
    pub fn init_descriptor_path(&self) -> PathBuf {
        self.build_lib()
            .join(self.package_name())
            .join("__init__.pxd")
    }

    /// Extension fingerprint cache.
    pub fn fingerprint_path(&self) -> PathBuf {
        self.build_dir().join(FINGERPRINT_FILE)
    }
}
