//! Test fixtures for common test scenarios.
//!
//! This module provides a cysignals-shaped project that tests can write to
//! a temporary directory and load as a [`Workspace`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::manifest::MANIFEST_NAME;
use crate::core::Workspace;

/// Fragment the fixture's configure script writes.
pub const CONFIG_FRAGMENT: &str = "# distutils: libraries = m\n";

/// Manifest of the cysignals fixture.
pub const CYSIGNALS_MANIFEST: &str = r#"packages = ["cysignals"]
scripts = ["src/scripts/*"]

[package]
name = "cysignals"
version-file = "VERSION"

[extension-defaults]
include-dirs = ["src/cysignals", "build/src", "build/src/cysignals"]
depends = ["src/cysignals/*.h"]

[[extension]]
name = "cysignals.signals"
sources = ["src/cysignals/signals.pyx"]

[package-dir]
cysignals = "src/cysignals"
"cysignals-cython" = "build/src/cysignals"

[package-data]
cysignals = ["*.pxi", "*.pxd", "*.h"]
"cysignals-cython" = ["*.h"]

[configure]
commands = [["sh", "configure"]]
"#;

/// Configure script of the cysignals fixture.
pub const CONFIGURE_SCRIPT: &str = r#"#!/bin/sh
mkdir -p build/src/cysignals
printf '# distutils: libraries = m\n' > build/src/cysignals/__init__.pxd
printf '#define HAVE_UNISTD_H 1\n' > build/src/cysignals/cysignals_config.h
"#;

/// Fixture for a complete project structure.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Cybuild.toml content.
    pub manifest: String,
    /// Files (path relative to project root -> content).
    pub files: BTreeMap<PathBuf, String>,
}

impl ProjectFixture {
    /// Create a fixture with only a manifest.
    pub fn new(manifest: impl Into<String>) -> Self {
        ProjectFixture {
            manifest: manifest.into(),
            files: BTreeMap::new(),
        }
    }

    /// A cysignals-like project with one extension, one package and a
    /// configure script. The configure step has not run yet.
    pub fn cysignals() -> Self {
        ProjectFixture::new(CYSIGNALS_MANIFEST)
            .with_file("VERSION", "1.6.5\n")
            .with_file("configure", CONFIGURE_SCRIPT)
            .with_file("src/cysignals/__init__.py", "")
            .with_file(
                "src/cysignals/signals.pyx",
                "cimport cysignals.signals\n\ndef sig_on_count():\n    return 0\n",
            )
            .with_file("src/cysignals/signals.pxd", "cdef extern from *:\n    pass\n")
            .with_file("src/cysignals/struct_signals.h", "typedef int cysigs_t;\n")
            .with_file("src/scripts/cysignals-CSI", "#!/bin/sh\n")
    }

    /// Pretend the configure step already ran.
    pub fn configured(self) -> Self {
        self.with_file("build/src/cysignals/__init__.pxd", CONFIG_FRAGMENT)
            .with_file(
                "build/src/cysignals/cysignals_config.h",
                "#define HAVE_UNISTD_H 1\n",
            )
    }

    /// Replace the manifest content.
    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Add a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Write this fixture to a fresh temporary directory.
    pub fn create(&self) -> TestProject {
        let dir = TempDir::new().expect("failed to create temp dir");
        self.write_to(dir.path()).expect("failed to write fixture");
        TestProject { dir }
    }

    /// Write this fixture to a real directory.
    pub fn write_to(&self, root: &Path) -> std::io::Result<()> {
        std::fs::write(root.join(MANIFEST_NAME), &self.manifest)?;

        for (rel_path, content) in &self.files {
            let full_path = root.join(rel_path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full_path, content)?;
        }

        Ok(())
    }
}

/// A fixture written to disk. The directory is removed on drop.
#[derive(Debug)]
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join(MANIFEST_NAME)
    }

    /// Path of `rel` inside the project.
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root().join(rel)
    }

    /// Load the project's workspace.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.manifest_path()).expect("fixture manifest should load")
    }
}
