//! Install layout.

use std::path::{Path, PathBuf};

/// Where built files are staged and where they will finally be installed.
///
/// Resolved once per invocation and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Platform-specific library directory of the target installation
    platlib: PathBuf,

    /// Staging directory mirroring the install tree
    build_lib: PathBuf,
}

impl InstallLayout {
    pub fn new(platlib: impl Into<PathBuf>, build_lib: impl Into<PathBuf>) -> Self {
        InstallLayout {
            platlib: platlib.into(),
            build_lib: build_lib.into(),
        }
    }

    pub fn platlib(&self) -> &Path {
        &self.platlib
    }

    pub fn build_lib(&self) -> &Path {
        &self.build_lib
    }

    /// Final install directory of `package` (`<platlib>/<package>`).
    pub fn install_dir(&self, package: &str) -> PathBuf {
        self.platlib.join(package)
    }

    /// Staging directory of a dotted package inside the build library.
    pub fn package_build_dir(&self, package: &str) -> PathBuf {
        package_build_dir(&self.build_lib, package)
    }
}

/// `<build_lib>/<a>/<b>` for the dotted package `a.b`.
pub fn package_build_dir(build_lib: &Path, package: &str) -> PathBuf {
    let mut dir = build_lib.to_path_buf();
    dir.extend(package.split('.'));
    dir
}
