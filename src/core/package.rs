//! Package declarations and their data-file layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Suffix naming a package's shadow companion.
///
/// For a package `foo`, `foo-cython` holds generated headers that ship
/// with `foo` but live in a different source directory.
pub const SHADOW_SUFFIX: &str = "-cython";

/// Name of the shadow package for `package`.
pub fn shadow_name(package: &str) -> String {
    format!("{}{}", package, SHADOW_SUFFIX)
}

/// Declared packages together with their source directories and data
/// patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    /// Declared packages, in order
    packages: Vec<String>,

    /// Package name -> source directory, relative to the project root
    package_dir: BTreeMap<String, PathBuf>,

    /// Package name -> data-file glob patterns. The `""` key applies to
    /// every package.
    package_data: BTreeMap<String, Vec<String>>,
}

impl PackageSet {
    pub fn new(
        packages: Vec<String>,
        package_dir: BTreeMap<String, PathBuf>,
        package_data: BTreeMap<String, Vec<String>>,
    ) -> Self {
        PackageSet {
            packages,
            package_dir,
            package_data,
        }
    }

    /// Declared package names.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Source directory declared for `package`.
    ///
    /// An explicit mapping wins. Otherwise the nearest mapped parent package
    /// (or the `""` root mapping) is extended with the remaining name
    /// segments. Shadow packages are never derived from a parent, so an
    /// unmapped shadow has no directory. An empty mapping means the project
    /// root and is reported as `None`.
    pub fn package_dir(&self, package: &str) -> Option<PathBuf> {
        if let Some(dir) = self.package_dir.get(package) {
            return non_empty(dir.clone());
        }

        if package.ends_with(SHADOW_SUFFIX) {
            return None;
        }

        let segments: Vec<&str> = package.split('.').collect();
        for split in (0..segments.len()).rev() {
            let parent = segments[..split].join(".");
            if let Some(dir) = self.package_dir.get(&parent) {
                let mut path = dir.clone();
                path.extend(&segments[split..]);
                return non_empty(path);
            }
        }

        non_empty(segments.iter().collect())
    }

    /// Glob patterns of data files for `package`.
    pub fn data_patterns(&self, package: &str) -> Vec<String> {
        let mut patterns = self.package_data.get("").cloned().unwrap_or_default();
        if let Some(own) = self.package_data.get(package) {
            patterns.extend(own.iter().cloned());
        }
        patterns
    }
}

fn non_empty(path: PathBuf) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Data files of one (possibly shadow) package, ready to be copied into
/// the build tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    /// Primary package name the files are installed under
    pub package: String,

    /// Source directory relative to the project root, if the package has one
    pub src_dir: Option<PathBuf>,

    /// Output directory inside the build library
    pub build_dir: PathBuf,

    /// Data files relative to `src_dir` (or to the project root when
    /// `src_dir` is absent)
    pub files: Vec<PathBuf>,
}

impl PackageDescriptor {
    /// Source location of `file` relative to the project root.
    pub fn source_of(&self, file: &Path) -> PathBuf {
        match &self.src_dir {
            Some(dir) => dir.join(file),
            None => file.to_path_buf(),
        }
    }

    /// Destination of `file` inside the build tree.
    pub fn destination_of(&self, file: &Path) -> PathBuf {
        self.build_dir.join(file)
    }
}
