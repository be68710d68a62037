//! Package data collection for the `build_py` phase.
//!
//! Every declared package `P` is paired with its shadow `P-cython`, a
//! companion holding generated headers only. Data files of both are
//! reported under `P` with paths relative to their source directory, so
//! they can be copied straight into `<build-lib>/P`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::layout::package_build_dir;
use crate::core::package::{shadow_name, PackageDescriptor, PackageSet};
use crate::util::fs::{copy_if_changed, glob_files, relative_path};

/// Collects data files for declared packages.
#[derive(Debug, Clone, Copy)]
pub struct PackageDataCollector<'a> {
    root: &'a Path,
    packages: &'a PackageSet,
    build_lib: &'a Path,
}

impl<'a> PackageDataCollector<'a> {
    /// `root` is the project root all package directories are relative to;
    /// files are staged under `build_lib`.
    pub fn new(root: &'a Path, packages: &'a PackageSet, build_lib: &'a Path) -> Self {
        PackageDataCollector {
            root,
            packages,
            build_lib,
        }
    }

    /// One descriptor per declared package plus one per shadow package
    /// that has data files.
    pub fn collect(&self, declared: &[String]) -> Result<Vec<PackageDescriptor>> {
        let mut data = Vec::new();

        for package in declared {
            let build_dir = package_build_dir(self.build_lib, package);

            for (src_package, is_shadow) in [(package.clone(), false), (shadow_name(package), true)] {
                let src_dir = self.source_dir(&src_package);
                let files = self.find_data_files(&src_package, src_dir.as_deref())?;

                if is_shadow && files.is_empty() {
                    tracing::debug!("no shadow package for `{}`", package);
                    continue;
                }

                let files = files
                    .iter()
                    .map(|f| strip_source_prefix(f, src_dir.as_deref()))
                    .collect();

                data.push(PackageDescriptor {
                    package: package.clone(),
                    src_dir,
                    build_dir: build_dir.clone(),
                    files,
                });
            }
        }

        Ok(data)
    }

    /// Source directory of `package`, whether or not it exists yet.
    fn source_dir(&self, package: &str) -> Option<PathBuf> {
        self.packages.package_dir(package)
    }

    /// Data files of `package`, relative to the project root.
    ///
    /// A missing source directory yields no files. Only a package without a
    /// directory is searched from the project root.
    fn find_data_files(&self, package: &str, src_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
        let patterns = self.packages.data_patterns(package);
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let base = match src_dir {
            Some(dir) => self.root.join(dir),
            None => self.root.to_path_buf(),
        };

        Ok(glob_files(&base, &patterns)?
            .into_iter()
            .map(|f| relative_path(self.root, &f))
            .collect())
    }
}

/// Strip `src_dir` and one separator from the front of `file`.
///
/// Without a source directory the path is returned unchanged.
pub fn strip_source_prefix(file: &Path, src_dir: Option<&Path>) -> PathBuf {
    let prefix_len = match src_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_string_lossy().len() + 1,
        _ => 0,
    };
    let file = file.to_string_lossy();
    PathBuf::from(file.get(prefix_len..).unwrap_or_default())
}

/// Copy every collected data file into the build tree.
///
/// Returns the destinations that were written.
pub fn copy_data_files(root: &Path, descriptors: &[PackageDescriptor]) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for desc in descriptors {
        for file in &desc.files {
            let src = root.join(desc.source_of(file));
            let dst = desc.destination_of(file);
            if copy_if_changed(&src, &dst)? {
                copied.push(dst);
            }
        }
    }
    Ok(copied)
}

/// Copy the `*.py` modules of each declared package into the build tree.
pub fn copy_package_modules(
    root: &Path,
    packages: &PackageSet,
    build_lib: &Path,
) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for package in packages.packages() {
        let Some(dir) = packages.package_dir(package) else {
            continue;
        };
        let src_dir = root.join(&dir);
        if !src_dir.is_dir() {
            continue;
        }

        let build_dir = package_build_dir(build_lib, package);
        for module in glob_files(&src_dir, &["*.py".to_string()])? {
            if let Some(name) = module.file_name() {
                let dst = build_dir.join(name);
                if copy_if_changed(&module, &dst)? {
                    copied.push(dst);
                }
            }
        }
    }
    Ok(copied)
}
