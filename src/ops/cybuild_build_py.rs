//! Implementation of `cybuild build-py` and `cybuild data-files`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::data_files::{copy_data_files, copy_package_modules, PackageDataCollector};
use crate::core::{PackageDescriptor, Workspace};
use crate::util::fs::{copy_if_changed, glob_files};

/// Build-py result.
#[derive(Debug, Default)]
pub struct BuildPyResult {
    /// Python modules copied into the build library
    pub modules: Vec<PathBuf>,

    /// Data files copied into the build library
    pub data_files: Vec<PathBuf>,

    /// Scripts copied into the scripts directory
    pub scripts: Vec<PathBuf>,
}

impl BuildPyResult {
    /// Number of files written.
    pub fn copied(&self) -> usize {
        self.modules.len() + self.data_files.len() + self.scripts.len()
    }
}

/// Data files of every declared package, shadow packages included.
pub fn collect_data_files(ws: &Workspace) -> Result<Vec<PackageDescriptor>> {
    let packages = &ws.manifest().packages;
    let build_lib = ws.build_lib();
    PackageDataCollector::new(ws.root(), packages, &build_lib).collect(packages.packages())
}

/// Stage modules, data files and scripts. Unchanged files are not touched.
pub fn build_py(ws: &Workspace) -> Result<BuildPyResult> {
    let build_lib = ws.build_lib();

    let modules = copy_package_modules(ws.root(), &ws.manifest().packages, &build_lib)?;
    let data = collect_data_files(ws)?;
    let data_files = copy_data_files(ws.root(), &data)?;
    let scripts = copy_scripts(ws)?;

    let result = BuildPyResult {
        modules,
        data_files,
        scripts,
    };
    tracing::debug!("staged {} file(s) into {}", result.copied(), build_lib.display());
    Ok(result)
}

/// Copy the manifest's scripts into `<build-dir>/scripts`.
fn copy_scripts(ws: &Workspace) -> Result<Vec<PathBuf>> {
    let scripts = &ws.manifest().scripts;
    if scripts.is_empty() {
        return Ok(Vec::new());
    }

    let dest = ws.scripts_dir();
    let mut copied = Vec::new();
    for script in glob_files(ws.root(), scripts)? {
        let Some(name) = script.file_name() else {
            continue;
        };
        let dst = dest.join(name);
        if copy_if_changed(&script, &dst)? {
            copied.push(dst);
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProjectFixture;

    #[test]
    fn test_build_py_stages_everything() {
        let project = ProjectFixture::cysignals().configured().create();
        let ws = project.workspace();

        let result = build_py(&ws).unwrap();

        let lib = ws.build_lib().join("cysignals");
        assert!(lib.join("__init__.py").exists());
        assert!(lib.join("signals.pxd").exists());
        assert!(lib.join("struct_signals.h").exists());
        assert!(lib.join("cysignals_config.h").exists());
        assert!(!lib.join("signals.pyx").exists());
        assert_eq!(result.scripts, vec![ws.scripts_dir().join("cysignals-CSI")]);
    }

    #[test]
    fn test_build_py_twice_copies_nothing() {
        let project = ProjectFixture::cysignals().configured().create();
        let ws = project.workspace();

        assert!(build_py(&ws).unwrap().copied() > 0);
        assert_eq!(build_py(&ws).unwrap().copied(), 0);
    }

    #[test]
    fn test_collect_data_files_for_fixture() {
        let project = ProjectFixture::cysignals().configured().create();
        let ws = project.workspace();

        let data = collect_data_files(&ws).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].files, vec![PathBuf::from("cysignals_config.h")]);
    }
}
