//! Generation of the installed `__init__.pxd` descriptor.
//!
//! Packages that `cimport` the library pick up its compiler options from
//! this file. Its first line points the include path at the final install
//! directory; the rest is the configure fragment verbatim.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::configure::{ConfigFragment, ConfigProvider};
use crate::core::InstallLayout;
use crate::util::fs::write_if_changed;

/// Keyword of the directive comment the Cython build tooling understands.
pub const DIRECTIVE_KEYWORD: &str = "distutils";

/// File name of the descriptor.
pub const INIT_PXD: &str = "__init__.pxd";

/// Compose the descriptor text. Output depends only on the inputs.
pub fn compose_init_descriptor(install_dir: &Path, fragment: &ConfigFragment) -> String {
    format!(
        "# {}: include_dirs = {}\n{}",
        DIRECTIVE_KEYWORD,
        install_dir.display(),
        fragment.as_str()
    )
}

/// Outcome of [`generate_init_descriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitDescriptor {
    pub path: PathBuf,
    /// `false` when the file on disk was already current
    pub written: bool,
}

/// Write `<build-lib>/<package>/__init__.pxd` if its content changed.
pub fn generate_init_descriptor(
    layout: &InstallLayout,
    package: &str,
    provider: &dyn ConfigProvider,
) -> Result<InitDescriptor> {
    let install_dir = layout.install_dir(package);
    let fragment = provider.fragment()?;
    let text = compose_init_descriptor(&install_dir, &fragment);

    let path = layout.package_build_dir(package).join(INIT_PXD);
    let written = write_if_changed(&path, &text)?;

    Ok(InitDescriptor { path, written })
}
