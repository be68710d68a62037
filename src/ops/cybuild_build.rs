//! Implementation of `cybuild build`.

use anyhow::Result;

use crate::builder::configure::ConfigProvider;
use crate::builder::BuildContext;
use crate::ops::cybuild_build_ext::{build_ext, BuildExtOptions, BuildExtResult};
use crate::ops::cybuild_build_py::{build_py, BuildPyResult};

/// Build result.
#[derive(Debug)]
pub struct BuildResult {
    pub py: BuildPyResult,
    pub ext: BuildExtResult,
}

/// Stage pure-Python files, then build the extensions.
///
/// The configure fragment is resolved first: configure also generates
/// the headers the shadow package ships, and those must exist before the
/// data files are collected. The later descriptor step reuses the file.
pub fn build(bcx: &BuildContext<'_>, opts: &BuildExtOptions) -> Result<BuildResult> {
    let ws = bcx.workspace();

    bcx.config_resolver().fragment()?;

    let py = build_py(ws)?;
    let ext = build_ext(bcx, opts)?;

    Ok(BuildResult { py, ext })
}
