//! Command implementations

pub mod build;
pub mod build_ext;
pub mod build_py;
pub mod clean;
pub mod completions;
pub mod configure;
pub mod data_files;
pub mod init_pxd;

use anyhow::Result;

use crate::cli::LayoutArgs;
use cybuild::builder::LayoutOptions;
use cybuild::core::Workspace;
use cybuild::util::{Config, GlobalContext};

/// Locate and load the workspace with its merged configuration.
pub fn load_workspace(ctx: &GlobalContext) -> Result<(Workspace, Config)> {
    let manifest_path = ctx.find_manifest()?;
    let ws = Workspace::new(&manifest_path)?;
    let config = ctx.load_config(ws.root());
    Ok((ws, config))
}

impl From<LayoutArgs> for LayoutOptions {
    fn from(args: LayoutArgs) -> Self {
        LayoutOptions {
            platlib: args.install_platlib,
            prefix: args.prefix,
        }
    }
}
