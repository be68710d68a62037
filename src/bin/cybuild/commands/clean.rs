//! `cybuild clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::load_workspace;
use cybuild::ops::cybuild_clean::{clean, CleanOptions};
use cybuild::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: CleanArgs) -> Result<()> {
    let (ws, _config) = load_workspace(ctx)?;

    let result = clean(&ws, &CleanOptions { all: args.all })?;
    eprintln!(
        "     Removed {} ({} files)",
        result.removed.display(),
        result.files
    );

    Ok(())
}
