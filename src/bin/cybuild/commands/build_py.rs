//! `cybuild build-py` command

use anyhow::Result;

use crate::commands::load_workspace;
use cybuild::ops::cybuild_build_py::build_py;
use cybuild::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let (ws, _config) = load_workspace(ctx)?;

    let result = build_py(&ws)?;
    eprintln!(
        "    Finished {} file(s) staged in {}",
        result.copied(),
        ws.build_lib().display()
    );

    Ok(())
}
