//! `cybuild build` command

use anyhow::Result;

use crate::cli::BuildExtArgs;
use crate::commands::{build_ext, load_workspace};
use cybuild::builder::BuildContext;
use cybuild::ops::cybuild_build::build;
use cybuild::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: BuildExtArgs) -> Result<()> {
    let (ws, config) = load_workspace(ctx)?;
    let bcx = BuildContext::new(&ws, config, &args.layout.clone().into())?;

    match ws.manifest().version()? {
        Some(version) => eprintln!("    Building {} v{}", ws.package_name(), version),
        None => eprintln!("    Building {}", ws.package_name()),
    }

    let result = build(&bcx, &build_ext::options(&args))?;

    eprintln!(
        "    Finished {} staged file(s), {} extension(s) in {}",
        result.py.copied(),
        result.ext.artifacts.len(),
        ws.build_lib().display()
    );

    Ok(())
}
