//! `cybuild init-pxd` command
//!
//! Generates only the installed descriptor, running configure if needed.

use anyhow::Result;

use crate::cli::LayoutArgs;
use crate::commands::load_workspace;
use cybuild::builder::{generate_init_descriptor, BuildContext};
use cybuild::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: LayoutArgs) -> Result<()> {
    let (ws, config) = load_workspace(ctx)?;
    let bcx = BuildContext::new(&ws, config, &args.into())?;

    let desc = generate_init_descriptor(bcx.layout(), ws.package_name(), &bcx.config_resolver())?;
    if !desc.written {
        eprintln!("     Fresh {}", desc.path.display());
    }
    println!("{}", desc.path.display());

    Ok(())
}
