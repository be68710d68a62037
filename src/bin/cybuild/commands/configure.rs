//! `cybuild configure` command

use anyhow::Result;

use crate::commands::load_workspace;
use cybuild::builder::ConfigResolver;
use cybuild::util::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let (ws, config) = load_workspace(ctx)?;

    let resolver = ConfigResolver::new(
        ws.configure_fragment_path(),
        ws.manifest().configure.commands.clone(),
        ws.root().to_path_buf(),
    )
    .with_timeout(config.process.timeout());

    let path = cybuild::ops::configure(&resolver)?;
    println!("{}", path.display());

    Ok(())
}
