//! `cybuild build-ext` command

use anyhow::Result;

use crate::cli::BuildExtArgs;
use crate::commands::load_workspace;
use cybuild::builder::BuildContext;
use cybuild::ops::cybuild_build_ext::{build_ext, BuildExtOptions};
use cybuild::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: BuildExtArgs) -> Result<()> {
    let (ws, config) = load_workspace(ctx)?;
    let bcx = BuildContext::new(&ws, config, &args.layout.clone().into())?;

    let opts = options(&args);
    let result = build_ext(&bcx, &opts)?;

    if opts.compile {
        for artifact in &result.artifacts {
            if artifact.fresh {
                eprintln!(
                    "    Finished `{}` -> {}",
                    artifact.name,
                    artifact.path.display()
                );
            } else if ctx.is_verbose() {
                eprintln!("       Fresh `{}`", artifact.name);
            }
        }
    } else {
        for ext in &result.translated {
            eprintln!("  Translated `{}`", ext.name);
        }
    }

    Ok(())
}

/// Build-ext options from command-line flags.
pub fn options(args: &BuildExtArgs) -> BuildExtOptions {
    BuildExtOptions {
        force: args.force,
        compile: !args.no_compile,
        extensions: args.extensions.clone(),
    }
}
