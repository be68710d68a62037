//! `cybuild completions` command

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::{Cli, CompletionsArgs};

pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let mut out = std::io::stdout().lock();
    generate(args.shell, &mut cmd, bin_name, &mut out);

    Ok(())
}
