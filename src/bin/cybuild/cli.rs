//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Cybuild - build orchestration for Cython extension packages
#[derive(Parser)]
#[command(name = "cybuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Kill external programs running longer than this many seconds
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        env = "CYBUILD_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage Python files, then build the extension modules
    Build(BuildExtArgs),

    /// Generate the descriptor, translate and compile extensions
    BuildExt(BuildExtArgs),

    /// Stage Python modules, package data and scripts
    BuildPy,

    /// Run the configure commands and report the fragment
    Configure,

    /// Only generate the installed `__init__.pxd`
    InitPxd(LayoutArgs),

    /// Show the data files each package ships
    DataFiles(DataFilesArgs),

    /// Remove build artifacts
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Install-layout overrides.
#[derive(Args, Clone, Default)]
pub struct LayoutArgs {
    /// Platform-library directory the package will be installed into
    #[arg(long, value_name = "DIR")]
    pub install_platlib: Option<PathBuf>,

    /// Installation prefix used to derive the platform-library directory
    #[arg(long, value_name = "DIR", conflicts_with = "install_platlib")]
    pub prefix: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildExtArgs {
    /// Rebuild everything, ignoring up-to-date checks
    #[arg(short, long)]
    pub force: bool,

    /// Translate to C without compiling
    #[arg(long)]
    pub no_compile: bool,

    /// Specific extensions to build (dotted module names)
    #[arg(long = "extension", value_name = "NAME")]
    pub extensions: Vec<String>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

#[derive(Args)]
pub struct DataFilesArgs {
    /// Print JSON instead of a listing
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Remove the whole build directory, configure output included
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
