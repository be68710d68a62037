//! `cybuild data-files` command

use anyhow::Result;

use crate::cli::DataFilesArgs;
use crate::commands::load_workspace;
use cybuild::ops::cybuild_build_py::collect_data_files;
use cybuild::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, args: DataFilesArgs) -> Result<()> {
    let (ws, _config) = load_workspace(ctx)?;

    let data = collect_data_files(&ws)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    for desc in &data {
        let src = desc
            .src_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        println!("{} [{}] -> {}", desc.package, src, desc.build_dir.display());
        for file in &desc.files {
            println!("    {}", file.display());
        }
    }

    Ok(())
}
