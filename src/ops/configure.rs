//! Implementation of `cybuild configure`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::configure::ConfigResolver;

/// Run the configure commands unconditionally and return the fragment path.
///
/// Unlike the lazy resolution done by the build, this refreshes a stale
/// fragment.
pub fn configure(resolver: &ConfigResolver) -> Result<PathBuf> {
    resolver.run_configure()?;
    resolver.read_configured()?;
    Ok(resolver.fragment_path().to_path_buf())
}
