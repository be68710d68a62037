//! Global context for cybuild operations.
//!
//! Provides centralized access to the working directory, the user-wide
//! configuration home and command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::manifest::{ManifestError, MANIFEST_NAME};
use crate::util::config::{global_config_dir, load_config, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global cybuild data (~/.cybuild/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Timeout from the command line, overriding config
    timeout: Option<Duration>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(".cybuild"));

        Ok(GlobalContext {
            cwd,
            home,
            verbose: false,
            timeout: None,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Override the external-process timeout.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project configuration file path for a project root.
    pub fn project_config_path(&self, root: &Path) -> PathBuf {
        root.join(".cybuild").join("config.toml")
    }

    /// Load merged global + project configuration, applying CLI overrides.
    pub fn load_config(&self, root: &Path) -> Config {
        let mut config = load_config(&self.config_path(), &self.project_config_path(root));
        if let Some(timeout) = self.timeout {
            config.process.timeout_secs = Some(timeout.as_secs());
        }
        config
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Find `Cybuild.toml` starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ManifestError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }
}
