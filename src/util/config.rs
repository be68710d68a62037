//! Configuration file support for cybuild.
//!
//! cybuild reads two configuration files:
//! - Global: `~/.cybuild/config.toml` - User-wide defaults
//! - Project: `.cybuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// cybuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool overrides
    pub toolchain: ToolchainSettings,

    /// Install location overrides
    pub install: InstallConfig,

    /// External process policy
    pub process: ProcessConfig,
}

/// External tools used by the build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler (e.g., /usr/bin/clang)
    pub cc: Option<PathBuf>,

    /// Path to the Cython compiler
    pub cython: Option<PathBuf>,

    /// Path to the Python interpreter the extensions are built for
    pub python: Option<PathBuf>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

/// Install-layout overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Platform-library install directory (skips the interpreter query)
    pub platlib: Option<PathBuf>,

    /// Installation prefix passed to the interpreter query
    pub prefix: Option<PathBuf>,
}

/// Policy for external processes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProcessConfig {
    /// Kill external programs that run longer than this (None or 0 = no limit)
    pub timeout_secs: Option<u64>,
}

impl ProcessConfig {
    /// The configured timeout as a `Duration`.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.cython.is_some() {
            self.toolchain.cython = other.toolchain.cython;
        }
        if other.toolchain.python.is_some() {
            self.toolchain.python = other.toolchain.python;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }

        if other.install.platlib.is_some() {
            self.install.platlib = other.install.platlib;
        }
        if other.install.prefix.is_some() {
            self.install.prefix = other.install.prefix;
        }

        if other.process.timeout_secs.is_some() {
            self.process.timeout_secs = other.process.timeout_secs;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cybuild/config.toml)
/// 2. Global config (~/.cybuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global cybuild config directory (~/.cybuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cybuild"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.toolchain.cc.is_none());
        assert!(config.install.platlib.is_none());
        assert!(config.process.timeout().is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[toolchain]
cc = "/usr/bin/clang"
cython = "/opt/cython/bin/cython"
cflags = ["-O2", "-g"]

[install]
platlib = "/usr/lib/python3/site-packages"

[process]
timeout-secs = 600
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.toolchain.cc, Some(PathBuf::from("/usr/bin/clang")));
        assert_eq!(
            config.toolchain.cython,
            Some(PathBuf::from("/opt/cython/bin/cython"))
        );
        assert_eq!(config.toolchain.cflags, vec!["-O2", "-g"]);
        assert_eq!(
            config.install.platlib,
            Some(PathBuf::from("/usr/lib/python3/site-packages"))
        );
        assert_eq!(config.process.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_zero_timeout_means_no_limit() {
        let config: Config = toml::from_str("[process]\ntimeout-secs = 0\n").unwrap();
        assert_eq!(config.process.timeout_secs, Some(0));
        assert!(config.process.timeout().is_none());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.toolchain.cc = Some(PathBuf::from("gcc"));
        base.process.timeout_secs = Some(60);

        let mut override_cfg = Config::default();
        override_cfg.toolchain.cc = Some(PathBuf::from("clang"));

        base.merge(override_cfg);

        assert_eq!(base.toolchain.cc, Some(PathBuf::from("clang")));
        assert_eq!(base.process.timeout_secs, Some(60)); // Not overridden
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[toolchain]\ncc = \"/usr/bin/gcc\"\npython = \"/usr/bin/python3\"\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[toolchain]\ncc = \"/usr/bin/clang\"\n").unwrap();

        let config = load_config(&global_path, &project_path);

        assert_eq!(config.toolchain.cc, Some(PathBuf::from("/usr/bin/clang")));
        assert_eq!(
            config.toolchain.python,
            Some(PathBuf::from("/usr/bin/python3"))
        );
    }

    #[test]
    fn test_load_config_invalid_falls_back() {
        let tmp = TempDir::new().unwrap();
        let project_path = tmp.path().join("project.toml");
        std::fs::write(&project_path, "this is not toml = = =").unwrap();

        let config = load_config(&tmp.path().join("missing.toml"), &project_path);
        assert!(config.toolchain.cc.is_none());
    }
}
