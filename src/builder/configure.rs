//! Configuration fragment resolution.
//!
//! The external configure step leaves a fragment of compiler directives at
//! `<build-dir>/src/<package>/__init__.pxd`. [`ConfigResolver`] reuses that
//! file when present and otherwise runs the configure commands once before
//! reading it. Only existence is checked; a stale fragment is reused.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::util::process::{ProcessBuilder, ProcessError};

/// Compiler include-path directives produced by configure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFragment(String);

impl ConfigFragment {
    pub fn new(text: impl Into<String>) -> Self {
        ConfigFragment(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Failure to obtain a configuration fragment.
#[derive(Debug, Error)]
pub enum ConfigureError {
    /// A configure command could not run or exited non-zero.
    #[error("configure step failed")]
    Command(#[from] ProcessError),

    /// Configure finished but the fragment is still missing.
    #[error("configure did not produce `{}`", .path.display())]
    MissingFragment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The fragment exists but could not be read.
    #[error("failed to read configuration fragment `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source of the configuration fragment.
pub trait ConfigProvider {
    /// Return the fragment, producing it first if necessary.
    fn fragment(&self) -> Result<ConfigFragment, ConfigureError>;
}

/// Production [`ConfigProvider`]: cached file, else the configure commands.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    fragment_path: PathBuf,
    commands: Vec<Vec<String>>,
    cwd: PathBuf,
    timeout: Option<Duration>,
}

impl ConfigResolver {
    /// `commands` are run in order from `cwd`, inheriting the environment.
    pub fn new(fragment_path: PathBuf, commands: Vec<Vec<String>>, cwd: PathBuf) -> Self {
        ConfigResolver {
            fragment_path,
            commands,
            cwd,
            timeout: None,
        }
    }

    /// Kill configure commands that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fragment_path(&self) -> &Path {
        &self.fragment_path
    }

    /// Run every configure command, stopping at the first failure.
    pub fn run_configure(&self) -> Result<(), ConfigureError> {
        for command in &self.commands {
            let Some((program, args)) = command.split_first() else {
                continue;
            };
            tracing::info!("running {}", command.join(" "));
            ProcessBuilder::new(program)
                .args(args)
                .cwd(&self.cwd)
                .timeout(self.timeout)
                .status_and_check()?;
        }
        Ok(())
    }

    /// Read the fragment right after configure ran. Absence is fatal.
    pub fn read_configured(&self) -> Result<ConfigFragment, ConfigureError> {
        self.read().map(ConfigFragment).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigureError::MissingFragment {
                    path: self.fragment_path.clone(),
                    source,
                }
            } else {
                ConfigureError::Read {
                    path: self.fragment_path.clone(),
                    source,
                }
            }
        })
    }

    fn read(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.fragment_path)
    }
}

impl ConfigProvider for ConfigResolver {
    fn fragment(&self) -> Result<ConfigFragment, ConfigureError> {
        match self.read() {
            Ok(text) => {
                tracing::debug!("reusing {}", self.fragment_path.display());
                return Ok(ConfigFragment(text));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    "{} not found, running configure",
                    self.fragment_path.display()
                );
            }
            Err(source) => {
                return Err(ConfigureError::Read {
                    path: self.fragment_path.clone(),
                    source,
                })
            }
        }

        self.run_configure()?;
        self.read_configured()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    fn fragment_path(root: &Path) -> PathBuf {
        root.join("build/src/cysignals/__init__.pxd")
    }

    #[test]
    fn test_existing_fragment_skips_configure() {
        let tmp = TempDir::new().unwrap();
        let path = fragment_path(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "# cached\n").unwrap();

        // Would fail if it ran
        let resolver = ConfigResolver::new(path, vec![sh("exit 1")], tmp.path().to_path_buf());

        assert_eq!(resolver.fragment().unwrap().as_str(), "# cached\n");
    }

    #[test]
    fn test_missing_fragment_runs_configure_once() {
        let tmp = TempDir::new().unwrap();
        let path = fragment_path(tmp.path());
        let resolver = ConfigResolver::new(
            path.clone(),
            vec![
                sh("echo run >> count.txt"),
                sh("mkdir -p build/src/cysignals && printf 'A\\nB\\n' > build/src/cysignals/__init__.pxd"),
            ],
            tmp.path().to_path_buf(),
        );

        assert_eq!(resolver.fragment().unwrap().as_str(), "A\nB\n");
        assert_eq!(resolver.fragment().unwrap().as_str(), "A\nB\n");

        let count = std::fs::read_to_string(tmp.path().join("count.txt")).unwrap();
        assert_eq!(count.lines().count(), 1);
    }

    #[test]
    fn test_fragment_still_missing_is_error() {
        let tmp = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(
            fragment_path(tmp.path()),
            vec![sh("true")],
            tmp.path().to_path_buf(),
        );

        let err = resolver.fragment().unwrap_err();
        match err {
            ConfigureError::MissingFragment { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failing_command_stops_configure() {
        let tmp = TempDir::new().unwrap();
        let resolver = ConfigResolver::new(
            fragment_path(tmp.path()),
            vec![sh("exit 7"), sh("touch second-ran")],
            tmp.path().to_path_buf(),
        );

        let err = resolver.fragment().unwrap_err();
        match err {
            ConfigureError::Command(process) => assert_eq!(process.exit_code(), Some(7)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!tmp.path().join("second-ran").exists());
    }
}
