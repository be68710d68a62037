//! Target Python interpreter queries.
//!
//! The interpreter is asked once for its install paths and extension
//! suffix; the answer comes back as a single JSON object.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util::process::ProcessBuilder;

const QUERY: &str = r#"
import json, sys, sysconfig
prefix = sys.argv[1] if len(sys.argv) > 1 else None
scheme_vars = {"base": prefix, "platbase": prefix} if prefix else None
print(json.dumps({
    "platlib": sysconfig.get_path("platlib", vars=scheme_vars),
    "include": sysconfig.get_path("include"),
    "ext_suffix": sysconfig.get_config_var("EXT_SUFFIX") or ".so",
    "version": "%d.%d" % sys.version_info[:2],
}))
"#;

/// Facts about the interpreter extensions are built for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PythonInfo {
    /// Platform-library install directory
    pub platlib: PathBuf,

    /// Directory containing `Python.h`
    pub include: PathBuf,

    /// File suffix of extension modules (e.g., `.cpython-311-x86_64-linux-gnu.so`)
    pub ext_suffix: String,

    /// `major.minor`
    pub version: String,
}

impl PythonInfo {
    /// Run `python` and collect its layout, optionally relocated under `prefix`.
    pub fn query(
        python: &Path,
        prefix: Option<&Path>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut cmd = ProcessBuilder::new(python)
            .arg("-c")
            .arg(QUERY)
            .timeout(timeout);
        if let Some(prefix) = prefix {
            cmd = cmd.arg(prefix);
        }

        let output = cmd.exec_and_check()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = Self::parse(&stdout).with_context(|| {
            format!("unexpected output from `{}`", python.display())
        })?;

        tracing::debug!(
            "python {} platlib={} ext_suffix={}",
            info.version,
            info.platlib.display(),
            info.ext_suffix
        );
        Ok(info)
    }

    /// Parse the JSON printed by the interpreter query.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text.trim())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let info = PythonInfo::parse(
            r#"{"platlib": "/usr/lib/python3.11/site-packages",
                "include": "/usr/include/python3.11",
                "ext_suffix": ".cpython-311-x86_64-linux-gnu.so",
                "version": "3.11"}
"#,
        )
        .unwrap();

        assert_eq!(info.platlib, PathBuf::from("/usr/lib/python3.11/site-packages"));
        assert_eq!(info.ext_suffix, ".cpython-311-x86_64-linux-gnu.so");
        assert_eq!(info.version, "3.11");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(PythonInfo::parse("Traceback (most recent call last):").is_err());
    }
}
