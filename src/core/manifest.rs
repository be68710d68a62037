//! Cybuild.toml manifest parsing and schema.
//!
//! The manifest declares the package, its extension modules, its data
//! files and the external configure step. All paths are relative to the
//! directory holding the manifest.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::extension::{ExtensionRegistry, ExtensionSpec};
use crate::core::package::PackageSet;
use crate::util::fs::{glob_files, relative_path};

/// File name of the manifest.
pub const MANIFEST_NAME: &str = "Cybuild.toml";

/// Errors locating or reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `Cybuild.toml` in `{}` or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },

    #[error("failed to read `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{}`", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest `{}`: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Package metadata from the [package] section.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageMetadata {
    /// Package name; also the directory the generated descriptor lands in
    pub name: String,

    /// Version string
    #[serde(default)]
    pub version: Option<String>,

    /// File holding the version string (used when `version` is absent)
    #[serde(default)]
    pub version_file: Option<PathBuf>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub license: Option<String>,
}

/// Build directory layout from the [build] section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSettings {
    /// Scratch directory for generated sources and configure output
    pub build_dir: PathBuf,

    /// Staging directory mirroring the install tree
    pub build_lib: Option<PathBuf>,

    /// Root of the source tree, used as the Cython include path
    pub source_root: PathBuf,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            build_dir: PathBuf::from("build"),
            build_lib: None,
            source_root: PathBuf::from("src"),
        }
    }
}

impl BuildSettings {
    /// The build library directory, defaulting to `<build-dir>/lib`.
    pub fn build_lib(&self) -> PathBuf {
        self.build_lib
            .clone()
            .unwrap_or_else(|| self.build_dir.join("lib"))
    }
}

/// The external configure step from the [configure] section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigureSettings {
    /// Commands run in order; each is a program followed by its arguments
    pub commands: Vec<Vec<String>>,
}

impl Default for ConfigureSettings {
    fn default() -> Self {
        ConfigureSettings {
            commands: vec![
                vec!["make".to_string(), "configure".to_string()],
                vec!["sh".to_string(), "configure".to_string()],
            ],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct ExtensionDefaults {
    include_dirs: Vec<PathBuf>,
    depends: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TomlExtension {
    name: String,
    sources: Vec<PathBuf>,
    #[serde(default)]
    include_dirs: Vec<PathBuf>,
    #[serde(default)]
    depends: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TomlManifest {
    package: PackageMetadata,
    #[serde(default)]
    packages: Vec<String>,
    #[serde(default)]
    scripts: Vec<String>,
    #[serde(default)]
    build: BuildSettings,
    #[serde(default)]
    extension_defaults: ExtensionDefaults,
    #[serde(default, rename = "extension")]
    extensions: Vec<TomlExtension>,
    #[serde(default)]
    package_dir: BTreeMap<String, PathBuf>,
    #[serde(default)]
    package_data: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    configure: ConfigureSettings,
}

/// The parsed and validated manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub package: PackageMetadata,
    pub build: BuildSettings,
    pub extensions: ExtensionRegistry,
    pub packages: PackageSet,
    pub configure: ConfigureSettings,
    /// Script glob patterns
    pub scripts: Vec<String>,
    /// The directory containing this manifest
    pub manifest_dir: PathBuf,
}

impl Manifest {
    /// Load and validate a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or(Path::new("."));
        Self::parse(&contents, path, dir)
    }

    /// Parse manifest text. `dir` anchors relative paths and globs.
    pub fn parse(contents: &str, path: &Path, dir: &Path) -> Result<Self, ManifestError> {
        let raw: TomlManifest = toml::from_str(contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let invalid = |message: String| ManifestError::Invalid {
            path: path.to_path_buf(),
            message,
        };

        if raw.package.name.trim().is_empty() {
            return Err(invalid("package name must not be empty".to_string()));
        }

        let default_depends = expand_depends(dir, &raw.extension_defaults.depends)
            .map_err(|e| invalid(format!("{:#}", e)))?;

        let mut seen = HashSet::new();
        let mut extensions = Vec::with_capacity(raw.extensions.len());
        for ext in raw.extensions {
            if ext.name.is_empty() || ext.name.split('.').any(str::is_empty) {
                return Err(invalid(format!("invalid extension name `{}`", ext.name)));
            }
            if !seen.insert(ext.name.clone()) {
                return Err(invalid(format!("duplicate extension `{}`", ext.name)));
            }
            if ext.sources.is_empty() {
                return Err(invalid(format!("extension `{}` has no sources", ext.name)));
            }

            let depends =
                expand_depends(dir, &ext.depends).map_err(|e| invalid(format!("{:#}", e)))?;

            extensions.push(
                ExtensionSpec::new(ext.name, ext.sources)
                    .with_include_dirs(raw.extension_defaults.include_dirs.iter().cloned())
                    .with_include_dirs(ext.include_dirs)
                    .with_depends(default_depends.iter().cloned())
                    .with_depends(depends),
            );
        }

        Ok(Manifest {
            package: raw.package,
            build: raw.build,
            extensions: ExtensionRegistry::new(extensions),
            packages: PackageSet::new(raw.packages, raw.package_dir, raw.package_data),
            configure: raw.configure,
            scripts: raw.scripts,
            manifest_dir: dir.to_path_buf(),
        })
    }

    /// The package version, reading `version-file` if needed.
    pub fn version(&self) -> anyhow::Result<Option<String>> {
        if let Some(ref version) = self.package.version {
            return Ok(Some(version.clone()));
        }
        match self.package.version_file {
            Some(ref file) => {
                let text = crate::util::fs::read_to_string(&self.manifest_dir.join(file))?;
                Ok(Some(text.trim().to_string()))
            }
            None => Ok(None),
        }
    }
}

/// Expand dependency globs into paths relative to `dir`.
fn expand_depends(dir: &Path, patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    Ok(glob_files(dir, patterns)?
        .into_iter()
        .map(|p| relative_path(dir, &p))
        .collect())
}
