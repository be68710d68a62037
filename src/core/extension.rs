//! Extension module declarations.
//!
//! An [`ExtensionSpec`] names one compiled module and the translation units
//! it is built from. The [`ExtensionRegistry`] is the immutable, ordered
//! list of every extension a build produces.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A declared extension module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionSpec {
    /// Dotted module name (e.g., `cysignals.signals`)
    pub name: String,

    /// Translation units, relative to the project root
    pub sources: Vec<PathBuf>,

    /// Header search path, in order
    pub include_dirs: Vec<PathBuf>,

    /// Files whose changes make the extension stale
    pub depends: Vec<PathBuf>,
}

impl ExtensionSpec {
    /// Create an extension with no include directories or dependencies.
    pub fn new(name: impl Into<String>, sources: Vec<PathBuf>) -> Self {
        ExtensionSpec {
            name: name.into(),
            sources,
            include_dirs: Vec::new(),
            depends: Vec::new(),
        }
    }

    /// Append include directories, skipping ones already present.
    pub fn with_include_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        for dir in dirs {
            if !self.include_dirs.contains(&dir) {
                self.include_dirs.push(dir);
            }
        }
        self
    }

    /// Append dependency files, skipping ones already present.
    pub fn with_depends(mut self, depends: impl IntoIterator<Item = PathBuf>) -> Self {
        for dep in depends {
            if !self.depends.contains(&dep) {
                self.depends.push(dep);
            }
        }
        self
    }
}

/// Output path of the built module `module` under `lib_dir`.
///
/// `cysignals.signals` becomes `<lib_dir>/cysignals/signals<ext_suffix>`.
pub fn module_output_path(lib_dir: &Path, module: &str, ext_suffix: &str) -> PathBuf {
    let mut path = lib_dir.to_path_buf();
    path.extend(module.split('.'));
    let stem = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.set_file_name(format!("{}{}", stem, ext_suffix));
    path
}

/// The ordered set of extensions built by a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtensionRegistry {
    extensions: Vec<ExtensionSpec>,
}

impl ExtensionRegistry {
    pub fn new(extensions: Vec<ExtensionSpec>) -> Self {
        ExtensionRegistry { extensions }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtensionSpec> {
        self.extensions.iter()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Look up an extension by dotted name.
    pub fn get(&self, name: &str) -> Option<&ExtensionSpec> {
        self.extensions.iter().find(|e| e.name == name)
    }

    /// Keep only the named extensions, preserving declaration order.
    pub fn filter(&self, names: &[String]) -> ExtensionRegistry {
        ExtensionRegistry {
            extensions: self
                .extensions
                .iter()
                .filter(|e| names.iter().any(|n| *n == e.name))
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ExtensionRegistry {
    type Item = &'a ExtensionSpec;
    type IntoIter = std::slice::Iter<'a, ExtensionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.extensions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> ExtensionSpec {
        ExtensionSpec::new(
            "cysignals.signals",
            vec![PathBuf::from("src/cysignals/signals.pyx")],
        )
    }

    #[test]
    fn test_module_output_path() {
        let out = module_output_path(
            Path::new("build/lib"),
            &signals().name,
            ".cpython-311-x86_64-linux-gnu.so",
        );
        assert_eq!(
            out,
            PathBuf::from("build/lib/cysignals/signals.cpython-311-x86_64-linux-gnu.so")
        );
    }

    #[test]
    fn test_with_include_dirs_dedups() {
        let ext = signals()
            .with_include_dirs([PathBuf::from("src/cysignals"), PathBuf::from("build/src")])
            .with_include_dirs([PathBuf::from("src/cysignals")]);

        assert_eq!(
            ext.include_dirs,
            vec![PathBuf::from("src/cysignals"), PathBuf::from("build/src")]
        );
    }

    #[test]
    fn test_registry_lookup_and_filter() {
        let registry = ExtensionRegistry::new(vec![
            signals(),
            ExtensionSpec::new("cysignals.alarm", vec![PathBuf::from("src/cysignals/alarm.pyx")]),
        ]);

        assert_eq!(registry.len(), 2);
        assert!(registry.get("cysignals.alarm").is_some());
        assert!(registry.get("cysignals.tests").is_none());

        let only = registry.filter(&["cysignals.alarm".to_string()]);
        assert_eq!(only.len(), 1);
        assert_eq!(only.iter().next().unwrap().name, "cysignals.alarm");
    }
}
