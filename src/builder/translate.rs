//! Source translation: `.pyx` to C.
//!
//! Generated C lands in the build directory, mirroring each source's path
//! relative to the project root, so the source tree stays clean.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Result;
use serde::Serialize;

use crate::core::{ExtensionRegistry, ExtensionSpec};
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// An extension ready for the C compiler. Paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledExtension {
    /// Dotted module name
    pub name: String,

    /// C sources: generated from Cython sources, or passed through as-is
    pub sources: Vec<PathBuf>,

    pub include_dirs: Vec<PathBuf>,

    pub depends: Vec<PathBuf>,
}

/// Turns extension declarations into compiler-ready definitions.
pub trait Translator {
    /// Translate every extension in order.
    ///
    /// Toolchain failures come back unchanged in the error chain.
    fn translate(&self, extensions: &ExtensionRegistry) -> Result<Vec<CompiledExtension>>;
}

/// [`Translator`] driving the `cython` command-line compiler.
#[derive(Debug, Clone)]
pub struct CythonTranslator {
    cython: PathBuf,
    root: PathBuf,
    build_dir: PathBuf,
    include_path: Vec<PathBuf>,
    force: bool,
    timeout: Option<Duration>,
}

impl CythonTranslator {
    /// `root` anchors the relative paths in the extension specs;
    /// generated files go under `build_dir`.
    pub fn new(cython: PathBuf, root: PathBuf, build_dir: PathBuf) -> Self {
        CythonTranslator {
            cython,
            root,
            build_dir,
            include_path: Vec::new(),
            force: false,
            timeout: None,
        }
    }

    /// Directories searched for `cimport`ed declarations.
    pub fn with_include_path(mut self, dirs: Vec<PathBuf>) -> Self {
        self.include_path = dirs;
        self
    }

    /// Translate even when the generated C is newer than its inputs.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Where the C generated from `source` is written.
    pub fn output_for(&self, source: &Path) -> PathBuf {
        let relative = source.strip_prefix(&self.root).unwrap_or(source);
        let relative = if relative.is_absolute() {
            // Outside the project: keep only the file name
            PathBuf::from(relative.file_name().unwrap_or_default())
        } else {
            relative.to_path_buf()
        };
        self.build_dir.join(relative).with_extension("c")
    }

    fn translate_one(&self, ext: &ExtensionSpec) -> Result<CompiledExtension> {
        let depends: Vec<PathBuf> = ext.depends.iter().map(|d| self.root.join(d)).collect();
        let mut sources = Vec::with_capacity(ext.sources.len());

        for source in &ext.sources {
            let source = self.root.join(source);
            if !is_cython_source(&source) {
                sources.push(source);
                continue;
            }

            let output = self.output_for(&source);
            let mut inputs = depends.clone();
            let pxd = source.with_extension("pxd");
            if pxd.exists() {
                inputs.push(pxd);
            }

            if !self.force && is_up_to_date(&output, &source, &inputs) {
                tracing::debug!("{} is up to date", output.display());
            } else {
                self.run_cython(&source, &output)?;
            }
            sources.push(output);
        }

        Ok(CompiledExtension {
            name: ext.name.clone(),
            sources,
            include_dirs: ext.include_dirs.iter().map(|d| self.root.join(d)).collect(),
            depends,
        })
    }

    fn run_cython(&self, source: &Path, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            ensure_dir(parent)?;
        }

        tracing::info!("Cythonizing {}", source.display());

        let mut cmd = ProcessBuilder::new(&self.cython).cwd(&self.root);
        for dir in &self.include_path {
            cmd = cmd.arg("-I").arg(dir);
        }
        cmd.arg("-o")
            .arg(output)
            .arg(source)
            .timeout(self.timeout)
            .status_and_check()?;

        Ok(())
    }
}

impl Translator for CythonTranslator {
    fn translate(&self, extensions: &ExtensionRegistry) -> Result<Vec<CompiledExtension>> {
        extensions.iter().map(|ext| self.translate_one(ext)).collect()
    }
}

fn is_cython_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("pyx") | Some("py")
    )
}

/// `output` exists and is at least as new as `source` and every input.
fn is_up_to_date(output: &Path, source: &Path, inputs: &[PathBuf]) -> bool {
    let Some(out_time) = modified(output) else {
        return false;
    };
    std::iter::once(source)
        .chain(inputs.iter().map(PathBuf::as_path))
        .all(|input| modified(input).is_some_and(|t| t <= out_time))
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::process::ProcessError;
    use tempfile::TempDir;

    fn translator(root: &Path, cython: &str) -> CythonTranslator {
        CythonTranslator::new(PathBuf::from(cython), root.to_path_buf(), root.join("build"))
            .with_include_path(vec![PathBuf::from("src")])
    }

    #[test]
    fn test_output_for_mirrors_source_tree() {
        let root = Path::new("/proj");
        let t = translator(root, "cython");
        assert_eq!(
            t.output_for(&root.join("src/cysignals/signals.pyx")),
            PathBuf::from("/proj/build/src/cysignals/signals.c")
        );
    }

    #[test]
    fn test_c_sources_pass_through() {
        let tmp = TempDir::new().unwrap();
        let registry = ExtensionRegistry::new(vec![ExtensionSpec::new(
            "demo.helper",
            vec![PathBuf::from("src/helper.c")],
        )
        .with_include_dirs([PathBuf::from("src")])]);

        // No cython binary needed for plain C
        let defs = translator(tmp.path(), "/nonexistent/cython")
            .translate(&registry)
            .unwrap();

        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].sources, vec![tmp.path().join("src/helper.c")]);
        assert_eq!(defs[0].include_dirs, vec![tmp.path().join("src")]);
    }

    #[test]
    fn test_up_to_date_output_skips_toolchain() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src/demo");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("mod.pyx"), "def f(): pass\n").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        let out = tmp.path().join("build/src/demo/mod.c");
        std::fs::create_dir_all(out.parent().unwrap()).unwrap();
        std::fs::write(&out, "/* generated */").unwrap();

        let registry = ExtensionRegistry::new(vec![ExtensionSpec::new(
            "demo.mod",
            vec![PathBuf::from("src/demo/mod.pyx")],
        )]);

        let defs = translator(tmp.path(), "/nonexistent/cython")
            .translate(&registry)
            .unwrap();
        assert_eq!(defs[0].sources, vec![out]);
    }

    #[cfg(unix)]
    #[test]
    fn test_toolchain_error_propagates_unchanged() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src/demo");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("mod.pyx"), "def f(:\n").unwrap();

        let registry = ExtensionRegistry::new(vec![ExtensionSpec::new(
            "demo.mod",
            vec![PathBuf::from("src/demo/mod.pyx")],
        )]);

        // `false` stands in for a cython that reports a syntax error
        let err = translator(tmp.path(), "false")
            .translate(&registry)
            .unwrap_err();

        let process = err.downcast_ref::<ProcessError>().unwrap();
        assert_eq!(process.exit_code(), Some(1));
    }

    #[test]
    fn test_is_up_to_date_missing_output() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("a.pyx");
        std::fs::write(&src, "").unwrap();
        assert!(!is_up_to_date(&tmp.path().join("a.c"), &src, &[]));
    }
}
