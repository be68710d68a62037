//! Compile and link translated extensions into loadable modules.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::builder::fingerprint::{extension_fingerprint, CompileInputs, FingerprintCache};
use crate::builder::translate::CompiledExtension;
use crate::core::extension::module_output_path;
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// A built extension module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Dotted module name
    pub name: String,

    /// Path of the shared object
    pub path: PathBuf,

    /// `false` if the cached build was reused
    pub fresh: bool,
}

/// Drives the C compiler over [`CompiledExtension`]s.
#[derive(Debug, Clone)]
pub struct ExtensionCompiler {
    cc: PathBuf,
    root: PathBuf,
    temp_dir: PathBuf,
    build_lib: PathBuf,
    ext_suffix: String,
    python_include: Option<PathBuf>,
    cflags: Vec<String>,
    ldflags: Vec<String>,
    timeout: Option<Duration>,
}

impl ExtensionCompiler {
    pub fn new(
        cc: PathBuf,
        root: PathBuf,
        temp_dir: PathBuf,
        build_lib: PathBuf,
        ext_suffix: impl Into<String>,
    ) -> Self {
        ExtensionCompiler {
            cc,
            root,
            temp_dir,
            build_lib,
            ext_suffix: ext_suffix.into(),
            python_include: None,
            cflags: Vec::new(),
            ldflags: Vec::new(),
            timeout: None,
        }
    }

    /// Directory containing `Python.h`, searched after the extension's own.
    pub fn with_python_include(mut self, dir: PathBuf) -> Self {
        self.python_include = Some(dir);
        self
    }

    pub fn with_flags(mut self, cflags: Vec<String>, ldflags: Vec<String>) -> Self {
        self.cflags = cflags;
        self.ldflags = ldflags;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Output path of the shared object for `ext`.
    pub fn output_path(&self, ext: &CompiledExtension) -> PathBuf {
        module_output_path(&self.build_lib, &ext.name, &self.ext_suffix)
    }

    /// Fingerprint of `ext` built with this compiler setup.
    pub fn fingerprint(&self, ext: &CompiledExtension) -> Result<String> {
        extension_fingerprint(
            ext,
            &CompileInputs {
                compiler: &self.cc,
                cflags: &self.cflags,
                ldflags: &self.ldflags,
                python_include: self.python_include.as_deref(),
                ext_suffix: &self.ext_suffix,
            },
        )
    }

    /// Object file for `source`, mirroring its path under the temp dir.
    fn object_path(&self, source: &Path) -> PathBuf {
        let relative = source.strip_prefix(&self.root).unwrap_or(source);
        let relative = relative
            .strip_prefix("/")
            .unwrap_or(relative);
        self.temp_dir.join(relative).with_extension("o")
    }

    /// Build `ext` unless `cache` says nothing changed.
    pub fn build(
        &self,
        ext: &CompiledExtension,
        cache: &mut FingerprintCache,
        force: bool,
    ) -> Result<Artifact> {
        let output = self.output_path(ext);
        let fingerprint = self.fingerprint(ext)?;

        if !force && output.exists() && !cache.is_stale(&ext.name, &fingerprint) {
            tracing::debug!("skipping `{}` (up to date)", ext.name);
            return Ok(Artifact {
                name: ext.name.clone(),
                path: output,
                fresh: false,
            });
        }

        tracing::info!("Compiling {}", ext.name);

        let mut objects = Vec::with_capacity(ext.sources.len());
        for source in &ext.sources {
            objects.push(self.compile(ext, source)?);
        }
        self.link(&objects, &output)?;

        cache.update(ext.name.clone(), fingerprint);

        Ok(Artifact {
            name: ext.name.clone(),
            path: output,
            fresh: true,
        })
    }

    fn compile(&self, ext: &CompiledExtension, source: &Path) -> Result<PathBuf> {
        let object = self.object_path(source);
        if let Some(parent) = object.parent() {
            ensure_dir(parent)?;
        }

        let mut cmd = ProcessBuilder::new(&self.cc)
            .cwd(&self.root)
            .timeout(self.timeout)
            .args(["-c", "-fPIC"]);
        for dir in ext.include_dirs.iter().chain(self.python_include.iter()) {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }
        cmd = cmd
            .args(&self.cflags)
            .arg(source)
            .arg("-o")
            .arg(&object);

        tracing::debug!("Compiling {} -> {}", source.display(), object.display());
        cmd.exec_and_check()
            .with_context(|| format!("compilation failed for {}", source.display()))?;

        Ok(object)
    }

    fn link(&self, objects: &[PathBuf], output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            ensure_dir(parent)?;
        }

        let mut cmd = ProcessBuilder::new(&self.cc)
            .cwd(&self.root)
            .timeout(self.timeout)
            .arg("-shared");
        if cfg!(target_os = "macos") {
            // Python symbols resolve at import time
            cmd = cmd.args(["-undefined", "dynamic_lookup"]);
        }
        cmd = cmd
            .args(objects)
            .arg("-o")
            .arg(output)
            .args(&self.ldflags);

        tracing::debug!("Linking {}", output.display());
        cmd.exec_and_check()
            .with_context(|| format!("linking failed for {}", output.display()))?;

        Ok(())
    }
}
