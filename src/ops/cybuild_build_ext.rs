//! Implementation of `cybuild build-ext`.

use anyhow::{bail, Result};

use crate::builder::compile::{Artifact, ExtensionCompiler};
use crate::builder::configure::ConfigProvider;
use crate::builder::fingerprint::FingerprintCache;
use crate::builder::init_pxd::{generate_init_descriptor, InitDescriptor};
use crate::builder::translate::{CompiledExtension, CythonTranslator, Translator};
use crate::builder::BuildContext;
use crate::core::{InstallLayout, Workspace};

/// Options for the build-ext command.
#[derive(Debug, Clone)]
pub struct BuildExtOptions {
    /// Rebuild even if outputs look current
    pub force: bool,

    /// Compile and link after translating
    pub compile: bool,

    /// Specific extensions to build (empty = all)
    pub extensions: Vec<String>,
}

impl Default for BuildExtOptions {
    fn default() -> Self {
        BuildExtOptions {
            force: false,
            compile: true,
            extensions: Vec::new(),
        }
    }
}

/// Build-ext result.
#[derive(Debug)]
pub struct BuildExtResult {
    /// The installed descriptor
    pub descriptor: InitDescriptor,

    /// Compiler-ready extension definitions
    pub translated: Vec<CompiledExtension>,

    /// Built extension modules (empty with `compile = false`)
    pub artifacts: Vec<Artifact>,
}

/// Validate that all requested extensions are declared.
///
/// This prevents silent no-ops when the user names a nonexistent module.
fn validate_extension_filter(ws: &Workspace, names: &[String]) -> Result<()> {
    let declared = &ws.manifest().extensions;

    for requested in names {
        if declared.get(requested).is_none() {
            let available: Vec<&str> = declared.iter().map(|e| e.name.as_str()).collect();
            bail!(
                "unknown extension `{}`\n\
                 available extensions: {}",
                requested,
                if available.is_empty() {
                    "(none)".to_string()
                } else {
                    available.join(", ")
                }
            );
        }
    }

    Ok(())
}

/// Generate the descriptor, then translate the selected extensions.
///
/// The descriptor is written first so a failing translation still leaves
/// it in place.
pub fn prepare_extensions(
    ws: &Workspace,
    layout: &InstallLayout,
    provider: &dyn ConfigProvider,
    translator: &dyn Translator,
    opts: &BuildExtOptions,
) -> Result<BuildExtResult> {
    validate_extension_filter(ws, &opts.extensions)?;

    let descriptor = generate_init_descriptor(layout, ws.package_name(), provider)?;

    let selected = ws.manifest().extensions.filter(&opts.extensions);
    let translated = translator.translate(&selected)?;

    Ok(BuildExtResult {
        descriptor,
        translated,
        artifacts: Vec::new(),
    })
}

/// Compile translated extensions, keeping the fingerprint cache current.
pub fn compile_extensions(
    bcx: &BuildContext<'_>,
    translated: &[CompiledExtension],
    force: bool,
) -> Result<Vec<Artifact>> {
    if translated.is_empty() {
        return Ok(Vec::new());
    }

    let ws = bcx.workspace();
    let python = bcx.python()?;
    let toolchain = &bcx.config().toolchain;

    let compiler = ExtensionCompiler::new(
        bcx.c_compiler()?,
        ws.root().to_path_buf(),
        ws.temp_dir(),
        ws.build_lib(),
        python.ext_suffix.clone(),
    )
    .with_python_include(python.include.clone())
    .with_flags(toolchain.cflags.clone(), toolchain.ldflags.clone())
    .with_timeout(bcx.timeout());

    let cache_path = ws.fingerprint_path();
    let mut cache = FingerprintCache::load(&cache_path);

    let built: Result<Vec<Artifact>> = translated
        .iter()
        .map(|ext| compiler.build(ext, &mut cache, force))
        .collect();

    // Keep what did build, even when a later extension failed
    cache.save(&cache_path)?;
    built
}

/// Run the whole build-ext step against the real toolchain.
pub fn build_ext(bcx: &BuildContext<'_>, opts: &BuildExtOptions) -> Result<BuildExtResult> {
    let ws = bcx.workspace();
    validate_extension_filter(ws, &opts.extensions)?;
    let resolver = bcx.config_resolver();

    let translator = CythonTranslator::new(
        bcx.cython_executable()?,
        ws.root().to_path_buf(),
        ws.build_dir(),
    )
    .with_include_path(vec![ws.source_root()])
    .with_force(opts.force)
    .with_timeout(bcx.timeout());

    let mut result = prepare_extensions(ws, bcx.layout(), &resolver, &translator, opts)?;

    if opts.compile {
        result.artifacts = compile_extensions(bcx, &result.translated, opts.force)?;
        let fresh = result.artifacts.iter().filter(|a| a.fresh).count();
        tracing::info!(
            "Finished {} extension(s), {} rebuilt",
            result.artifacts.len(),
            fresh
        );
    }

    Ok(result)
}
