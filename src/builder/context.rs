//! Build context - install layout, tools and process policy.

use std::cell::OnceCell;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::builder::configure::ConfigResolver;
use crate::builder::python::PythonInfo;
use crate::core::{InstallLayout, Workspace};
use crate::util::config::Config;
use crate::util::process::{find_c_compiler, find_executable, find_python};

/// Command-line overrides for install-layout finalization.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    /// Use this platform-library directory instead of asking the interpreter
    pub platlib: Option<PathBuf>,

    /// Installation prefix handed to the interpreter query
    pub prefix: Option<PathBuf>,
}

/// Everything a build step needs besides its own inputs.
///
/// The install layout is finalized when the context is created. The
/// interpreter is only queried when something needs it.
#[derive(Debug)]
pub struct BuildContext<'a> {
    ws: &'a Workspace,
    config: Config,
    layout: InstallLayout,
    prefix: Option<PathBuf>,
    python: OnceCell<PythonInfo>,
}

impl<'a> BuildContext<'a> {
    /// Finalize the install layout for `ws`.
    ///
    /// Precedence for the platform-library directory: `opts.platlib`, then
    /// `[install] platlib` from config, then the interpreter.
    pub fn new(ws: &'a Workspace, config: Config, opts: &LayoutOptions) -> Result<Self> {
        let prefix = opts.prefix.clone().or_else(|| config.install.prefix.clone());
        let mut bcx = BuildContext {
            ws,
            config,
            layout: InstallLayout::new(PathBuf::new(), ws.build_lib()),
            prefix,
            python: OnceCell::new(),
        };

        let platlib = match opts
            .platlib
            .clone()
            .or_else(|| bcx.config.install.platlib.clone())
        {
            Some(platlib) => platlib,
            None => bcx.python()?.platlib.clone(),
        };
        tracing::debug!("install platlib: {}", platlib.display());

        bcx.layout = InstallLayout::new(platlib, ws.build_lib());
        Ok(bcx)
    }

    pub fn workspace(&self) -> &Workspace {
        self.ws
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Timeout for external programs, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.config.process.timeout()
    }

    /// The target interpreter's layout, queried on first use.
    pub fn python(&self) -> Result<&PythonInfo> {
        if let Some(info) = self.python.get() {
            return Ok(info);
        }
        let info = PythonInfo::query(&self.python_executable()?, self.prefix.as_deref(), self.timeout())?;
        Ok(self.python.get_or_init(|| info))
    }

    /// Python interpreter: config override or the first one on PATH.
    pub fn python_executable(&self) -> Result<PathBuf> {
        self.config
            .toolchain
            .python
            .clone()
            .or_else(find_python)
            .ok_or_else(|| anyhow!("no Python interpreter found; set `PYTHON` or `[toolchain] python`"))
    }

    /// Cython compiler: config override or `cython` on PATH.
    pub fn cython_executable(&self) -> Result<PathBuf> {
        self.config
            .toolchain
            .cython
            .clone()
            .or_else(|| find_executable("cython"))
            .ok_or_else(|| anyhow!("`cython` not found; install Cython or set `[toolchain] cython`"))
    }

    /// C compiler: config override, `CC`, or a common compiler on PATH.
    pub fn c_compiler(&self) -> Result<PathBuf> {
        self.config
            .toolchain
            .cc
            .clone()
            .or_else(find_c_compiler)
            .ok_or_else(|| anyhow!("no C compiler found; set `CC` or `[toolchain] cc`"))
    }

    /// Resolver for the configure fragment of this workspace.
    pub fn config_resolver(&self) -> ConfigResolver {
        ConfigResolver::new(
            self.ws.configure_fragment_path(),
            self.ws.manifest().configure.commands.clone(),
            self.ws.root().to_path_buf(),
        )
        .with_timeout(self.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProjectFixture;

    #[test]
    fn test_platlib_override_skips_interpreter() {
        let project = ProjectFixture::cysignals().create();
        let ws = project.workspace();

        let mut config = Config::default();
        // Would fail if the interpreter were queried
        config.toolchain.python = Some(PathBuf::from("/nonexistent/python"));

        let opts = LayoutOptions {
            platlib: Some(PathBuf::from("/x/y")),
            prefix: None,
        };
        let bcx = BuildContext::new(&ws, config, &opts).unwrap();

        assert_eq!(bcx.layout().platlib(), PathBuf::from("/x/y"));
        assert_eq!(bcx.layout().build_lib(), ws.build_lib());
    }

    #[test]
    fn test_config_platlib_used_when_no_flag() {
        let project = ProjectFixture::cysignals().create();
        let ws = project.workspace();

        let mut config = Config::default();
        config.install.platlib = Some(PathBuf::from("/from/config"));

        let bcx = BuildContext::new(&ws, config, &LayoutOptions::default()).unwrap();
        assert_eq!(bcx.layout().install_dir("cysignals"), PathBuf::from("/from/config/cysignals"));
    }

    #[test]
    fn test_missing_interpreter_is_error() {
        let project = ProjectFixture::cysignals().create();
        let ws = project.workspace();

        let mut config = Config::default();
        config.toolchain.python = Some(PathBuf::from("/nonexistent/python"));

        assert!(BuildContext::new(&ws, config, &LayoutOptions::default()).is_err());
    }
}
