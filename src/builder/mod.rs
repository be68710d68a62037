//! Extension build pipeline.
//!
//! This module resolves the configure fragment, generates the installed
//! `__init__.pxd`, translates Cython sources to C, compiles them into
//! extension modules and stages package data in the build library.

pub mod compile;
pub mod configure;
pub mod context;
pub mod data_files;
pub mod fingerprint;
pub mod init_pxd;
pub mod python;
pub mod translate;

pub use compile::{Artifact, ExtensionCompiler};
pub use configure::{ConfigFragment, ConfigProvider, ConfigResolver, ConfigureError};
pub use context::{BuildContext, LayoutOptions};
pub use data_files::PackageDataCollector;
pub use fingerprint::FingerprintCache;
pub use init_pxd::{generate_init_descriptor, InitDescriptor};
pub use python::PythonInfo;
pub use translate::{CompiledExtension, CythonTranslator, Translator};
