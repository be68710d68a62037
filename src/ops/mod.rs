//! High-level operations.
//!
//! This module contains the implementation of cybuild commands.

pub mod configure;
pub mod cybuild_build;
pub mod cybuild_build_ext;
pub mod cybuild_build_py;
pub mod cybuild_clean;

pub use configure::configure;
pub use cybuild_build::{build, BuildResult};
pub use cybuild_build_ext::{
    build_ext, compile_extensions, prepare_extensions, BuildExtOptions, BuildExtResult,
};
pub use cybuild_build_py::{build_py, collect_data_files, BuildPyResult};
pub use cybuild_clean::{clean, CleanOptions, CleanResult};
