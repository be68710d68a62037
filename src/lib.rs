//! Cybuild - build orchestration for Cython extension packages
//!
//! This crate provides the library behind the `cybuild` command: manifest
//! loading, configure-step resolution, descriptor generation, Cython
//! translation, extension compilation and package-data staging.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test fixtures and mocks for cybuild unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use core::{
    extension::{ExtensionRegistry, ExtensionSpec},
    manifest::Manifest,
    package::{PackageDescriptor, PackageSet},
    workspace::Workspace,
};

pub use util::context::GlobalContext;
