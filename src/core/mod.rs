//! Core data model: manifest, extensions, packages and layout.

pub mod extension;
pub mod layout;
pub mod manifest;
pub mod package;
pub mod workspace;

pub use extension::{ExtensionRegistry, ExtensionSpec};
pub use layout::InstallLayout;
pub use manifest::{Manifest, ManifestError};
pub use package::{PackageDescriptor, PackageSet};
pub use workspace::Workspace;
