//! Test utilities and mocks for cybuild unit tests.
//!
//! This module provides stand-ins for the external boundaries of a build:
//! the configure step and the Cython translator. Fixture projects live in
//! [`fixtures`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cybuild::test_support::{ProjectFixture, StaticFragment};
//!
//! #[test]
//! fn test_example() {
//!     let project = ProjectFixture::cysignals().create();
//!     let ws = project.workspace();
//!     let provider = StaticFragment::new("# distutils: libraries = m\n");
//!     // Use the provider in place of the configure step...
//! }
//! ```

pub mod fixtures;

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use anyhow::Result;

use crate::builder::configure::{ConfigFragment, ConfigProvider, ConfigureError};
use crate::builder::translate::{CompiledExtension, Translator};
use crate::core::ExtensionRegistry;

// Re-export fixtures for convenience
pub use fixtures::*;

/// [`ConfigProvider`] returning a canned fragment.
///
/// Counts how often it was asked, so tests can check the configure step
/// is consulted once.
#[derive(Debug, Default)]
pub struct StaticFragment {
    text: String,
    calls: Cell<usize>,
}

impl StaticFragment {
    pub fn new(text: impl Into<String>) -> Self {
        StaticFragment {
            text: text.into(),
            calls: Cell::new(0),
        }
    }

    /// Number of times the fragment was requested.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ConfigProvider for StaticFragment {
    fn fragment(&self) -> Result<ConfigFragment, ConfigureError> {
        self.calls.set(self.calls.get() + 1);
        Ok(ConfigFragment::new(self.text.clone()))
    }
}

/// [`Translator`] that records what it was asked to translate.
///
/// Each `.pyx` source becomes `<root>/build/<source>.c`; other sources
/// pass through. Nothing is written to disk.
#[derive(Debug)]
pub struct MockTranslator {
    root: PathBuf,
    calls: RefCell<Vec<String>>,
}

impl MockTranslator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MockTranslator {
            root: root.into(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Names of the extensions translated so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Translator for MockTranslator {
    fn translate(&self, extensions: &ExtensionRegistry) -> Result<Vec<CompiledExtension>> {
        let mut defs = Vec::with_capacity(extensions.len());
        for ext in extensions {
            self.calls.borrow_mut().push(ext.name.clone());
            let sources = ext
                .sources
                .iter()
                .map(|s| {
                    if s.extension().is_some_and(|e| e == "pyx") {
                        self.root.join("build").join(s).with_extension("c")
                    } else {
                        self.root.join(s)
                    }
                })
                .collect();
            defs.push(CompiledExtension {
                name: ext.name.clone(),
                sources,
                include_dirs: ext.include_dirs.iter().map(|d| self.root.join(d)).collect(),
                depends: ext.depends.iter().map(|d| self.root.join(d)).collect(),
            });
        }
        Ok(defs)
    }
}

/// Test assertion helpers.
pub mod assertions {
    use std::path::Path;

    /// Assert that a file exists and holds exactly `expected`.
    pub fn assert_file_eq(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let actual = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
        assert_eq!(actual, expected, "unexpected content in {}", path.display());
    }

    /// Assert that an error's full chain contains `expected`.
    pub fn assert_error_contains<T: std::fmt::Debug>(
        result: anyhow::Result<T>,
        expected: &str,
    ) {
        match result {
            Ok(v) => panic!("expected error containing '{}', got Ok({:?})", expected, v),
            Err(e) => {
                let msg = format!("{:#}", e);
                assert!(
                    msg.contains(expected),
                    "error '{}' does not contain '{}'",
                    msg,
                    expected
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExtensionSpec;

    #[test]
    fn test_static_fragment_counts_calls() {
        let provider = StaticFragment::new("A\n");
        assert_eq!(provider.fragment().unwrap().as_str(), "A\n");
        provider.fragment().unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_mock_translator_maps_pyx() {
        let translator = MockTranslator::new("/proj");
        let registry = ExtensionRegistry::new(vec![ExtensionSpec::new(
            "cysignals.signals",
            vec![PathBuf::from("src/cysignals/signals.pyx")],
        )]);

        let defs = translator.translate(&registry).unwrap();
        assert_eq!(
            defs[0].sources,
            vec![PathBuf::from("/proj/build/src/cysignals/signals.c")]
        );
        assert_eq!(translator.calls(), vec!["cysignals.signals"]);
    }
}
