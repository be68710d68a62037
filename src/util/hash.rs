//! Hashing utilities for build fingerprints.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    feed(&mut hasher, file)
        .with_context(|| format!("failed to hash file: {}", path.display()))?;

    Ok(hex::encode(hasher.finalize()))
}

fn feed(hasher: &mut Sha256, file: File) -> std::io::Result<()> {
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            return Ok(());
        }
        hasher.update(&buffer[..n]);
    }
}

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add a file's path and contents. Missing files hash as absent.
    pub fn update_file(&mut self, path: &Path) -> Result<&mut Self> {
        self.update_str(&path.to_string_lossy());
        if path.is_file() {
            let digest = sha256_file(path)?;
            self.hasher.update(b"\x01");
            self.update_str(&digest);
        } else {
            self.hasher.update(b"\x00");
        }
        Ok(self)
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
