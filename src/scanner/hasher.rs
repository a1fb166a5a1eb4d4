//! Streaming content hasher.
//!
//! # Overview
//!
//! The [`Hasher`] turns a path into a 32-byte content fingerprint by reading
//! the entire file. It holds only immutable settings, so one instance can be
//! shared behind an `Arc` by every hashing worker without coordination.
//!
//! BLAKE3 is the default algorithm. SHA-256 is available for output that
//! matches `sha256sum`.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("Cargo.toml")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::HashError;

/// A content fingerprint.
pub type Hash = [u8; 32];

/// Read buffer used when streaming a file through the hasher.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Files at least this large are memory-mapped when mmap is enabled.
pub const DEFAULT_MMAP_THRESHOLD: u64 = 16 * 1024 * 1024;

/// Digest used to fingerprint file content.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 (fast, default)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Lowercase name used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// File content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    buffer_size: usize,
    use_mmap: bool,
    mmap_threshold: u64,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a BLAKE3 hasher with default buffering.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::Blake3,
            buffer_size: DEFAULT_BUFFER_SIZE,
            use_mmap: true,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }

    /// Select the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the streaming buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Enable or disable memory-mapped hashing of large files (BLAKE3 only).
    #[must_use]
    pub fn with_mmap(mut self, enabled: bool) -> Self {
        self.use_mmap = enabled;
        self
    }

    /// Set the size at which files are memory-mapped instead of streamed.
    #[must_use]
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read to the end,
    /// for example because it was removed after discovery.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;

        match self.algorithm {
            HashAlgorithm::Blake3 => {
                if self.use_mmap && self.should_mmap(&file) {
                    log::trace!("Memory-mapping {}", path.display());
                    let mut hasher = blake3::Hasher::new();
                    hasher
                        .update_mmap(path)
                        .map_err(|e| HashError::from_io(path, e))?;
                    return Ok(*hasher.finalize().as_bytes());
                }

                let mut hasher = blake3::Hasher::new();
                self.stream(path, file, |chunk| {
                    hasher.update(chunk);
                })?;
                Ok(*hasher.finalize().as_bytes())
            }
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                self.stream(path, file, |chunk| hasher.update(chunk))?;
                Ok(hasher.finalize().into())
            }
        }
    }

    /// Hash an in-memory buffer with the configured algorithm.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> Hash {
        match self.algorithm {
            HashAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
            HashAlgorithm::Sha256 => Sha256::digest(data).into(),
        }
    }

    fn should_mmap(&self, file: &File) -> bool {
        file.metadata()
            .map(|m| m.len() >= self.mmap_threshold)
            .unwrap_or(false)
    }

    fn stream(
        &self,
        path: &Path,
        mut file: File,
        mut update: impl FnMut(&[u8]),
    ) -> Result<(), HashError> {
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            match file.read(&mut buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => update(&buffer[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            }
        }
    }
}

/// Render a hash as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    use std::fmt::Write;

    hash.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Parse a 64-character hex string back into a hash.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Hash> {
    if hex.len() != 64 || !hex.is_ascii() {
        return None;
    }

    let mut hash = [0u8; 32];
    for (i, byte) in hash.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(hash)
}
