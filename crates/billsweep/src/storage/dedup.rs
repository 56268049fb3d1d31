use std::collections::HashMap;

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of attachment bytes.
pub fn content_digest(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Digests written during one scan, mapped to the filename each was saved
/// under. Lives exactly as long as the scan that owns it.
#[derive(Debug, Default)]
pub struct DedupTable {
    written: HashMap<String, String>,
}

impl DedupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filename already written for `digest`, if any.
    pub fn get(&self, digest: &str) -> Option<&str> {
        self.written.get(digest).map(|s| s.as_str())
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.written.contains_key(digest)
    }

    /// Records a write. The first filename recorded for a digest is kept.
    pub(crate) fn record(&mut self, digest: String, filename: String) {
        self.written.entry(digest).or_insert(filename);
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}
