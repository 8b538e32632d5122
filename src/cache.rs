//! Incremental regeneration cache.
//!
//! Remembers, per output file, a hash of everything that went into it (options
//! and input contents). A matching entry with the output still on disk means
//! the pass can be skipped.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub output: String,
}

pub struct IncrementalCache {
    cache_dir: PathBuf,
}

impl IncrementalCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).ok();
        }
        Self { cache_dir }
    }

    pub fn compute_hash<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            // Length prefix keeps ("ab", "c") and ("a", "bc") apart
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        format!("{:x}", hasher.finalize())
    }

    fn get_cache_path(&self, output: &Path) -> PathBuf {
        let safe_name = output
            .to_string_lossy()
            .replace(['/', '\\', ':'], "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    /// True when `output` exists and was produced from inputs hashing to `hash`.
    pub fn is_fresh(&self, output: &Path, hash: &str) -> bool {
        if !output.exists() {
            return false;
        }
        let cache_path = self.get_cache_path(output);
        let Ok(data) = fs::read_to_string(&cache_path) else {
            return false;
        };

        match serde_json::from_str::<CacheEntry>(&data) {
            Ok(entry) => entry.hash == hash,
            Err(e) => {
                warn!("Cache entry for {} is corrupt: {}", output.display(), e);
                fs::remove_file(cache_path).ok();
                false
            }
        }
    }

    pub fn store(&self, output: &Path, hash: &str) {
        let entry = CacheEntry {
            hash: hash.to_string(),
            output: output.to_string_lossy().to_string(),
        };
        if let Ok(data) = serde_json::to_string(&entry) {
            if let Err(e) = fs::write(self.get_cache_path(output), data) {
                warn!("Failed to record cache entry for {}: {}", output.display(), e);
            }
        }
    }
}
