//! Hash-based ID generation for dependency edges.
//!
//! Creates collision-resistant edge IDs using SHA-256 and base36 encoding.
//!
//! - **Adaptive length**: ID length grows with the edge count (4-6 characters)
//! - **Collision resistant**: nonce retry, then length increase
//! - **Format**: `{prefix}-{hash}` (e.g., "dep-a3f8")

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces and length increases
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },

    /// Base36 encoding failed
    #[error("Base36 encoding failed: {0}")]
    EncodingFailed(String),

    /// Invalid length parameter
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Configuration for ID generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all IDs (e.g., "dep")
    pub prefix: String,

    /// Current number of stored edges (affects adaptive length)
    pub store_size: usize,
}

/// Hash-based ID generator with collision detection.
///
/// Tracks every ID it has handed out (plus any registered via
/// [`register_id`](Self::register_id)) so regenerated hashes never collide
/// with live edges. For stores below ~10,000 edges the memory overhead is
/// negligible.
pub struct IdGenerator {
    config: IdGeneratorConfig,
    existing_ids: HashSet<String>,
}

impl IdGenerator {
    /// Create a new ID generator with the given configuration
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            existing_ids: HashSet::new(),
        }
    }

    /// Register an existing ID to prevent collisions
    pub fn register_id(&mut self, id: String) {
        self.existing_ids.insert(id);
    }

    /// Forget a previously registered ID, allowing its hash slot to be reused
    pub fn release_id(&mut self, id: &str) {
        self.existing_ids.remove(id);
    }

    /// Current store size the generator was configured with
    pub fn store_size(&self) -> usize {
        self.config.store_size
    }

    /// Generate a new unique edge ID.
    ///
    /// The hash input mixes the edge's endpoints, kind, and creator with the
    /// current timestamp, so equal inputs at different times produce
    /// different IDs.
    ///
    /// # Errors
    ///
    /// Returns an error if no unique ID can be produced after trying all
    /// nonces at the maximum length.
    pub fn generate(
        &mut self,
        source: &str,
        target: &str,
        kind: &str,
        creator: &str,
    ) -> Result<String, IdGenerationError> {
        let id_length = self.adaptive_length();

        for nonce in 0..MAX_NONCE {
            let id = self.generate_hash_id(source, target, kind, creator, nonce, id_length)?;

            if !self.existing_ids.contains(&id) {
                if nonce > 0 {
                    debug!(
                        nonce,
                        id_length, "Generated unique ID after {} collision retries", nonce
                    );
                }
                self.existing_ids.insert(id.clone());
                return Ok(id);
            }
        }

        // If all nonces collide, retry the nonce range with increased length
        if id_length < 6 {
            warn!(
                id_length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing ID length to {}",
                id_length + 1
            );
            for nonce in 0..MAX_NONCE {
                let id =
                    self.generate_hash_id(source, target, kind, creator, nonce, id_length + 1)?;
                if !self.existing_ids.contains(&id) {
                    self.existing_ids.insert(id.clone());
                    return Ok(id);
                }
            }
        }

        Err(IdGenerationError::CollisionExhausted {
            attempts: MAX_NONCE * 2,
        })
    }

    /// Generate a hash-based ID with the given parameters
    fn generate_hash_id(
        &self,
        source: &str,
        target: &str,
        kind: &str,
        creator: &str,
        nonce: u32,
        length: usize,
    ) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp();
        let content = format!(
            "{}|{}|{}|{}|{}|{}",
            source, target, kind, creator, timestamp, nonce
        );

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash_bytes = hasher.finalize();

        let hash_str = encode_base36(&hash_bytes[..8], length)?;

        Ok(format!("{}-{}", self.config.prefix, hash_str))
    }

    /// Determine ID length based on store size
    ///
    /// - 0-500 edges: 4 chars
    /// - 500-1,500: 5 chars
    /// - 1,500+: 6 chars
    fn adaptive_length(&self) -> usize {
        match self.config.store_size {
            0..=500 => 4,
            501..=1500 => 5,
            _ => 6,
        }
    }
}

/// Encode bytes as a base36 string.
///
/// Wrapping arithmetic is intentional: the caller passes at most 8 bytes of
/// the SHA-256 hash, and wrapping keeps the conversion deterministic.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::new();
    let mut n = num;

    while result.len() < length {
        let remainder = (n % 36) as usize;
        result.push(BASE36_CHARS[remainder]);
        n /= 36;
    }

    result.reverse();

    String::from_utf8(result)
        .map_err(|e| IdGenerationError::EncodingFailed(format!("UTF-8 conversion failed: {}", e)))
}
