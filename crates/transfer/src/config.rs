//! Transfer tuning knobs.
//!
//! Read from the `s3` section of the tool's JSON config. Sizes accept either
//! a byte count or a human-readable string (`"8MB"`, `"16MiB"`).

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::queue::{HasPriority, StablePriorityQueue};
use crate::{TransferError, find_chunksize, parse_human_readable_size};

const DEFAULT_MULTIPART_THRESHOLD: u64 = 8 * 1024 * 1024;
const DEFAULT_MULTIPART_CHUNKSIZE: u64 = 8 * 1024 * 1024;
const DEFAULT_MAX_QUEUE_SIZE: usize = 1000;
const DEFAULT_MAX_PRIORITY: i64 = 20;
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 10;

/// Tuning parameters handed to the transfer engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Objects at least this large go through multipart transfers.
    #[serde(deserialize_with = "deserialize_size")]
    pub multipart_threshold: u64,
    /// Requested part size, adjusted per object by [`find_chunksize`].
    #[serde(deserialize_with = "deserialize_size")]
    pub multipart_chunksize: u64,
    /// Capacity of the work queue.
    pub max_queue_size: usize,
    /// Largest priority value accepted by the work queue.
    pub max_priority: i64,
    pub max_concurrent_requests: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
            multipart_chunksize: DEFAULT_MULTIPART_CHUNKSIZE,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            max_priority: DEFAULT_MAX_PRIORITY,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl TransferConfig {
    /// Parses a config from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, TransferError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, TransferError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no transfer config, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded transfer config");
        Ok(config)
    }

    /// Returns `true` if an object of `total_size` bytes needs a multipart transfer.
    pub fn needs_multipart(&self, total_size: u64) -> bool {
        total_size >= self.multipart_threshold
    }

    /// Part size for an object of `total_size` bytes.
    pub fn chunksize_for(&self, total_size: u64) -> Result<u64, TransferError> {
        find_chunksize(total_size, self.multipart_chunksize)
    }

    /// Builds the work queue sized by this config.
    pub fn work_queue<T: HasPriority>(&self) -> StablePriorityQueue<T> {
        StablePriorityQueue::new(self.max_queue_size, self.max_priority)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Bytes(u64),
    Text(String),
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeValue::deserialize(deserializer)? {
        SizeValue::Bytes(bytes) => Ok(bytes),
        SizeValue::Text(text) => {
            parse_human_readable_size(&text).map_err(serde::de::Error::custom)
        }
    }
}
