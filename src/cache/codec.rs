//! Snapshot Codec Module
//!
//! Serializes the entry mapping to a self-describing JSON document,
//! optionally deflated with zlib. Knows nothing about eviction.

use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::cache::{Policy, Usage};
use crate::error::{CacheError, Result};

/// Current snapshot layout version.
pub const FORMAT_VERSION: u32 = 1;

// == Snapshot ==
/// Point-in-time copy of an engine's entries, in order-queue sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<K, V> {
    pub format: u32,
    /// Policy of the engine that wrote the snapshot
    pub policy: Policy,
    pub entries: Vec<SnapshotRecord<K, V>>,
}

/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord<K, V> {
    pub key: K,
    pub value: V,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage: Usage,
}

impl<K, V> Snapshot<K, V> {
    pub fn new(policy: Policy, entries: Vec<SnapshotRecord<K, V>>) -> Self {
        Self {
            format: FORMAT_VERSION,
            policy,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Encode ==
/// Serializes a snapshot, deflating it when `compressed` is set.
pub fn encode<K, V>(snapshot: &Snapshot<K, V>, compressed: bool) -> Result<Vec<u8>>
where
    K: Serialize,
    V: Serialize,
{
    let raw = serde_json::to_vec(snapshot)
        .map_err(|e| CacheError::Internal(format!("snapshot encoding failed: {e}")))?;

    if !compressed {
        return Ok(raw);
    }

    let mut encoder = ZlibEncoder::new(Vec::with_capacity(raw.len() / 2), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

// == Decode ==
/// Decodes bytes produced by [`encode`] with the same `compressed` flag.
///
/// Malformed, truncated or wrongly-compressed input yields
/// [`CacheError::CorruptCacheData`].
pub fn decode<K, V>(bytes: &[u8], compressed: bool) -> Result<Snapshot<K, V>>
where
    K: DeserializeOwned,
    V: DeserializeOwned,
{
    let snapshot: Snapshot<K, V> = if compressed {
        let mut raw = Vec::new();
        ZlibDecoder::new(bytes)
            .read_to_end(&mut raw)
            .map_err(|e| CacheError::CorruptCacheData(format!("decompression failed: {e}")))?;
        serde_json::from_slice(&raw)
    } else {
        serde_json::from_slice(bytes)
    }
    .map_err(|e| CacheError::CorruptCacheData(e.to_string()))?;

    if snapshot.format != FORMAT_VERSION {
        return Err(CacheError::CorruptCacheData(format!(
            "unsupported snapshot format {}",
            snapshot.format
        )));
    }

    Ok(snapshot)
}

// == Snapshot Files ==
/// Encodes `snapshot` and atomically replaces `path` with it.
pub fn write_snapshot<K, V>(
    snapshot: &Snapshot<K, V>,
    path: &Path,
    compressed: bool,
) -> Result<()>
where
    K: Serialize,
    V: Serialize,
{
    let bytes = encode(snapshot, compressed)?;
    write_file_atomic(path, &bytes)?;
    info!(
        path = %path.display(),
        entries = snapshot.len(),
        bytes = bytes.len(),
        compressed,
        "Cache snapshot saved"
    );
    Ok(())
}

/// Writes `bytes` to `path` through a temporary sibling file, so the
/// destination is either fully replaced or left untouched.
pub(crate) fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CacheError::Io(e.error))?;
    Ok(())
}
