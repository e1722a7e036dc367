//! Versioned record envelope for cached contract sets.
//!
//! Layout (all integers little-endian):
//!
//! | bytes   | field                               |
//! |---------|-------------------------------------|
//! | 0..4    | magic `ILCC`                        |
//! | 4..6    | format version (u16)                |
//! | 6..38   | blake3 hash of the payload          |
//! | 38..    | JSON-serialized [`Extraction`]      |
//!
//! Decoding a payload re-validates every clause, so a record can never
//! smuggle a stack-unbalanced clause into a
//! [`ContractSet`](ilcontract_core::ContractSet).

use ilcontract_core::Extraction;

use crate::error::{CacheFormatError, StorageError};

/// Record magic.
pub const MAGIC: [u8; 4] = *b"ILCC";

/// Current record format version. Bump when the payload shape changes.
pub const FORMAT_VERSION: u16 = 2;

const CHECKSUM_LEN: usize = 32;

/// Bytes before the payload.
pub const HEADER_LEN: usize = MAGIC.len() + 2 + CHECKSUM_LEN;

/// Encodes `extraction` as a versioned, checksummed record.
pub fn encode(extraction: &Extraction) -> Result<Vec<u8>, StorageError> {
    let payload = serde_json::to_vec(extraction)?;
    let checksum = blake3::hash(&payload);

    let mut record = Vec::with_capacity(HEADER_LEN + payload.len());
    record.extend_from_slice(&MAGIC);
    record.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    record.extend_from_slice(checksum.as_bytes());
    record.extend_from_slice(&payload);
    Ok(record)
}

/// Decodes a record produced by [`encode`].
pub fn decode(record: &[u8]) -> Result<Extraction, CacheFormatError> {
    if record.len() < HEADER_LEN {
        return Err(CacheFormatError::Truncated {
            len: record.len(),
            minimum: HEADER_LEN,
        });
    }
    let (magic, rest) = record.split_at(MAGIC.len());
    let (version, rest) = rest.split_at(2);
    let (checksum, payload) = rest.split_at(CHECKSUM_LEN);

    if magic != MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(magic);
        return Err(CacheFormatError::BadMagic { found });
    }

    let version = u16::from_le_bytes([version[0], version[1]]);
    if version != FORMAT_VERSION {
        return Err(CacheFormatError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let mut expected = [0u8; CHECKSUM_LEN];
    expected.copy_from_slice(checksum);
    if blake3::Hash::from(expected) != blake3::hash(payload) {
        return Err(CacheFormatError::ChecksumMismatch);
    }

    serde_json::from_slice(payload).map_err(|e| CacheFormatError::Payload {
        reason: e.to_string(),
    })
}
