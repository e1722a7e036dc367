//! Stable identity newtypes for analyzed binaries.
//!
//! [`Fingerprint`] is the fixed-width content hash the binary loader computes
//! over a method's raw encoded form. [`IlOffset`] locates a node inside that
//! encoded form for diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Width in bytes of every [`Fingerprint`].
pub const FINGERPRINT_LEN: usize = 32;

/// Content hash identifying one analyzed method body.
///
/// The loader must derive it deterministically from everything that affects
/// extraction output (IL bytes, referenced signatures). Cache correctness
/// depends on that: two bodies with equal fingerprints are treated as the
/// same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Builds a fingerprint from a byte slice, rejecting any other width.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let array: [u8; FINGERPRINT_LEN] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidFingerprint { len: bytes.len() })?;
        Ok(Fingerprint(array))
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, used for log fields and diagnostics.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(FINGERPRINT_LEN * 2);
        for byte in self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Byte offset of an instruction within a method's IL stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IlOffset(pub u32);

impl fmt::Display for IlOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{:04x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_from_slice_checks_width() {
        let ok = Fingerprint::from_slice(&[7u8; FINGERPRINT_LEN]).unwrap();
        assert_eq!(ok.as_bytes(), &[7u8; FINGERPRINT_LEN]);

        let err = Fingerprint::from_slice(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFingerprint { len: 3 }));
    }

    #[test]
    fn fingerprint_hex_display() {
        let mut bytes = [0u8; FINGERPRINT_LEN];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let fp = Fingerprint(bytes);
        let hex = fp.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("ab00"));
        assert!(hex.ends_with("0001"));
    }

    #[test]
    fn il_offset_display() {
        assert_eq!(IlOffset(0x1c).to_string(), "IL_001c");
    }

    #[test]
    fn serde_roundtrip() {
        let fp = Fingerprint([9u8; FINGERPRINT_LEN]);
        let json = serde_json::to_string(&fp).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, back);
    }
}
