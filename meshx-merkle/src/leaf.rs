//! Sensor records and their canonical leaf encodings.
//!
//! Length-prefixed layout (scheme v1):
//!
//! ```text
//! 0x01 || str(device_id) || be_u64(timestamp) || str(data) || str(data_type) || str(location)
//! str(s) = be_u64(len(s)) || utf8(s)
//! ```
//!
//! Indexed layout (scheme v2) salts the same fields with the record's log
//! index, so a record cannot be replayed at another position:
//!
//! ```text
//! 0x02 || be_u64(index) || str(device_id) || be_u64(timestamp) || str(data) || ...
//! ```
//!
//! Solidity-packed layout (scheme v0), `abi.encodePacked` of
//! `(string, uint256, string, string, string)`:
//!
//! ```text
//! utf8(device_id) || be_u256(timestamp) || utf8(data) || utf8(data_type) || utf8(location)
//! ```

use serde::{Deserialize, Serialize};

use crate::{Hash, LeafEncoding, hash::keccak256};

const LENGTH_PREFIXED_TAG: u8 = 0x01;
const INDEXED_LENGTH_PREFIXED_TAG: u8 = 0x02;

/// Width of a Solidity `uint256` word.
const UINT256_LEN: usize = 32;

/// One sensor reading as stored in the append-only record log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    pub device_id: String,
    /// Unix seconds.
    pub timestamp: u64,
    pub data: String,
    pub data_type: String,
    pub location: String,
}

impl SensorRecord {
    pub fn new(
        device_id: impl Into<String>,
        timestamp: u64,
        data: impl Into<String>,
        data_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
            data: data.into(),
            data_type: data_type.into(),
            location: location.into(),
        }
    }

    /// Canonical byte encoding of this record stored at log `index`.
    ///
    /// Only [`LeafEncoding::IndexedLengthPrefixed`] reads `index`.
    pub fn encode(&self, encoding: LeafEncoding, index: u64) -> Vec<u8> {
        match encoding {
            LeafEncoding::SolidityPacked => self.encode_solidity_packed(),
            LeafEncoding::LengthPrefixed => self.encode_length_prefixed(None),
            LeafEncoding::IndexedLengthPrefixed => self.encode_length_prefixed(Some(index)),
        }
    }

    /// `keccak256` of the canonical encoding.
    pub fn leaf_hash(&self, encoding: LeafEncoding, index: u64) -> Hash {
        keccak256(&self.encode(encoding, index))
    }

    fn strings(&self) -> [&str; 4] {
        [&self.device_id, &self.data, &self.data_type, &self.location]
    }

    fn encode_length_prefixed(&self, index: Option<u64>) -> Vec<u8> {
        let strings_len: usize = self.strings().iter().map(|s| 8 + s.len()).sum();
        let mut buf = Vec::with_capacity(1 + 8 + 8 + strings_len);
        match index {
            Some(index) => {
                buf.push(INDEXED_LENGTH_PREFIXED_TAG);
                buf.extend_from_slice(&index.to_be_bytes());
            }
            None => buf.push(LENGTH_PREFIXED_TAG),
        }
        push_str(&mut buf, &self.device_id);
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        push_str(&mut buf, &self.data);
        push_str(&mut buf, &self.data_type);
        push_str(&mut buf, &self.location);
        buf
    }

    fn encode_solidity_packed(&self) -> Vec<u8> {
        let strings_len: usize = self.strings().iter().map(|s| s.len()).sum();
        let mut buf = Vec::with_capacity(UINT256_LEN + strings_len);
        buf.extend_from_slice(self.device_id.as_bytes());
        buf.extend_from_slice(&[0u8; UINT256_LEN - 8]);
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(self.data.as_bytes());
        buf.extend_from_slice(self.data_type.as_bytes());
        buf.extend_from_slice(self.location.as_bytes());
        buf
    }
}

fn push_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u64).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SensorRecord {
        SensorRecord::new("d1", 100, "a", "t", "l")
    }

    #[test]
    fn test_length_prefixed_layout() {
        let encoded = record().encode(LeafEncoding::LengthPrefixed, 0);
        let mut expected = vec![0x01];
        expected.extend_from_slice(&2u64.to_be_bytes());
        expected.extend_from_slice(b"d1");
        expected.extend_from_slice(&100u64.to_be_bytes());
        for field in [b"a", b"t", b"l"] {
            expected.extend_from_slice(&1u64.to_be_bytes());
            expected.extend_from_slice(field);
        }
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_solidity_packed_layout() {
        let encoded = record().encode(LeafEncoding::SolidityPacked, 0);
        assert_eq!(encoded.len(), 2 + 32 + 3);
        assert_eq!(&encoded[..2], b"d1");
        assert!(encoded[2..32].iter().all(|b| *b == 0));
        assert_eq!(&encoded[32..34], &[0x00, 0x64]);
        assert_eq!(&encoded[34..], b"atl");
    }

    #[test]
    fn test_length_prefix_separates_field_boundaries() {
        // Packed encoding cannot tell these two apart.
        let a = SensorRecord::new("d1", 1, "ab", "c", "l");
        let b = SensorRecord::new("d1", 1, "a", "bc", "l");
        assert_eq!(
            a.encode(LeafEncoding::SolidityPacked, 0),
            b.encode(LeafEncoding::SolidityPacked, 0)
        );
        assert_ne!(
            a.leaf_hash(LeafEncoding::LengthPrefixed, 0),
            b.leaf_hash(LeafEncoding::LengthPrefixed, 0)
        );
    }

    #[test]
    fn test_every_field_changes_leaf_hash() {
        let base = record();
        let original = base.leaf_hash(LeafEncoding::IndexedLengthPrefixed, 3);
        let mutations = [
            SensorRecord { device_id: "d2".into(), ..base.clone() },
            SensorRecord { timestamp: 101, ..base.clone() },
            SensorRecord { data: "b".into(), ..base.clone() },
            SensorRecord { data_type: "u".into(), ..base.clone() },
            SensorRecord { location: "m".into(), ..base.clone() },
        ];
        for mutated in mutations {
            assert_ne!(mutated.leaf_hash(LeafEncoding::IndexedLengthPrefixed, 3), original);
        }
    }

    #[test]
    fn test_indexed_layout_prefixes_unsalted_body() {
        let indexed = record().encode(LeafEncoding::IndexedLengthPrefixed, 9);
        let plain = record().encode(LeafEncoding::LengthPrefixed, 9);
        assert_eq!(indexed[0], 0x02);
        assert_eq!(&indexed[1..9], &9u64.to_be_bytes());
        assert_eq!(&indexed[9..], &plain[1..]);
    }

    #[test]
    fn test_only_indexed_encoding_depends_on_index() {
        let r = record();
        for encoding in [LeafEncoding::SolidityPacked, LeafEncoding::LengthPrefixed] {
            assert_eq!(r.leaf_hash(encoding, 0), r.leaf_hash(encoding, 1));
        }
        assert_ne!(
            r.leaf_hash(LeafEncoding::IndexedLengthPrefixed, 0),
            r.leaf_hash(LeafEncoding::IndexedLengthPrefixed, 1)
        );
    }

    #[test]
    fn test_known_leaf_hashes() {
        let r = record();
        assert_eq!(
            hex::encode(r.leaf_hash(LeafEncoding::SolidityPacked, 0)),
            "dbcbe9952ebfd86fc9aa1a3d05b0ec401d9bbe70e0752293f15f15dfa22474b9"
        );
        assert_eq!(
            hex::encode(r.leaf_hash(LeafEncoding::LengthPrefixed, 0)),
            "93543d2e1d246619d0918d58bbca44482254c44024e5c0dc07536eaa21f7424a"
        );
        assert_eq!(
            hex::encode(r.leaf_hash(LeafEncoding::IndexedLengthPrefixed, 0)),
            "7f98f06dcba8992e69f905bd3bd908cefdffdd3ef8763a82c92cd4e5f4d4b950"
        );
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let json = serde_json::to_value(record()).expect("serialize record");
        assert_eq!(json["deviceId"], "d1");
        assert_eq!(json["dataType"], "t");
        let parsed: SensorRecord = serde_json::from_str(
            r#"{"deviceId":"d1","timestamp":100,"data":"a","dataType":"t","location":"l"}"#,
        )
        .expect("deserialize record");
        assert_eq!(parsed, record());
    }
}
