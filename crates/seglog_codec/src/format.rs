//! Record encodings.

use crate::error::{CodecError, CodecResult};
use crate::record::Record;
use ciborium::value::{Integer, Value};
use serde::{Deserialize, Serialize};

const OFFSET_KEY: &str = "offset";
const VALUE_KEY: &str = "value";

/// How a record is turned into the bytes a segment stores.
///
/// Both encodings are pure functions of their input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// A CBOR map `{"offset": uint, "value": bytes}`.
    ///
    /// The offset travels with the payload, so exported store bytes are
    /// self-describing.
    #[default]
    Cbor,

    /// The payload bytes as-is. The offset is not persisted and is
    /// restored from the segment index on read.
    Raw,
}

impl RecordFormat {
    /// Encodes a record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EncodingFailed`] if the CBOR writer fails.
    pub fn encode(self, record: &Record) -> CodecResult<Vec<u8>> {
        match self {
            Self::Raw => Ok(record.value.clone()),
            Self::Cbor => {
                let map = Value::Map(vec![
                    (
                        Value::Text(OFFSET_KEY.to_string()),
                        Value::Integer(Integer::from(record.offset)),
                    ),
                    (
                        Value::Text(VALUE_KEY.to_string()),
                        Value::Bytes(record.value.clone()),
                    ),
                ]);

                let mut out = Vec::with_capacity(record.value.len() + 24);
                ciborium::ser::into_writer(&map, &mut out)
                    .map_err(|e| CodecError::encoding(e.to_string()))?;
                Ok(out)
            }
        }
    }

    /// Decodes bytes previously produced by [`RecordFormat::encode`].
    ///
    /// `offset` is the absolute offset the bytes were read from. The raw
    /// format uses it as the record offset; the CBOR format uses the
    /// persisted one.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DecodingFailed`] if the bytes are not a
    /// well-formed CBOR record.
    pub fn decode(self, bytes: &[u8], offset: u64) -> CodecResult<Record> {
        match self {
            Self::Raw => Ok(Record::with_offset(bytes, offset)),
            Self::Cbor => {
                let value: Value = ciborium::de::from_reader(bytes)
                    .map_err(|e| CodecError::decoding(e.to_string()))?;
                decode_map(value)
            }
        }
    }
}

impl std::fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cbor => f.write_str("cbor"),
            Self::Raw => f.write_str("raw"),
        }
    }
}

fn decode_map(value: Value) -> CodecResult<Record> {
    let Value::Map(entries) = value else {
        return Err(CodecError::decoding("expected a CBOR map"));
    };

    let mut offset = None;
    let mut payload = None;

    for (key, value) in entries {
        let Value::Text(key) = key else {
            return Err(CodecError::decoding("map key is not a text string"));
        };
        match (key.as_str(), value) {
            (OFFSET_KEY, Value::Integer(n)) => {
                let n = u64::try_from(n)
                    .map_err(|_| CodecError::decoding("offset does not fit in u64"))?;
                offset = Some(n);
            }
            (VALUE_KEY, Value::Bytes(bytes)) => payload = Some(bytes),
            (OFFSET_KEY | VALUE_KEY, _) => {
                return Err(CodecError::decoding(format!("field `{key}` has wrong type")));
            }
            // Unknown fields are skipped.
            _ => {}
        }
    }

    let offset = offset.ok_or_else(|| CodecError::decoding("missing field `offset`"))?;
    let value = payload.ok_or_else(|| CodecError::decoding("missing field `value`"))?;
    Ok(Record { value, offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn raw_is_identity() {
        let record = Record::with_offset(b"hello".to_vec(), 7);
        let bytes = RecordFormat::Raw.encode(&record).unwrap();
        assert_eq!(bytes, b"hello");

        let decoded = RecordFormat::Raw.decode(&bytes, 7).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn cbor_carries_offset() {
        let record = Record::with_offset(b"hello".to_vec(), 42);
        let bytes = RecordFormat::Cbor.encode(&record).unwrap();

        // The offset argument is ignored for CBOR.
        let decoded = RecordFormat::Cbor.decode(&bytes, 0).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn cbor_value_is_byte_string() {
        let record = Record::with_offset(vec![0xff; 3], 1);
        let bytes = RecordFormat::Cbor.encode(&record).unwrap();

        // map(2), "offset", 1, "value", bytes(3)
        assert_eq!(bytes[0], 0xa2);
        assert!(bytes.windows(4).any(|w| w == [0x43, 0xff, 0xff, 0xff]));
    }

    #[test]
    fn cbor_rejects_garbage() {
        let err = RecordFormat::Cbor.decode(&[0xff, 0x00], 0).unwrap_err();
        assert!(matches!(err, CodecError::DecodingFailed { .. }));
    }

    #[test]
    fn cbor_rejects_non_map() {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&Value::Integer(5.into()), &mut bytes).unwrap();
        let err = RecordFormat::Cbor.decode(&bytes, 0).unwrap_err();
        assert_eq!(err, CodecError::decoding("expected a CBOR map"));
    }

    #[test]
    fn cbor_rejects_missing_value() {
        let map = Value::Map(vec![(
            Value::Text("offset".to_string()),
            Value::Integer(3.into()),
        )]);
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&map, &mut bytes).unwrap();

        let err = RecordFormat::Cbor.decode(&bytes, 0).unwrap_err();
        assert_eq!(err, CodecError::decoding("missing field `value`"));
    }

    #[test]
    fn format_display_and_serde_names() {
        assert_eq!(RecordFormat::Cbor.to_string(), "cbor");
        assert_eq!(RecordFormat::Raw.to_string(), "raw");
        assert_eq!(RecordFormat::default(), RecordFormat::Cbor);
    }

    proptest! {
        #[test]
        fn cbor_roundtrip(value in prop::collection::vec(any::<u8>(), 0..512), offset in any::<u64>()) {
            let record = Record::with_offset(value, offset);
            let bytes = RecordFormat::Cbor.encode(&record).unwrap();
            prop_assert_eq!(RecordFormat::Cbor.decode(&bytes, 0).unwrap(), record);
        }
    }
}
