//! Codec Module
//!
//! Converts caller values to the opaque bytes held by the store and back.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Failure raised by a codec. The façade attaches the key and maps it to
/// [`crate::error::CacheError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CodecError(pub String);

// == Codec ==
/// Serialization boundary between typed values and stored bytes.
///
/// Implementations must round-trip every value they accept.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// JSON codec backed by serde_json.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        id: u64,
        roles: Vec<String>,
    }

    #[test]
    fn test_json_struct_roundtrip() {
        let codec = JsonCodec;
        let session = Session {
            id: 42,
            roles: vec!["admin".into()],
        };

        let bytes = codec.encode(&session).unwrap();
        assert_eq!(bytes, br#"{"id":42,"roles":["admin"]}"#);

        let back: Session = codec.decode(&bytes).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_encode_failure() {
        // Non-string map keys cannot be represented in JSON
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        assert!(JsonCodec.encode(&map).is_err());
    }

    #[test]
    fn test_codec_error_displays_reason() {
        let err = CodecError("expected value at line 1".to_string());
        assert_eq!(err.to_string(), "expected value at line 1");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_decode_failure() {
        let result: Result<Session, _> = JsonCodec.decode(b"{not json");
        assert!(result.is_err());

        let wrong_shape: Result<Session, _> = JsonCodec.decode(b"[1,2,3]");
        assert!(wrong_shape.is_err());
    }
}
