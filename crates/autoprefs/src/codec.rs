//! Encoding of structured values into opaque byte sequences.
//!
//! The store never interprets opaque values.  Callers hand
//! [`crate::Preferences::put_object`] a codec that turns their type into bytes
//! and back; [`BincodeCodec`] covers any `serde` type.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors reported by an [`ObjectCodec`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

/// A serializer/deserializer pair for values of type `T`.
pub trait ObjectCodec<T> {
    /// Encodes `value` into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if `value` cannot be represented.
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decodes a value previously produced by [`ObjectCodec::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] for truncated or foreign data.
    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// [`ObjectCodec`] for every `serde` type, using `bincode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl<T> ObjectCodec<T> for BincodeCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
