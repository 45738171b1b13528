//! Codec trait and implementations for transactions and receipts.
//!
//! The host does not care how a transaction was serialized, only that
//! something implementing [`Codec`] can turn bytes into a [`Call`] and a
//! [`Receipt`] back into bytes. JSON is the only format today.
//!
//! [`Call`]: crate::Call
//! [`Receipt`]: crate::Receipt

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the host shares one codec across every
/// task that submits transactions.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use hotel_protocol::{Call, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let call = Call::OccupyRooms { rooms: vec![RoomId(1), RoomId(3)] };
///
/// let bytes = codec.encode(&call).unwrap();
/// let decoded: Call = codec.decode(&bytes).unwrap();
/// assert_eq!(call, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
