//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. A
//! `ProtocolError` always means the bytes were the problem, never the
//! ledger's rules.

/// Errors that can occur while encoding or decoding wire types.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or an
    /// unknown `op`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The input is not acceptable before decoding even starts, e.g. an
    /// empty call body.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
