//! Unified error type for the Honest Hotel host.

use hotel_ledger::LedgerError;
use hotel_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each wrapped variant lets `?` convert sub-crate errors
/// automatically. Note that a ledger *rejection* is not normally surfaced
/// as a `HotelError`: [`HotelHost::submit`](crate::HotelHost::submit) turns
/// it into a `Receipt::Rejected`. Only an unreachable ledger ends up here.
#[derive(Debug, thiserror::Error)]
pub enum HotelError {
    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A ledger-level error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The caller resolver could not map a credential to a principal.
    #[error("caller could not be resolved: {0}")]
    Unresolved(String),

    /// The host was built with incomplete settings.
    #[error("invalid host configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let hotel_err: HotelError = err.into();
        assert!(matches!(hotel_err, HotelError::Protocol(_)));
        assert!(hotel_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_ledger_error() {
        let hotel_err: HotelError = LedgerError::Unavailable.into();
        assert!(matches!(hotel_err, HotelError::Ledger(_)));
        assert_eq!(hotel_err.to_string(), "ledger is unavailable");
    }

    #[test]
    fn test_unresolved_display() {
        let err = HotelError::Unresolved("empty credential".into());
        assert_eq!(
            err.to_string(),
            "caller could not be resolved: empty credential"
        );
    }
}
