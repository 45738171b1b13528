//! Caller resolution: turning a submitter's credential into a principal.
//!
//! The ledger never decides who is calling. Every operation takes the
//! caller explicitly, and the host fills it in by asking a
//! [`CallerResolver`]. Production hosts plug in signature checks or an
//! identity service. Demos and tests use [`NumericResolver`].

use hotel_protocol::Principal;

use crate::HotelError;

/// Maps a credential to the principal it belongs to.
///
/// `Send + Sync + 'static` because the host shares one resolver across
/// every task that submits transactions.
///
/// # Example
///
/// ```rust
/// use honest_hotel::{CallerResolver, HotelError};
/// use hotel_protocol::Principal;
///
/// /// Everyone is principal 7. Only useful in a test.
/// struct Everyone;
///
/// impl CallerResolver for Everyone {
///     async fn resolve(&self, _credential: &str) -> Result<Principal, HotelError> {
///         Ok(Principal(7))
///     }
/// }
/// ```
pub trait CallerResolver: Send + Sync + 'static {
    /// Resolves `credential` to a principal.
    ///
    /// # Errors
    /// [`HotelError::Unresolved`] if the credential is not acceptable.
    fn resolve(
        &self,
        credential: &str,
    ) -> impl std::future::Future<Output = Result<Principal, HotelError>> + Send;
}

/// Treats the credential as the principal's number, in decimal or as
/// `0x`-prefixed hex.
///
/// There is no secret involved, so this is for demos and tests only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericResolver;

impl CallerResolver for NumericResolver {
    async fn resolve(&self, credential: &str) -> Result<Principal, HotelError> {
        let credential = credential.trim();
        let parsed = match credential.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => credential.parse(),
        };
        parsed.map(Principal).map_err(|_| {
            HotelError::Unresolved(format!(
                "credential {credential:?} is not a principal number"
            ))
        })
    }
}
