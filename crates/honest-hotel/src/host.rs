//! `HotelHost` builder and transaction submission.
//!
//! This is the entry point for running a ledger. It ties the layers
//! together: credential → caller resolver → transaction → ledger actor →
//! receipt.

use hotel_ledger::{
    spawn_ledger, LedgerConfig, LedgerHandle, LedgerSnapshot,
    NotificationSender, RoomLedger,
};
use hotel_protocol::{
    Call, Codec, JsonCodec, Principal, ProtocolError, Receipt, Transaction,
};

use crate::{CallerResolver, HotelError};

/// Builder for configuring and starting a [`HotelHost`].
///
/// # Example
///
/// ```rust,no_run
/// use honest_hotel::prelude::*;
///
/// # async fn demo() -> Result<(), HotelError> {
/// let host = HotelHostBuilder::new()
///     .owner(Principal(1))
///     .build(NumericResolver)?;
/// let receipt = host
///     .submit("2", Call::OccupyRooms { rooms: vec![RoomId(4)] })
///     .await?;
/// assert!(receipt.is_applied());
/// # Ok(())
/// # }
/// ```
pub struct HotelHostBuilder {
    config: LedgerConfig,
    owner: Option<Principal>,
    notifications: Option<NotificationSender>,
}

impl HotelHostBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: LedgerConfig::default(),
            owner: None,
            notifications: None,
        }
    }

    /// Sets the ledger configuration.
    pub fn config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the initial room count, keeping the rest of the config.
    pub fn room_count(mut self, room_count: u64) -> Self {
        self.config.initial_room_count = room_count;
        self
    }

    /// Sets the identity that creates the ledger and holds owner rights.
    pub fn owner(mut self, owner: Principal) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets a channel that receives every notification the ledger emits.
    pub fn notifications(mut self, sender: NotificationSender) -> Self {
        self.notifications = Some(sender);
        self
    }

    /// Starts the ledger with the given resolver and the JSON codec.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// [`HotelError::Config`] if no owner was set.
    pub fn build<R: CallerResolver>(
        self,
        resolver: R,
    ) -> Result<HotelHost<R, JsonCodec>, HotelError> {
        self.build_with_codec(resolver, JsonCodec)
    }

    /// Starts the ledger with the given resolver and codec.
    ///
    /// # Errors
    /// [`HotelError::Config`] if no owner was set.
    pub fn build_with_codec<R: CallerResolver, C: Codec>(
        self,
        resolver: R,
        codec: C,
    ) -> Result<HotelHost<R, C>, HotelError> {
        let owner = self
            .owner
            .ok_or_else(|| HotelError::Config("owner is not set".into()))?;

        let ledger = RoomLedger::from_config(&self.config, owner);
        let handle =
            spawn_ledger(ledger, self.config.channel_size, self.notifications);

        tracing::info!(
            %owner,
            room_count = self.config.initial_room_count,
            "hotel host started"
        );

        Ok(HotelHost {
            ledger: handle,
            resolver,
            codec,
        })
    }
}

impl Default for HotelHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running ledger plus the collaborators that feed it.
pub struct HotelHost<R: CallerResolver, C: Codec = JsonCodec> {
    ledger: LedgerHandle,
    resolver: R,
    codec: C,
}

impl<R: CallerResolver, C: Codec> HotelHost<R, C> {
    /// Resolves the caller and runs `call` on the ledger.
    ///
    /// A ledger rejection comes back as [`Receipt::Rejected`] carrying the
    /// reason string.
    ///
    /// # Errors
    /// - [`HotelError::Unresolved`] if the credential is not accepted
    /// - [`HotelError::Ledger`] if the ledger actor is gone
    pub async fn submit(
        &self,
        credential: &str,
        call: Call,
    ) -> Result<Receipt, HotelError> {
        let caller = self.resolver.resolve(credential).await?;
        self.submit_as(caller, call).await
    }

    /// Runs `call` on the ledger as `caller`, skipping resolution.
    ///
    /// # Errors
    /// [`HotelError::Ledger`] if the ledger actor is gone.
    pub async fn submit_as(
        &self,
        caller: Principal,
        call: Call,
    ) -> Result<Receipt, HotelError> {
        let op = call.name();
        let is_query = call.is_query();
        match self.ledger.execute(Transaction { caller, call }).await {
            Ok(execution) => {
                if is_query {
                    tracing::trace!(%caller, op, "query answered");
                } else {
                    tracing::debug!(
                        %caller,
                        op,
                        notifications = execution.notifications.len(),
                        "transaction applied"
                    );
                }
                Ok(execution.into())
            }
            Err(error) if error.is_rejection() => Ok(Receipt::Rejected {
                reason: error.to_string(),
            }),
            Err(error) => Err(error.into()),
        }
    }

    /// Decodes a [`Call`] from `data`, submits it, and encodes the receipt.
    ///
    /// # Errors
    /// As [`submit`](Self::submit), plus [`HotelError::Protocol`] when
    /// `data` is empty or doesn't decode.
    pub async fn submit_encoded(
        &self,
        credential: &str,
        data: &[u8],
    ) -> Result<Vec<u8>, HotelError> {
        if data.is_empty() {
            let error = ProtocolError::InvalidMessage("empty call body".into());
            return Err(error.into());
        }
        let call: Call = self.codec.decode(data)?;
        let receipt = self.submit(credential, call).await?;
        Ok(self.codec.encode(&receipt)?)
    }

    /// Returns a copy of the ledger's observable state.
    ///
    /// # Errors
    /// [`HotelError::Ledger`] if the ledger actor is gone.
    pub async fn snapshot(&self) -> Result<LedgerSnapshot, HotelError> {
        Ok(self.ledger.snapshot().await?)
    }

    /// Returns a handle to the underlying ledger actor.
    pub fn ledger(&self) -> &LedgerHandle {
        &self.ledger
    }

    /// Stops the ledger actor. Later submissions fail with
    /// [`HotelError::Ledger`].
    ///
    /// # Errors
    /// [`HotelError::Ledger`] if the actor had already stopped.
    pub async fn shutdown(&self) -> Result<(), HotelError> {
        tracing::info!("hotel host shutting down");
        Ok(self.ledger.shutdown().await?)
    }
}
