//! # Honest Hotel
//!
//! A room-occupancy ledger with owner-gated overrides, plus the host
//! runtime that feeds it transactions.
//!
//! The ledger itself lives in `hotel-ledger` and the wire types in
//! `hotel-protocol`. This crate wires them to a [`CallerResolver`] and a
//! [`Codec`](hotel_protocol::Codec) behind [`HotelHost`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use honest_hotel::prelude::*;
//!
//! # async fn demo() -> Result<(), HotelError> {
//! let host = HotelHostBuilder::new()
//!     .room_count(50)
//!     .owner(Principal(1))
//!     .build(NumericResolver)?;
//!
//! host.submit("2", Call::OccupyRooms { rooms: vec![RoomId(1), RoomId(3)] })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod host;
mod resolver;

pub use error::HotelError;
pub use host::{HotelHost, HotelHostBuilder};
pub use resolver::{CallerResolver, NumericResolver};

/// Installs a `tracing` subscriber that honours `RUST_LOG`, defaulting to
/// `info`. Calling it twice is harmless.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Everything a host binary usually needs.
pub mod prelude {
    pub use crate::{
        init_logging, CallerResolver, HotelError, HotelHost, HotelHostBuilder,
        NumericResolver,
    };
    pub use hotel_ledger::{
        LedgerConfig, LedgerError, LedgerSnapshot, NotificationSender,
        RoomState,
    };
    pub use hotel_protocol::{
        Call, Codec, JsonCodec, Notification, Output, Principal,
        ProtocolError, Receipt, RoomId, Transaction,
    };
}
