//! Bulk SMS dispatch over Twilio, Vonage (Nexmo) and MessageBird.
//!
//! The crate is layered the usual way: a domain layer of strong types, a transport
//! layer for vendor wire formats, and a client layer speaking HTTP. On top of those sit
//! flat-file stores, the per-recipient dispatch loop and a [`session::Session`] state
//! machine that the `mps-sender` binary drives.
//!
//! ```rust,no_run
//! use mps_sender::config::Config;
//! use mps_sender::domain::{Credentials, Provider};
//! use mps_sender::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mps_sender::session::SessionError> {
//!     let mut session = Session::new(&Config::default());
//!     session
//!         .set_credentials(Credentials::messagebird("live_key", "MPS")?)
//!         .await?;
//!     session.set_message("Halo dari MPS!")?;
//!     session.set_targets(&["6281234567890", "6289876543210"])?;
//!
//!     let report = session.dispatch(|_| {}).await?;
//!     println!("{} sent", report.sent());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod report;
pub mod session;
pub mod store;
mod transport;

pub use client::{ClientConfig, ProviderError, SmsProvider, connect};
pub use config::{Config, ConfigError};
pub use dispatch::{DispatchError, DispatchLoop, DispatchState, send_one};
pub use domain::{
    Credentials, DispatchReport, MessageText, Provider, RecipientOutcome, SendOutcome, SenderId,
    SentMessage, TargetNumber, ValidationError, is_valid_number,
};
pub use session::{ProviderSelection, Session, SessionError, SessionState};
