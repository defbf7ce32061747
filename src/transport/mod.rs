//! Transport layer: vendor wire formats (form encoding, JSON decoding).
//!
//! Nothing here performs I/O; the client layer hands raw bodies in and gets
//! domain values or [`ApiFailure`]s back.

mod amount;
mod messagebird;
mod twilio;
mod vonage;

pub use messagebird::{
    decode_messagebird_balance, decode_messagebird_error, decode_messagebird_message,
    encode_messagebird_message,
};
pub use twilio::{
    decode_twilio_account, decode_twilio_error, decode_twilio_message, encode_twilio_send_form,
};
pub use vonage::{
    decode_vonage_balance, decode_vonage_error, decode_vonage_send_response, encode_vonage_auth_query,
    encode_vonage_send_form,
};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response did not contain any message entries")]
    NoMessages,

    #[error("error response did not contain any error entries")]
    NoErrors,
}

/// A vendor-reported failure, already reduced to a code and a readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub code: Option<String>,
    pub message: String,
}
