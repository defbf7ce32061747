//! Domain layer: strong types with validation and invariants (no I/O).

mod credentials;
mod outcome;
mod validation;
mod value;

pub use credentials::{Credentials, FROM_PHONE_NUMBER_FIELD, ORIGINATOR_FIELD, Provider};
pub use outcome::{DispatchReport, RecipientOutcome, SendOutcome, SentMessage};
pub use validation::ValidationError;
pub use value::{
    AccountSid, ApiKey, ApiSecret, AuthToken, MessageText, SenderId, TARGET_NUMBER_LEN,
    TARGET_NUMBER_PREFIX, TargetNumber, is_valid_number,
};
