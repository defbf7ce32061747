use crate::domain::validation::ValidationError;

/// Length of a valid target number: `628` followed by ten digits.
pub const TARGET_NUMBER_LEN: usize = 13;

/// Fixed prefix of a valid target number (Indonesian mobile range).
pub const TARGET_NUMBER_PREFIX: &str = "628";

/// Returns `true` iff `input` is `628` followed by exactly ten ASCII digits.
///
/// The check is purely lexical: no trimming, no `+` prefix, no normalization.
pub fn is_valid_number(input: &str) -> bool {
    input.len() == TARGET_NUMBER_LEN
        && input.starts_with(TARGET_NUMBER_PREFIX)
        && input.bytes().all(|b| b.is_ascii_digit())
}

fn non_empty(field: &'static str, value: impl Into<String>) -> Result<String, ValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

/// A value stored as one `KEY=value` line: non-empty and free of line breaks.
fn single_line(field: &'static str, value: impl Into<String>) -> Result<String, ValidationError> {
    let value = non_empty(field, value)?;
    if value.contains(['\n', '\r']) {
        return Err(ValidationError::LineBreak { field });
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Twilio account SID (`ACCOUNT_SID`).
///
/// Invariant: non-empty after trimming, single line.
pub struct AccountSid(String);

impl AccountSid {
    /// Credential file key.
    pub const FIELD: &'static str = "ACCOUNT_SID";

    /// Create a validated [`AccountSid`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        single_line(Self::FIELD, value).map(Self)
    }

    /// Borrow the validated SID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Twilio auth token (`AUTH_TOKEN`).
///
/// Invariant: non-empty after trimming, single line.
pub struct AuthToken(String);

impl AuthToken {
    /// Credential file key.
    pub const FIELD: &'static str = "AUTH_TOKEN";

    /// Create a validated [`AuthToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        single_line(Self::FIELD, value).map(Self)
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Vendor API key (`API_KEY`), used by both Vonage and MessageBird.
///
/// Invariant: non-empty after trimming, single line.
pub struct ApiKey(String);

impl ApiKey {
    /// Credential file key.
    pub const FIELD: &'static str = "API_KEY";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        single_line(Self::FIELD, value).map(Self)
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Vonage API secret (`API_SECRET`).
///
/// Invariant: non-empty after trimming, single line.
pub struct ApiSecret(String);

impl ApiSecret {
    /// Credential file key.
    pub const FIELD: &'static str = "API_SECRET";

    /// Create a validated [`ApiSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        single_line(Self::FIELD, value).map(Self)
    }

    /// Borrow the validated secret.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender identity passed as the "from" value of a send call.
///
/// Twilio expects a phone number it owns, Vonage and MessageBird also accept an
/// alphanumeric originator. Invariant: non-empty after trimming, single line.
pub struct SenderId(String);

impl SenderId {
    pub const FIELD: &'static str = "from";

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::for_field(Self::FIELD, value)
    }

    /// Like [`SenderId::new`], reporting errors against the credential key `field`.
    pub(crate) fn for_field(
        field: &'static str,
        value: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        single_line(field, value).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Outbound SMS body.
///
/// Invariant: non-empty after trimming. The input (including whitespace) is kept as given.
pub struct MessageText(String);

impl MessageText {
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A recipient number exactly as it appeared in the target list.
///
/// No normalization is applied; [`TargetNumber::is_valid`] classifies it and
/// [`TargetNumber::e164`] renders valid numbers for vendors that require a `+` prefix.
pub struct TargetNumber(String);

impl TargetNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        is_valid_number(&self.0)
    }

    /// E.164 form (`+628...`) of a valid number.
    pub fn e164(&self) -> Result<String, ValidationError> {
        if !self.is_valid() {
            return Err(ValidationError::InvalidPhoneNumber {
                input: self.0.clone(),
            });
        }
        let parsed = phonenumber::parse(None, format!("+{}", self.0)).map_err(|_| {
            ValidationError::InvalidPhoneNumber {
                input: self.0.clone(),
            }
        })?;
        Ok(phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string())
    }
}

impl From<&str> for TargetNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for TargetNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
