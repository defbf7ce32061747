use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::validation::ValidationError;
use crate::domain::value::{AccountSid, ApiKey, ApiSecret, AuthToken, SenderId};

/// Credential file key holding the Twilio sender number.
pub const FROM_PHONE_NUMBER_FIELD: &str = "FROM_PHONE_NUMBER";
/// Credential file key holding the MessageBird originator.
pub const ORIGINATOR_FIELD: &str = "ORIGINATOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// One of the supported SMS vendors.
pub enum Provider {
    Twilio,
    /// Vonage, formerly Nexmo. Stored under the `nexmo` name.
    Vonage,
    MessageBird,
}

impl Provider {
    /// Name used for the credential file stem.
    pub fn storage_name(self) -> &'static str {
        match self {
            Self::Twilio => "twilio",
            Self::Vonage => "nexmo",
            Self::MessageBird => "messagebird",
        }
    }

    /// Credential keys in their canonical (file) order.
    pub fn credential_keys(self) -> &'static [&'static str] {
        match self {
            Self::Twilio => &[AccountSid::FIELD, AuthToken::FIELD, FROM_PHONE_NUMBER_FIELD],
            Self::Vonage => &[ApiKey::FIELD, ApiSecret::FIELD],
            Self::MessageBird => &[ApiKey::FIELD, ORIGINATOR_FIELD],
        }
    }

    pub fn field_count(self) -> usize {
        self.credential_keys().len()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Twilio => "TWILIO",
            Self::Vonage => "NEXMO",
            Self::MessageBird => "MESSAGEBIRD",
        })
    }
}

impl FromStr for Provider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twilio" | "1" => Ok(Self::Twilio),
            "nexmo" | "vonage" | "2" => Ok(Self::Vonage),
            "messagebird" | "3" => Ok(Self::MessageBird),
            _ => Err(ValidationError::UnknownProvider {
                input: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully populated credentials for exactly one provider.
///
/// There is no partial form: every constructor validates all fields, so holding a
/// [`Credentials`] value is enough to build a client.
pub enum Credentials {
    Twilio {
        account_sid: AccountSid,
        auth_token: AuthToken,
        from: SenderId,
    },
    /// Vonage has no stored sender; the configured default sender id is used.
    Vonage { api_key: ApiKey, api_secret: ApiSecret },
    MessageBird { api_key: ApiKey, originator: SenderId },
}

impl Credentials {
    pub fn twilio(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Twilio {
            account_sid: AccountSid::new(account_sid)?,
            auth_token: AuthToken::new(auth_token)?,
            from: SenderId::for_field(FROM_PHONE_NUMBER_FIELD, from)?,
        })
    }

    pub fn vonage(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::Vonage {
            api_key: ApiKey::new(api_key)?,
            api_secret: ApiSecret::new(api_secret)?,
        })
    }

    pub fn messagebird(
        api_key: impl Into<String>,
        originator: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::MessageBird {
            api_key: ApiKey::new(api_key)?,
            originator: SenderId::for_field(ORIGINATOR_FIELD, originator)?,
        })
    }

    pub fn provider(&self) -> Provider {
        match self {
            Self::Twilio { .. } => Provider::Twilio,
            Self::Vonage { .. } => Provider::Vonage,
            Self::MessageBird { .. } => Provider::MessageBird,
        }
    }

    /// Build credentials for `provider` from positional values in canonical key order.
    pub fn from_values(provider: Provider, values: &[String]) -> Result<Self, ValidationError> {
        let value = |idx: usize| -> Result<String, ValidationError> {
            values
                .get(idx)
                .cloned()
                .ok_or(ValidationError::Empty {
                    field: provider.credential_keys()[idx],
                })
        };
        match provider {
            Provider::Twilio => Self::twilio(value(0)?, value(1)?, value(2)?),
            Provider::Vonage => Self::vonage(value(0)?, value(1)?),
            Provider::MessageBird => Self::messagebird(value(0)?, value(1)?),
        }
    }

    /// Build credentials for `provider` from a `KEY -> value` map.
    ///
    /// Every key the provider requires must be present; extra keys are rejected by the
    /// caller's field-count check, not here.
    pub fn from_fields(
        provider: Provider,
        fields: &BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        let values = provider
            .credential_keys()
            .iter()
            .map(|key| {
                fields
                    .get(*key)
                    .cloned()
                    .ok_or(ValidationError::Empty { field: *key })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_values(provider, &values)
    }

    /// `KEY`/value pairs in canonical order, as written to the credential file.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Twilio {
                account_sid,
                auth_token,
                from,
            } => vec![
                (AccountSid::FIELD, account_sid.as_str()),
                (AuthToken::FIELD, auth_token.as_str()),
                (FROM_PHONE_NUMBER_FIELD, from.as_str()),
            ],
            Self::Vonage {
                api_key,
                api_secret,
            } => vec![
                (ApiKey::FIELD, api_key.as_str()),
                (ApiSecret::FIELD, api_secret.as_str()),
            ],
            Self::MessageBird {
                api_key,
                originator,
            } => vec![
                (ApiKey::FIELD, api_key.as_str()),
                (ORIGINATOR_FIELD, originator.as_str()),
            ],
        }
    }
}
