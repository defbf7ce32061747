use std::fmt;

use serde::de::{Deserialize, Deserializer, Error as DeError};
use serde_json::value::RawValue;

/// Account balance as reported by a vendor.
///
/// Vonage sends `"value": 12.3400` (number) while older endpoints quote it; the
/// text is kept exactly as received, so trailing zeros survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceAmount(String);

impl BalanceAmount {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BalanceAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BalanceAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let token = raw.get();

        if token.starts_with('"') {
            let text: String = serde_json::from_str(token).map_err(D::Error::custom)?;
            return Ok(Self(text.trim().to_owned()));
        }
        if token.parse::<f64>().is_ok() {
            return Ok(Self(token.to_owned()));
        }
        Err(D::Error::custom(format!(
            "balance must be a number or a string, got {token}"
        )))
    }
}
