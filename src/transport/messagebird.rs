use serde::{Deserialize, Serialize};

use crate::domain::{MessageText, SenderId, SentMessage, TargetNumber};

use super::amount::BalanceAmount;
use super::{ApiFailure, TransportError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// JSON body for `POST /messages`, always with a single recipient.
pub struct MessageBirdMessageRequest {
    pub originator: String,
    pub recipients: Vec<String>,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageBirdMessageJson {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageBirdBalanceJson {
    amount: BalanceAmount,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageBirdErrorsJson {
    #[serde(default)]
    errors: Vec<MessageBirdErrorJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageBirdErrorJson {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameter: Option<String>,
}

pub fn encode_messagebird_message(
    originator: &SenderId,
    to: &TargetNumber,
    body: &MessageText,
) -> MessageBirdMessageRequest {
    MessageBirdMessageRequest {
        originator: originator.as_str().to_owned(),
        recipients: vec![to.raw().to_owned()],
        body: body.as_str().to_owned(),
    }
}

pub fn decode_messagebird_message(json: &str) -> Result<SentMessage, TransportError> {
    let parsed: MessageBirdMessageJson = serde_json::from_str(json)?;
    Ok(SentMessage {
        message_id: parsed.id,
        remaining_balance: None,
    })
}

/// Balance rendered as `"<amount> <type>"`, e.g. `"9.2 credits"`.
pub fn decode_messagebird_balance(json: &str) -> Result<String, TransportError> {
    let parsed: MessageBirdBalanceJson = serde_json::from_str(json)?;
    Ok(match parsed.kind {
        Some(kind) => format!("{} {kind}", parsed.amount),
        None => parsed.amount.into_string(),
    })
}

/// Reduce the `errors` array to its first entry.
pub fn decode_messagebird_error(json: &str) -> Result<ApiFailure, TransportError> {
    let parsed: MessageBirdErrorsJson = serde_json::from_str(json)?;
    let first = parsed
        .errors
        .into_iter()
        .next()
        .ok_or(TransportError::NoErrors)?;

    let description = first
        .description
        .unwrap_or_else(|| "unknown MessageBird error".to_owned());
    let message = match first.parameter {
        Some(parameter) => format!("{description} (parameter: {parameter})"),
        None => description,
    };
    Ok(ApiFailure {
        code: first.code.map(|code| code.to_string()),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_message_has_single_recipient() {
        let request = encode_messagebird_message(
            &SenderId::new("MPS").unwrap(),
            &TargetNumber::new("6281234567890"),
            &MessageText::new("hello").unwrap(),
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "originator": "MPS",
                "recipients": ["6281234567890"],
                "body": "hello"
            })
        );
    }

    #[test]
    fn decode_message_reads_id() {
        let json = r#"
        {
          "id": "e8077d803532c0b5937c639b60216938",
          "direction": "mt",
          "originator": "MPS",
          "recipients": { "totalCount": 1, "totalSentCount": 1 }
        }
        "#;
        let sent = decode_messagebird_message(json).unwrap();
        assert_eq!(
            sent.message_id.as_deref(),
            Some("e8077d803532c0b5937c639b60216938")
        );
    }

    #[test]
    fn decode_balance_joins_amount_and_type() {
        let json = r#"{"payment": "prepaid", "type": "credits", "amount": 9.2}"#;
        assert_eq!(decode_messagebird_balance(json).unwrap(), "9.2 credits");
    }

    #[test]
    fn decode_error_uses_first_entry() {
        let json = r#"
        {
          "errors": [
            { "code": 2, "description": "Request not allowed (incorrect access_key)", "parameter": "access_key" },
            { "code": 9, "description": "ignored", "parameter": null }
          ]
        }
        "#;
        let failure = decode_messagebird_error(json).unwrap();
        assert_eq!(failure.code.as_deref(), Some("2"));
        assert_eq!(
            failure.message,
            "Request not allowed (incorrect access_key) (parameter: access_key)"
        );
    }

    #[test]
    fn decode_error_requires_an_entry() {
        let err = decode_messagebird_error(r#"{"errors": []}"#).unwrap_err();
        assert!(matches!(err, TransportError::NoErrors));
    }
}
