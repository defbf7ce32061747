use serde::Deserialize;

use crate::domain::{ApiKey, ApiSecret, MessageText, SenderId, SentMessage, TargetNumber};

use super::amount::BalanceAmount;
use super::{ApiFailure, TransportError};

/// Vonage reports per-message success as the string status `"0"`.
const STATUS_SUCCESS: &str = "0";

#[derive(Debug, Clone, Deserialize)]
struct VonageSendJsonResponse {
    #[serde(default)]
    messages: Vec<VonageMessageJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct VonageMessageJson {
    status: String,
    #[serde(default, rename = "message-id")]
    message_id: Option<String>,
    #[serde(default, rename = "remaining-balance")]
    remaining_balance: Option<BalanceAmount>,
    #[serde(default, rename = "error-text")]
    error_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct VonageErrorJson {
    #[serde(default, rename = "error-code")]
    error_code: Option<String>,
    #[serde(default, rename = "error-code-label")]
    error_code_label: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct VonageBalanceJson {
    value: BalanceAmount,
}

fn encode_auth(api_key: &ApiKey, api_secret: &ApiSecret) -> Vec<(String, String)> {
    vec![
        ("api_key".to_owned(), api_key.as_str().to_owned()),
        ("api_secret".to_owned(), api_secret.as_str().to_owned()),
    ]
}

/// Query parameters for `GET /account/get-balance`.
pub fn encode_vonage_auth_query(api_key: &ApiKey, api_secret: &ApiSecret) -> Vec<(String, String)> {
    encode_auth(api_key, api_secret)
}

/// Form body for `POST /sms/json`. Vonage takes the number without a `+` prefix.
pub fn encode_vonage_send_form(
    api_key: &ApiKey,
    api_secret: &ApiSecret,
    from: &SenderId,
    to: &TargetNumber,
    text: &MessageText,
) -> Vec<(String, String)> {
    let mut params = encode_auth(api_key, api_secret);
    params.push(("from".to_owned(), from.as_str().to_owned()));
    params.push(("to".to_owned(), to.raw().to_owned()));
    params.push(("text".to_owned(), text.as_str().to_owned()));
    params
}

/// Decode a `sms/json` response.
///
/// Vonage answers HTTP 200 even for rejected messages, so the outer `Result` covers
/// malformed bodies and the inner one carries the per-message verdict.
pub fn decode_vonage_send_response(
    json: &str,
) -> Result<Result<SentMessage, ApiFailure>, TransportError> {
    let parsed: VonageSendJsonResponse = serde_json::from_str(json)?;
    let first = parsed
        .messages
        .into_iter()
        .next()
        .ok_or(TransportError::NoMessages)?;

    if first.status == STATUS_SUCCESS {
        return Ok(Ok(SentMessage {
            message_id: first.message_id,
            remaining_balance: first.remaining_balance.map(BalanceAmount::into_string),
        }));
    }

    let message = first
        .error_text
        .unwrap_or_else(|| format!("message rejected with status {}", first.status));
    Ok(Err(ApiFailure {
        code: Some(first.status),
        message,
    }))
}

pub fn decode_vonage_balance(json: &str) -> Result<String, TransportError> {
    let parsed: VonageBalanceJson = serde_json::from_str(json)?;
    Ok(parsed.value.into_string())
}

/// Decode an HTTP-level error body.
///
/// The legacy endpoints answer with `error-code`/`error-code-label`, newer ones with an
/// RFC 7807 `title`/`detail` document; either shape is accepted.
pub fn decode_vonage_error(json: &str) -> Result<ApiFailure, TransportError> {
    let parsed: VonageErrorJson = serde_json::from_str(json)?;
    let message = match (parsed.error_code_label, parsed.title, parsed.detail) {
        (Some(label), _, _) => label,
        (None, Some(title), Some(detail)) => format!("{title}: {detail}"),
        (None, Some(title), None) => title,
        (None, None, Some(detail)) => detail,
        (None, None, None) => return Err(TransportError::NoErrors),
    };
    Ok(ApiFailure {
        code: parsed.error_code,
        message,
    })
}
