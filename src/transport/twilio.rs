use serde::Deserialize;

use crate::domain::{MessageText, SenderId, SentMessage};

use super::{ApiFailure, TransportError};

#[derive(Debug, Clone, Deserialize)]
struct TwilioMessageJson {
    #[serde(default)]
    sid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwilioAccountJson {
    #[serde(default)]
    friendly_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TwilioErrorJson {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<u16>,
}

/// Form body for `POST /Accounts/{sid}/Messages.json`. `to` must already be E.164.
pub fn encode_twilio_send_form(
    to: &str,
    from: &SenderId,
    body: &MessageText,
) -> Vec<(String, String)> {
    vec![
        ("To".to_owned(), to.to_owned()),
        ("From".to_owned(), from.as_str().to_owned()),
        ("Body".to_owned(), body.as_str().to_owned()),
    ]
}

pub fn decode_twilio_message(json: &str) -> Result<SentMessage, TransportError> {
    let parsed: TwilioMessageJson = serde_json::from_str(json)?;
    Ok(SentMessage {
        message_id: parsed.sid,
        remaining_balance: None,
    })
}

/// Returns `(friendly_name, status)` of the fetched account.
pub fn decode_twilio_account(
    json: &str,
) -> Result<(Option<String>, Option<String>), TransportError> {
    let parsed: TwilioAccountJson = serde_json::from_str(json)?;
    Ok((parsed.friendly_name, parsed.status))
}

pub fn decode_twilio_error(json: &str) -> Result<ApiFailure, TransportError> {
    let parsed: TwilioErrorJson = serde_json::from_str(json)?;
    let message = match (parsed.message, parsed.status) {
        (Some(message), _) => message,
        (None, Some(status)) => format!("HTTP {status}"),
        (None, None) => "unknown Twilio error".to_owned(),
    };
    Ok(ApiFailure {
        code: parsed.code.map(|code| code.to_string()),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_send_form_uses_twilio_field_names() {
        let from = SenderId::new("+15005550006").unwrap();
        let body = MessageText::new("hello").unwrap();

        let params = encode_twilio_send_form("+6281234567890", &from, &body);
        assert_eq!(
            params,
            vec![
                ("To".to_owned(), "+6281234567890".to_owned()),
                ("From".to_owned(), "+15005550006".to_owned()),
                ("Body".to_owned(), "hello".to_owned()),
            ]
        );
    }

    #[test]
    fn decode_message_reads_sid() {
        let json = r#"
        {
          "sid": "SM1234567890abcdef",
          "status": "queued",
          "to": "+6281234567890"
        }
        "#;
        let sent = decode_twilio_message(json).unwrap();
        assert_eq!(sent.message_id.as_deref(), Some("SM1234567890abcdef"));
        assert_eq!(sent.remaining_balance, None);
    }

    #[test]
    fn decode_error_maps_code_and_message() {
        let json = r#"
        {
          "code": 21211,
          "message": "The 'To' number 6281234567890 is not a valid phone number.",
          "more_info": "https://www.twilio.com/docs/errors/21211",
          "status": 400
        }
        "#;
        let failure = decode_twilio_error(json).unwrap();
        assert_eq!(failure.code.as_deref(), Some("21211"));
        assert_eq!(
            failure.message,
            "The 'To' number 6281234567890 is not a valid phone number."
        );
    }

    #[test]
    fn decode_error_falls_back_to_http_status() {
        let failure = decode_twilio_error(r#"{"status": 401}"#).unwrap();
        assert_eq!(failure.code, None);
        assert_eq!(failure.message, "HTTP 401");
    }

    #[test]
    fn decode_account_reads_name_and_status() {
        let json = r#"{"sid": "AC1", "friendly_name": "main", "status": "active"}"#;
        let (name, status) = decode_twilio_account(json).unwrap();
        assert_eq!(name.as_deref(), Some("main"));
        assert_eq!(status.as_deref(), Some("active"));
    }
}
