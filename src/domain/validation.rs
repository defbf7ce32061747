use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    LineBreak { field: &'static str },
    UnknownProvider { input: String },
    InvalidPhoneNumber { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::LineBreak { field } => write!(f, "{field} must be a single line"),
            Self::UnknownProvider { input } => write!(
                f,
                "unknown provider: {input} (expected twilio, nexmo/vonage or messagebird)"
            ),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::ValidationError;

    #[test]
    fn display_messages_are_human_readable() {
        let err = ValidationError::Empty { field: "API_KEY" };
        assert_eq!(err.to_string(), "API_KEY must not be empty");

        let err = ValidationError::LineBreak {
            field: "API_SECRET",
        };
        assert_eq!(err.to_string(), "API_SECRET must be a single line");

        let err = ValidationError::UnknownProvider {
            input: "sinch".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "unknown provider: sinch (expected twilio, nexmo/vonage or messagebird)"
        );

        let err = ValidationError::InvalidPhoneNumber {
            input: "bad".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid phone number: bad");
    }
}
