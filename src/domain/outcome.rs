use crate::domain::value::TargetNumber;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Vendor acknowledgement of a single accepted message.
pub struct SentMessage {
    /// Vendor message id (Twilio `sid`, Vonage `message-id`, MessageBird `id`), when returned.
    pub message_id: Option<String>,
    /// Account balance after the send, when the vendor reports it (Vonage only).
    pub remaining_balance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-recipient result of a dispatch run.
pub enum SendOutcome {
    /// The vendor accepted the message.
    Sent(SentMessage),
    /// The vendor (or the network) rejected the single send attempt.
    Failed { reason: String },
    /// The number did not pass validation; no send was attempted.
    InvalidNumber,
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

impl<E: std::fmt::Display> From<Result<SentMessage, E>> for SendOutcome {
    fn from(value: Result<SentMessage, E>) -> Self {
        match value {
            Ok(sent) => Self::Sent(sent),
            Err(err) => Self::Failed {
                reason: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientOutcome {
    pub number: TargetNumber,
    pub outcome: SendOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ordered outcomes of one dispatch run, one per target list entry.
pub struct DispatchReport {
    pub outcomes: Vec<RecipientOutcome>,
}

impl DispatchReport {
    pub fn push(&mut self, outcome: RecipientOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn sent(&self) -> usize {
        self.count(|o| matches!(o, SendOutcome::Sent(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SendOutcome::Failed { .. }))
    }

    pub fn invalid(&self) -> usize {
        self.count(|o| matches!(o, SendOutcome::InvalidNumber))
    }

    fn count(&self, pred: impl Fn(&SendOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|it| pred(&it.outcome)).count()
    }
}
