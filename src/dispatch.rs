//! The per-recipient send loop.

use tracing::{debug, info, warn};

use crate::client::SmsProvider;
use crate::domain::{
    DispatchReport, MessageText, Provider, RecipientOutcome, SendOutcome, TargetNumber,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// A precondition that stopped a dispatch run before anything was sent.
pub enum DispatchError {
    #[error("no message found; set a message first")]
    MessageAbsent,

    #[error("target numbers file not found or empty")]
    TargetListAbsentOrEmpty,

    #[error("{provider} rejected the stored API credentials; set valid credentials first")]
    AuthenticationFailed { provider: Provider },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// No provider has been selected yet.
    Idle,
    ProviderSelected,
    Dispatching,
    Done,
}

/// Classify and, if valid, send to a single number.
///
/// Invalid numbers never reach the provider.
pub async fn send_one(
    provider: &dyn SmsProvider,
    number: &TargetNumber,
    message: &MessageText,
) -> SendOutcome {
    if !number.is_valid() {
        return SendOutcome::InvalidNumber;
    }
    provider
        .send(provider.sender(), number, message)
        .await
        .into()
}

/// Runs one message over a target list through a single provider.
///
/// Preconditions are checked before any outbound call, in order: a non-empty message,
/// a non-empty target list, then a fresh [`SmsProvider::verify`]. Once dispatching,
/// every target produces exactly one outcome and failures never stop the run.
pub struct DispatchLoop<'a> {
    provider: &'a dyn SmsProvider,
    state: DispatchState,
}

impl<'a> DispatchLoop<'a> {
    pub fn new(provider: &'a dyn SmsProvider) -> Self {
        Self {
            provider,
            state: DispatchState::ProviderSelected,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    fn transition(&mut self, next: DispatchState) {
        debug!(from = ?self.state, to = ?next, "dispatch state");
        self.state = next;
    }

    /// Run the loop, returning the ordered report.
    pub async fn run(
        &mut self,
        message: Option<&str>,
        targets: Option<Vec<TargetNumber>>,
    ) -> Result<DispatchReport, DispatchError> {
        self.run_with(message, targets, |_| {}).await
    }

    /// Like [`DispatchLoop::run`], handing each outcome to `observer` as soon as it exists.
    pub async fn run_with(
        &mut self,
        message: Option<&str>,
        targets: Option<Vec<TargetNumber>>,
        mut observer: impl FnMut(&RecipientOutcome),
    ) -> Result<DispatchReport, DispatchError> {
        let provider = self.provider.provider();

        let message = message
            .and_then(|text| MessageText::new(text).ok())
            .ok_or(DispatchError::MessageAbsent)?;

        let targets = match targets {
            Some(targets) if !targets.is_empty() => targets,
            _ => return Err(DispatchError::TargetListAbsentOrEmpty),
        };

        if !self.provider.verify().await {
            return Err(DispatchError::AuthenticationFailed { provider });
        }

        self.transition(DispatchState::Dispatching);
        info!(
            provider = provider.storage_name(),
            sender = self.provider.sender().as_str(),
            targets = targets.len(),
            "dispatch started"
        );

        let mut report = DispatchReport::default();
        for number in targets {
            let outcome = send_one(self.provider, &number, &message).await;
            match &outcome {
                SendOutcome::Sent(sent) => debug!(
                    number = number.raw(),
                    message_id = sent.message_id.as_deref().unwrap_or(""),
                    "sent"
                ),
                SendOutcome::Failed { reason } => {
                    warn!(number = number.raw(), reason = %reason, "send failed")
                }
                SendOutcome::InvalidNumber => debug!(number = number.raw(), "invalid number"),
            }

            let recipient = RecipientOutcome { number, outcome };
            observer(&recipient);
            report.push(recipient);
        }

        self.transition(DispatchState::Done);
        info!(
            provider = provider.storage_name(),
            sent = report.sent(),
            failed = report.failed(),
            invalid = report.invalid(),
            "dispatch finished"
        );
        Ok(report)
    }
}
