//! Session: the explicit state machine behind every user-facing action.
//!
//! A session starts [`SessionState::Idle`], moves to [`SessionState::ProviderSelected`]
//! once a provider with stored credentials is chosen, and ends in
//! [`SessionState::Closed`] after [`Session::quit`]. Setup actions replace the selection
//! wholesale; nothing mutates a live selection.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::client::{self, ProviderError, SmsProvider};
use crate::config::Config;
use crate::dispatch::{DispatchError, DispatchLoop, DispatchState};
use crate::domain::{
    Credentials, DispatchReport, MessageText, Provider, RecipientOutcome, SenderId,
    ValidationError,
};
use crate::store::{CredentialStore, MessageStore, TargetList};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown provider selection: {0}")]
    UnknownProviderSelection(String),

    #[error("no provider selected; set the API credentials first")]
    NoProviderSelected,

    #[error("{provider} credentials are missing or malformed; set the API credentials first")]
    CredentialsAbsentOrMalformed { provider: Provider },

    #[error("failed to authenticate with the {provider} API")]
    AuthenticationFailed { provider: Provider },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to build {provider} client: {source}")]
    Client {
        provider: Provider,
        #[source]
        source: ProviderError,
    },

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session is closed")]
    SessionClosed,
}

/// Parse user input into a [`Provider`], reporting unknown names as
/// [`SessionError::UnknownProviderSelection`].
pub fn parse_provider(input: &str) -> Result<Provider, SessionError> {
    input
        .parse()
        .map_err(|_| SessionError::UnknownProviderSelection(input.trim().to_owned()))
}

type Connector =
    Box<dyn Fn(&Credentials) -> Result<Arc<dyn SmsProvider>, ProviderError> + Send + Sync>;

#[derive(Clone)]
/// The active provider and its live client. Immutable once built.
pub struct ProviderSelection {
    provider: Provider,
    client: Arc<dyn SmsProvider>,
}

impl ProviderSelection {
    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn sender(&self) -> &SenderId {
        self.client.sender()
    }

    pub fn client(&self) -> &dyn SmsProvider {
        self.client.as_ref()
    }
}

impl fmt::Debug for ProviderSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSelection")
            .field("provider", &self.provider)
            .field("sender", self.sender())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    ProviderSelected(ProviderSelection),
    Closed,
}

pub struct Session {
    credentials: CredentialStore,
    message: MessageStore,
    targets: TargetList,
    connect: Connector,
    state: SessionState,
}

impl Session {
    /// Session over `config.data_dir`, talking to the configured vendor endpoints.
    pub fn new(config: &Config) -> Self {
        let client_config = config.client_config();
        Self::with_connector(&config.data_dir, move |credentials| {
            client::connect(credentials, &client_config)
        })
    }

    /// Session with a custom client factory.
    pub fn with_connector(
        data_dir: &Path,
        connect: impl Fn(&Credentials) -> Result<Arc<dyn SmsProvider>, ProviderError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(data_dir),
            message: MessageStore::new(data_dir),
            targets: TargetList::new(data_dir),
            connect: Box::new(connect),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selection(&self) -> Option<&ProviderSelection> {
        match &self.state {
            SessionState::ProviderSelected(selection) => Some(selection),
            _ => None,
        }
    }

    pub fn dispatch_state(&self) -> DispatchState {
        match self.state {
            SessionState::ProviderSelected(_) => DispatchState::ProviderSelected,
            _ => DispatchState::Idle,
        }
    }

    pub fn credential_store(&self) -> &CredentialStore {
        &self.credentials
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Closed => Err(SessionError::SessionClosed),
            _ => Ok(()),
        }
    }

    fn build_selection(&self, credentials: &Credentials) -> Result<ProviderSelection, SessionError> {
        let provider = credentials.provider();
        let client = (self.connect)(credentials)
            .map_err(|source| SessionError::Client { provider, source })?;
        Ok(ProviderSelection { provider, client })
    }

    /// Select `provider` using its stored credentials.
    ///
    /// No network call is made here; a dispatch run verifies the credentials freshly.
    pub fn select_provider(
        &mut self,
        provider: Provider,
    ) -> Result<ProviderSelection, SessionError> {
        self.ensure_open()?;
        let credentials = self
            .credentials
            .load(provider)
            .ok_or(SessionError::CredentialsAbsentOrMalformed { provider })?;

        let selection = self.build_selection(&credentials)?;
        info!(provider = provider.storage_name(), "provider selected");
        self.state = SessionState::ProviderSelected(selection.clone());
        Ok(selection)
    }

    /// Store `credentials`, then verify them against the live API.
    ///
    /// The file is written even when verification fails, so a later run can retry
    /// without re-entering them. The current selection only changes on success.
    pub async fn set_credentials(
        &mut self,
        credentials: Credentials,
    ) -> Result<ProviderSelection, SessionError> {
        self.ensure_open()?;
        let provider = credentials.provider();
        self.credentials.save(&credentials)?;

        let selection = self.build_selection(&credentials)?;
        if !selection.client().verify().await {
            return Err(SessionError::AuthenticationFailed { provider });
        }

        info!(provider = provider.storage_name(), "credentials stored and verified");
        self.state = SessionState::ProviderSelected(selection.clone());
        Ok(selection)
    }

    /// Validate and store the outbound message.
    pub fn set_message(&mut self, text: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        let message = MessageText::new(text)?;
        self.message.save(message.as_str())?;
        Ok(())
    }

    /// Replace the target list. Numbers are stored as given apart from trailing
    /// whitespace; validation happens per recipient at dispatch time.
    pub fn set_targets<S: AsRef<str>>(&mut self, numbers: &[S]) -> Result<usize, SessionError> {
        self.ensure_open()?;
        self.targets.save(numbers)?;
        Ok(numbers.len())
    }

    /// Run the stored message over the stored target list.
    pub async fn dispatch(
        &self,
        observer: impl FnMut(&RecipientOutcome),
    ) -> Result<DispatchReport, SessionError> {
        let selection = match &self.state {
            SessionState::ProviderSelected(selection) => selection,
            SessionState::Idle => return Err(SessionError::NoProviderSelected),
            SessionState::Closed => return Err(SessionError::SessionClosed),
        };

        let message = self.message.load()?;
        let targets = self.targets.load()?;

        let mut dispatch = DispatchLoop::new(selection.client());
        Ok(dispatch
            .run_with(message.as_deref(), targets, observer)
            .await?)
    }

    pub fn quit(&mut self) {
        info!("session closed");
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use tempfile::{TempDir, tempdir};

    use crate::client::fake::FakeProvider;
    use crate::domain::SendOutcome;

    use super::*;

    fn session_with(provider: Arc<FakeProvider>) -> (TempDir, Session) {
        let temp_dir = tempdir().unwrap();
        let session = Session::with_connector(temp_dir.path(), move |_| {
            Ok(provider.clone() as Arc<dyn SmsProvider>)
        });
        (temp_dir, session)
    }

    #[test]
    fn parse_provider_maps_unknown_names() {
        assert_eq!(parse_provider("twilio").unwrap(), Provider::Twilio);
        assert!(matches!(
            parse_provider(" sinch "),
            Err(SessionError::UnknownProviderSelection(name)) if name == "sinch"
        ));
    }

    #[test]
    fn select_provider_requires_stored_credentials() {
        let (_dir, mut session) = session_with(Arc::new(FakeProvider::new(true)));

        let err = session.select_provider(Provider::Vonage).unwrap_err();
        assert!(matches!(
            err,
            SessionError::CredentialsAbsentOrMalformed {
                provider: Provider::Vonage
            }
        ));
        assert!(matches!(session.state(), SessionState::Idle));
        assert_eq!(session.dispatch_state(), DispatchState::Idle);
    }

    #[test]
    fn select_provider_with_stored_credentials_makes_no_outbound_call() {
        let fake = Arc::new(FakeProvider::new(true));
        let (_dir, mut session) = session_with(fake.clone());
        session
            .credential_store()
            .save(&Credentials::vonage("k", "s").unwrap())
            .unwrap();

        let selection = session.select_provider(Provider::Vonage).unwrap();
        assert_eq!(selection.provider(), Provider::Vonage);
        assert_eq!(session.dispatch_state(), DispatchState::ProviderSelected);
        assert_eq!(fake.outbound_calls(), 0);
    }

    #[tokio::test]
    async fn set_credentials_saves_and_verifies() {
        let fake = Arc::new(FakeProvider::new(true));
        let (_dir, mut session) = session_with(fake.clone());
        let credentials = Credentials::messagebird("key", "MPS").unwrap();

        let selection = session.set_credentials(credentials.clone()).await.unwrap();
        assert_eq!(selection.provider(), Provider::MessageBird);
        assert_eq!(fake.calls().verify, 1);
        assert_eq!(
            session.credential_store().load(Provider::MessageBird),
            Some(credentials)
        );
    }

    #[tokio::test]
    async fn rejected_credentials_are_kept_on_disk_but_not_selected() {
        let (_dir, mut session) = session_with(Arc::new(FakeProvider::new(false)));
        let credentials = Credentials::twilio("AC1", "bad", "+15005550006").unwrap();

        let err = session.set_credentials(credentials.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::AuthenticationFailed {
                provider: Provider::Twilio
            }
        ));
        assert!(session.selection().is_none());
        assert_eq!(
            session.credential_store().load(Provider::Twilio),
            Some(credentials)
        );
    }

    #[tokio::test]
    async fn dispatch_without_selection_is_rejected() {
        let fake = Arc::new(FakeProvider::new(true));
        let (_dir, session) = session_with(fake.clone());

        let err = session.dispatch(|_| {}).await.unwrap_err();
        assert!(matches!(err, SessionError::NoProviderSelected));
        assert_eq!(fake.outbound_calls(), 0);
    }

    #[tokio::test]
    async fn dispatch_runs_stored_message_over_stored_targets() {
        let fake = Arc::new(FakeProvider::new(true).failing("6289876543210"));
        let (_dir, mut session) = session_with(fake.clone());
        session
            .set_credentials(Credentials::messagebird("key", "MPS").unwrap())
            .await
            .unwrap();
        session.set_message("Halo!\nbaris kedua").unwrap();
        session
            .set_targets(&["6281234567890", "0812", "6289876543210"])
            .unwrap();

        let report = session.dispatch(|_| {}).await.unwrap();
        let outcomes = report
            .outcomes
            .iter()
            .map(|o| &o.outcome)
            .collect::<Vec<_>>();
        assert!(matches!(outcomes[0], SendOutcome::Sent(_)));
        assert_eq!(outcomes[1], &SendOutcome::InvalidNumber);
        assert!(matches!(outcomes[2], SendOutcome::Failed { .. }));

        let calls = fake.calls();
        assert_eq!(calls.verify, 2);
        assert_eq!(calls.sent_to, vec!["6281234567890", "6289876543210"]);
    }

    #[tokio::test]
    async fn dispatch_with_missing_message_makes_no_outbound_call() {
        let fake = Arc::new(FakeProvider::new(true));
        let (_dir, mut session) = session_with(fake.clone());
        session
            .credential_store()
            .save(&Credentials::vonage("k", "s").unwrap())
            .unwrap();
        session.select_provider(Provider::Vonage).unwrap();
        session.set_targets(&["6281234567890"]).unwrap();

        let err = session.dispatch(|_| {}).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Dispatch(DispatchError::MessageAbsent)
        ));
        assert_eq!(fake.outbound_calls(), 0);
    }

    #[tokio::test]
    async fn dispatch_with_missing_target_file_makes_no_outbound_call() {
        let fake = Arc::new(FakeProvider::new(true));
        let (_dir, mut session) = session_with(fake.clone());
        session
            .credential_store()
            .save(&Credentials::vonage("k", "s").unwrap())
            .unwrap();
        session.select_provider(Provider::Vonage).unwrap();
        session.set_message("hello").unwrap();

        let err = session.dispatch(|_| {}).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Dispatch(DispatchError::TargetListAbsentOrEmpty)
        ));
        assert_eq!(fake.outbound_calls(), 0);
    }

    #[test]
    fn set_message_rejects_blank_text() {
        let (_dir, mut session) = session_with(Arc::new(FakeProvider::new(true)));
        assert!(matches!(
            session.set_message("  "),
            Err(SessionError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn quit_closes_the_session() {
        let (_dir, mut session) = session_with(Arc::new(FakeProvider::new(true)));
        session.quit();

        assert!(matches!(session.state(), SessionState::Closed));
        assert!(matches!(
            session.set_message("hello"),
            Err(SessionError::SessionClosed)
        ));
        assert!(matches!(
            session.select_provider(Provider::Twilio),
            Err(SessionError::SessionClosed)
        ));
        assert!(matches!(
            session.dispatch(|_| {}).await,
            Err(SessionError::SessionClosed)
        ));
    }
}
