//! Client layer: one [`SmsProvider`] per vendor, sharing an HTTP transport seam.

mod messagebird;
mod twilio;
mod vonage;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::domain::{
    Credentials, MessageText, Provider, SenderId, SentMessage, TargetNumber, ValidationError,
};
use crate::transport::{ApiFailure, TransportError};

pub use messagebird::MessageBirdClient;
pub use twilio::TwilioClient;
pub use vonage::VonageClient;

pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";
pub const DEFAULT_VONAGE_BASE_URL: &str = "https://rest.nexmo.com";
pub const DEFAULT_MESSAGEBIRD_BASE_URL: &str = "https://rest.messagebird.com";
/// Sender id used for Vonage, whose credentials carry no sender of their own.
pub const DEFAULT_VONAGE_SENDER: &str = "MPS-SENDER";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HttpAuth {
    Basic { username: String, password: String },
    /// MessageBird `Authorization: AccessKey <key>` header.
    AccessKey(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HttpBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub auth: Option<HttpAuth>,
    pub body: HttpBody,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            auth: None,
            body: HttpBody::Empty,
        }
    }

    pub fn post(url: Url, body: HttpBody) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            auth: None,
            body,
        }
    }

    pub fn auth(mut self, auth: HttpAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

pub(crate) trait HttpTransport: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest)
    -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(request.url),
                HttpMethod::Post => self.client.post(request.url),
            };
            builder = match request.auth {
                Some(HttpAuth::Basic { username, password }) => {
                    builder.basic_auth(username, Some(password))
                }
                Some(HttpAuth::AccessKey(key)) => {
                    builder.header(reqwest::header::AUTHORIZATION, format!("AccessKey {key}"))
                }
                None => builder,
            };
            builder = match request.body {
                HttpBody::Empty => builder,
                HttpBody::Form(params) => builder.form(&params),
                HttpBody::Json(value) => builder.json(&value),
            };

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref()
        .map(|code| format!(" (code {code})"))
        .unwrap_or_default()
}

/// Longest excerpt of an unrecognized error body kept in a failure reason.
const BODY_EXCERPT_CHARS: usize = 120;

fn body_suffix(body: &Option<String>) -> String {
    let Some(body) = body else {
        return String::new();
    };
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => format!(": {}...", &collapsed[..cut]),
        None => format!(": {collapsed}"),
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by an [`SmsProvider`].
///
/// The `Display` output is what ends up as the per-recipient failure reason, so every
/// variant renders something a human can act on.
pub enum ProviderError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// Non-successful HTTP status code whose body was not a recognizable vendor error.
    #[error("unexpected HTTP status: {status}{}", body_suffix(.body))]
    HttpStatus { status: u16, body: Option<String> },

    /// The vendor rejected the request with a typed error payload.
    #[error("{message}{}", code_suffix(.code))]
    Api {
        code: Option<String>,
        message: String,
    },

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] BoxError),

    /// An endpoint URL could not be built from the configured base URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<ApiFailure> for ProviderError {
    fn from(value: ApiFailure) -> Self {
        Self::Api {
            code: value.code,
            message: value.message,
        }
    }
}

impl From<TransportError> for ProviderError {
    fn from(value: TransportError) -> Self {
        Self::Parse(Box::new(value))
    }
}

/// Capability shared by every vendor client.
///
/// Implementations perform exactly one outbound call per method and never retry.
pub trait SmsProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Sender identity used as the "from" value of every send.
    fn sender(&self) -> &SenderId;

    /// Lightweight authenticated read (account fetch or balance query).
    ///
    /// Returns `false` on any failure; errors are logged, never returned.
    fn verify(&self) -> BoxFuture<'_, bool>;

    /// Send `body` to a single recipient.
    fn send<'a>(
        &'a self,
        from: &'a SenderId,
        to: &'a TargetNumber,
        body: &'a MessageText,
    ) -> BoxFuture<'a, Result<SentMessage, ProviderError>>;
}

#[derive(Debug, Clone)]
/// HTTP and endpoint settings shared by all vendor clients.
///
/// Defaults point at the public vendor APIs with no timeout (transport default).
pub struct ClientConfig {
    twilio_base_url: String,
    vonage_base_url: String,
    messagebird_base_url: String,
    vonage_sender: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            twilio_base_url: DEFAULT_TWILIO_BASE_URL.to_owned(),
            vonage_base_url: DEFAULT_VONAGE_BASE_URL.to_owned(),
            messagebird_base_url: DEFAULT_MESSAGEBIRD_BASE_URL.to_owned(),
            vonage_sender: DEFAULT_VONAGE_SENDER.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Override the base URL of one vendor's API.
    pub fn base_url(mut self, provider: Provider, url: impl Into<String>) -> Self {
        let url = url.into();
        match provider {
            Provider::Twilio => self.twilio_base_url = url,
            Provider::Vonage => self.vonage_base_url = url,
            Provider::MessageBird => self.messagebird_base_url = url,
        }
        self
    }

    pub fn vonage_sender(mut self, sender: impl Into<String>) -> Self {
        self.vonage_sender = sender.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn base_url_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Twilio => &self.twilio_base_url,
            Provider::Vonage => &self.vonage_base_url,
            Provider::MessageBird => &self.messagebird_base_url,
        }
    }

    pub fn timeout_value(&self) -> Option<Duration> {
        self.timeout
    }

    fn build_transport(&self) -> Result<Arc<dyn HttpTransport>, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent.as_ref() {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder
            .build()
            .map_err(|err| ProviderError::Transport(Box::new(err)))?;
        Ok(Arc::new(ReqwestTransport { client }))
    }
}

/// Build the client matching `credentials`.
///
/// Only a fully populated [`Credentials`] value can reach this point, so an absent or
/// partial record can never produce a client.
pub fn connect(
    credentials: &Credentials,
    config: &ClientConfig,
) -> Result<Arc<dyn SmsProvider>, ProviderError> {
    let http = config.build_transport()?;
    connect_with(credentials, config, http)
}

pub(crate) fn connect_with(
    credentials: &Credentials,
    config: &ClientConfig,
    http: Arc<dyn HttpTransport>,
) -> Result<Arc<dyn SmsProvider>, ProviderError> {
    let raw_base = config.base_url_for(credentials.provider());
    let base_url = Url::parse(raw_base)
        .map_err(|err| ProviderError::InvalidEndpoint(format!("{raw_base}: {err}")))?;

    Ok(match credentials.clone() {
        Credentials::Twilio {
            account_sid,
            auth_token,
            from,
        } => Arc::new(TwilioClient::with_transport(
            account_sid,
            auth_token,
            from,
            base_url,
            http,
        )),
        Credentials::Vonage {
            api_key,
            api_secret,
        } => Arc::new(VonageClient::with_transport(
            api_key,
            api_secret,
            SenderId::new(config.vonage_sender.clone())?,
            base_url,
            http,
        )),
        Credentials::MessageBird {
            api_key,
            originator,
        } => Arc::new(MessageBirdClient::with_transport(
            api_key, originator, base_url, http,
        )),
    })
}

/// Collapse a verification call into the boolean contract of [`SmsProvider::verify`].
///
/// `detail` is whatever the vendor returned on success (balance, account status).
pub(crate) fn verification_verdict(
    provider: Provider,
    result: Result<Option<String>, ProviderError>,
) -> bool {
    match result {
        Ok(detail) => {
            tracing::info!(
                provider = provider.storage_name(),
                detail = detail.as_deref().unwrap_or(""),
                "credentials verified"
            );
            true
        }
        Err(err) => {
            tracing::warn!(
                provider = provider.storage_name(),
                error = %err,
                "credential verification failed"
            );
            false
        }
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::InvalidEndpoint(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Run `request` and turn a non-2xx response into the most specific error available.
///
/// `decode_error` tries the vendor's error payload first; if that fails the raw status
/// and (non-blank) body are kept.
pub(crate) async fn execute(
    http: &dyn HttpTransport,
    request: HttpRequest,
    decode_error: fn(&str) -> Result<ApiFailure, TransportError>,
) -> Result<HttpResponse, ProviderError> {
    let response = http
        .execute(request)
        .await
        .map_err(ProviderError::Transport)?;

    if response.is_success() {
        return Ok(response);
    }

    if let Ok(failure) = decode_error(&response.body) {
        return Err(failure.into());
    }

    let body = if response.body.trim().is_empty() {
        None
    } else {
        Some(response.body)
    };
    Err(ProviderError::HttpStatus {
        status: response.status,
        body,
    })
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeTransport, base};
    use super::*;

    #[test]
    fn endpoint_appends_encoded_segments() {
        let url = endpoint(&base("https://api.twilio.com"), &["2010-04-01", "Accounts", "AC 1.json"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.twilio.com/2010-04-01/Accounts/AC%201.json");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let url = endpoint(&base("http://127.0.0.1:9000/mock/"), &["balance"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/mock/balance");
    }

    #[test]
    fn endpoint_rejects_cannot_be_a_base_urls() {
        let err = endpoint(&base("mailto:ops@example.invalid"), &["x"]).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidEndpoint(_)));
    }

    #[test]
    fn api_error_display_includes_code_when_present() {
        let err = ProviderError::Api {
            code: Some("21211".to_owned()),
            message: "invalid To".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid To (code 21211)");

        let err = ProviderError::Api {
            code: None,
            message: "invalid To".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid To");
    }

    fn no_vendor_error(_: &str) -> Result<ApiFailure, TransportError> {
        Err(TransportError::NoErrors)
    }

    #[tokio::test]
    async fn execute_maps_non_success_status_with_body() {
        let transport = FakeTransport::new().respond(500, "oops");
        let request = HttpRequest::get(base("https://example.invalid/"));
        let err = execute(&transport, request, no_vendor_error)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::HttpStatus {
                status: 500,
                body: Some(_)
            }
        ));
        assert_eq!(err.to_string(), "unexpected HTTP status: 500: oops");
    }

    #[test]
    fn http_status_reason_carries_a_bounded_body_excerpt() {
        let err = ProviderError::HttpStatus {
            status: 502,
            body: Some("<html>\n  <h1>Bad   Gateway</h1>\n</html>".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "unexpected HTTP status: 502: <html> <h1>Bad Gateway</h1> </html>"
        );

        let err = ProviderError::HttpStatus {
            status: 500,
            body: Some("x".repeat(500)),
        };
        let expected = format!("unexpected HTTP status: 500: {}...", "x".repeat(120));
        assert_eq!(err.to_string(), expected);

        let err = ProviderError::HttpStatus {
            status: 503,
            body: None,
        };
        assert_eq!(err.to_string(), "unexpected HTTP status: 503");
    }

    #[tokio::test]
    async fn execute_maps_blank_body_to_none() {
        let transport = FakeTransport::new().respond(503, "   ");
        let request = HttpRequest::get(base("https://example.invalid/"));
        let err = execute(&transport, request, no_vendor_error)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::HttpStatus {
                status: 503,
                body: None
            }
        ));
    }

    #[tokio::test]
    async fn execute_maps_transport_failure() {
        let transport = FakeTransport::new().fail("connection refused");
        let request = HttpRequest::get(base("https://example.invalid/"));
        let err = execute(&transport, request, no_vendor_error)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn connect_picks_client_by_credentials_variant() {
        let config = ClientConfig::default();
        for credentials in [
            Credentials::twilio("AC1", "token", "+15005550006").unwrap(),
            Credentials::vonage("key", "secret").unwrap(),
            Credentials::messagebird("key", "MPS").unwrap(),
        ] {
            let client =
                connect_with(&credentials, &config, Arc::new(FakeTransport::new())).unwrap();
            assert_eq!(client.provider(), credentials.provider());
        }
    }

    #[test]
    fn vonage_client_uses_configured_sender() {
        let config = ClientConfig::default().vonage_sender("BRAND");
        let credentials = Credentials::vonage("key", "secret").unwrap();
        let client = connect_with(&credentials, &config, Arc::new(FakeTransport::new())).unwrap();
        assert_eq!(client.sender().as_str(), "BRAND");

        let client = connect_with(
            &credentials,
            &ClientConfig::default(),
            Arc::new(FakeTransport::new()),
        )
        .unwrap();
        assert_eq!(client.sender().as_str(), DEFAULT_VONAGE_SENDER);

        let blank = ClientConfig::default().vonage_sender("  ");
        let err = connect_with(&credentials, &blank, Arc::new(FakeTransport::new()))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn connect_rejects_unparseable_base_url() {
        let config = ClientConfig::default().base_url(Provider::Twilio, "not a url");
        let credentials = Credentials::twilio("AC1", "token", "+15005550006").unwrap();
        let err = connect_with(&credentials, &config, Arc::new(FakeTransport::new()))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::InvalidEndpoint(_)));
    }

    #[test]
    fn client_config_overrides_are_applied() {
        let config = ClientConfig::default()
            .base_url(Provider::MessageBird, "http://127.0.0.1:9000/")
            .timeout(Duration::from_secs(5))
            .user_agent("mps-sender-test");
        assert_eq!(
            config.base_url_for(Provider::MessageBird),
            "http://127.0.0.1:9000/"
        );
        assert_eq!(config.base_url_for(Provider::Twilio), DEFAULT_TWILIO_BASE_URL);
        assert_eq!(config.timeout_value(), Some(Duration::from_secs(5)));
        assert!(connect(&Credentials::vonage("k", "s").unwrap(), &config).is_ok());
    }
}
