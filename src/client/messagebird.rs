use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::domain::{ApiKey, MessageText, Provider, SenderId, SentMessage, TargetNumber};
use crate::transport::{
    decode_messagebird_balance, decode_messagebird_error, decode_messagebird_message,
    encode_messagebird_message,
};

use super::{
    BoxFuture, HttpAuth, HttpBody, HttpRequest, HttpTransport, ProviderError, SmsProvider,
    endpoint, execute, verification_verdict,
};

#[derive(Clone)]
/// MessageBird REST API client (`AccessKey` authorization).
pub struct MessageBirdClient {
    api_key: ApiKey,
    originator: SenderId,
    base_url: Url,
    http: Arc<dyn HttpTransport>,
}

impl MessageBirdClient {
    pub(crate) fn with_transport(
        api_key: ApiKey,
        originator: SenderId,
        base_url: Url,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            api_key,
            originator,
            base_url,
            http,
        }
    }

    fn auth(&self) -> HttpAuth {
        HttpAuth::AccessKey(self.api_key.as_str().to_owned())
    }

    async fn balance(&self) -> Result<Option<String>, ProviderError> {
        let url = endpoint(&self.base_url, &["balance"])?;
        let request = HttpRequest::get(url).auth(self.auth());

        let response = execute(self.http.as_ref(), request, decode_messagebird_error).await?;
        Ok(Some(decode_messagebird_balance(&response.body)?))
    }

    async fn message_create(
        &self,
        originator: &SenderId,
        to: &TargetNumber,
        body: &MessageText,
    ) -> Result<SentMessage, ProviderError> {
        let url = endpoint(&self.base_url, &["messages"])?;
        let payload = serde_json::to_value(encode_messagebird_message(originator, to, body))
            .map_err(|err| ProviderError::Parse(Box::new(err)))?;
        let request = HttpRequest::post(url, HttpBody::Json(payload)).auth(self.auth());

        debug!(provider = "messagebird", to = to.raw(), "sending message");
        let response = execute(self.http.as_ref(), request, decode_messagebird_error).await?;
        Ok(decode_messagebird_message(&response.body)?)
    }
}

impl SmsProvider for MessageBirdClient {
    fn provider(&self) -> Provider {
        Provider::MessageBird
    }

    fn sender(&self) -> &SenderId {
        &self.originator
    }

    fn verify(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move { verification_verdict(Provider::MessageBird, self.balance().await) })
    }

    fn send<'a>(
        &'a self,
        from: &'a SenderId,
        to: &'a TargetNumber,
        body: &'a MessageText,
    ) -> BoxFuture<'a, Result<SentMessage, ProviderError>> {
        Box::pin(self.message_create(from, to, body))
    }
}
