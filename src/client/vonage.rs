use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::domain::{ApiKey, ApiSecret, MessageText, Provider, SenderId, SentMessage, TargetNumber};
use crate::transport::{
    decode_vonage_balance, decode_vonage_error, decode_vonage_send_response,
    encode_vonage_auth_query, encode_vonage_send_form,
};

use super::{
    BoxFuture, HttpBody, HttpRequest, HttpTransport, ProviderError, SmsProvider, endpoint,
    execute, verification_verdict,
};

#[derive(Clone)]
/// Vonage (formerly Nexmo) SMS API client.
///
/// Authentication travels as `api_key`/`api_secret` parameters on every call. The
/// sender is not part of the credentials; it comes from configuration.
pub struct VonageClient {
    api_key: ApiKey,
    api_secret: ApiSecret,
    sender: SenderId,
    base_url: Url,
    http: Arc<dyn HttpTransport>,
}

impl VonageClient {
    pub(crate) fn with_transport(
        api_key: ApiKey,
        api_secret: ApiSecret,
        sender: SenderId,
        base_url: Url,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            api_key,
            api_secret,
            sender,
            base_url,
            http,
        }
    }

    async fn get_balance(&self) -> Result<Option<String>, ProviderError> {
        let mut url = endpoint(&self.base_url, &["account", "get-balance"])?;
        url.query_pairs_mut()
            .extend_pairs(encode_vonage_auth_query(&self.api_key, &self.api_secret));

        let response = execute(self.http.as_ref(), HttpRequest::get(url), decode_vonage_error).await?;
        Ok(Some(decode_vonage_balance(&response.body)?))
    }

    async fn send_message(
        &self,
        from: &SenderId,
        to: &TargetNumber,
        text: &MessageText,
    ) -> Result<SentMessage, ProviderError> {
        let url = endpoint(&self.base_url, &["sms", "json"])?;
        let form = encode_vonage_send_form(&self.api_key, &self.api_secret, from, to, text);

        debug!(provider = "nexmo", to = to.raw(), "sending message");
        let response = execute(
            self.http.as_ref(),
            HttpRequest::post(url, HttpBody::Form(form)),
            decode_vonage_error,
        )
        .await?;
        Ok(decode_vonage_send_response(&response.body)??)
    }
}

impl SmsProvider for VonageClient {
    fn provider(&self) -> Provider {
        Provider::Vonage
    }

    fn sender(&self) -> &SenderId {
        &self.sender
    }

    fn verify(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move { verification_verdict(Provider::Vonage, self.get_balance().await) })
    }

    fn send<'a>(
        &'a self,
        from: &'a SenderId,
        to: &'a TargetNumber,
        body: &'a MessageText,
    ) -> BoxFuture<'a, Result<SentMessage, ProviderError>> {
        Box::pin(self.send_message(from, to, body))
    }
}
