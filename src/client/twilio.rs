use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::domain::{AccountSid, AuthToken, MessageText, Provider, SenderId, SentMessage, TargetNumber};
use crate::transport::{
    decode_twilio_account, decode_twilio_error, decode_twilio_message, encode_twilio_send_form,
};

use super::{
    BoxFuture, HttpAuth, HttpBody, HttpRequest, HttpTransport, ProviderError, SmsProvider,
    endpoint, execute, verification_verdict,
};

const API_VERSION: &str = "2010-04-01";

#[derive(Clone)]
/// Twilio Programmable Messaging client.
///
/// Verifies by fetching `Accounts/{sid}.json` and sends through
/// `Accounts/{sid}/Messages.json`, both with HTTP basic auth (`sid:token`).
pub struct TwilioClient {
    account_sid: AccountSid,
    auth_token: AuthToken,
    from: SenderId,
    base_url: Url,
    http: Arc<dyn HttpTransport>,
}

impl TwilioClient {
    pub(crate) fn with_transport(
        account_sid: AccountSid,
        auth_token: AuthToken,
        from: SenderId,
        base_url: Url,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            account_sid,
            auth_token,
            from,
            base_url,
            http,
        }
    }

    fn auth(&self) -> HttpAuth {
        HttpAuth::Basic {
            username: self.account_sid.as_str().to_owned(),
            password: self.auth_token.as_str().to_owned(),
        }
    }

    async fn fetch_account(&self) -> Result<Option<String>, ProviderError> {
        let account = format!("{}.json", self.account_sid.as_str());
        let url = endpoint(&self.base_url, &[API_VERSION, "Accounts", &account])?;
        let request = HttpRequest::get(url).auth(self.auth());

        let response = execute(self.http.as_ref(), request, decode_twilio_error).await?;
        let (name, status) = decode_twilio_account(&response.body)?;
        Ok(match (name, status) {
            (Some(name), Some(status)) => Some(format!("{name} ({status})")),
            (name, status) => name.or(status),
        })
    }

    async fn create_message(
        &self,
        from: &SenderId,
        to: &TargetNumber,
        body: &MessageText,
    ) -> Result<SentMessage, ProviderError> {
        let to = to.e164()?;
        let url = endpoint(
            &self.base_url,
            &[API_VERSION, "Accounts", self.account_sid.as_str(), "Messages.json"],
        )?;
        let form = encode_twilio_send_form(&to, from, body);
        let request = HttpRequest::post(url, HttpBody::Form(form)).auth(self.auth());

        debug!(provider = "twilio", to = %to, "sending message");
        let response = execute(self.http.as_ref(), request, decode_twilio_error).await?;
        Ok(decode_twilio_message(&response.body)?)
    }
}

impl SmsProvider for TwilioClient {
    fn provider(&self) -> Provider {
        Provider::Twilio
    }

    fn sender(&self) -> &SenderId {
        &self.from
    }

    fn verify(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move { verification_verdict(Provider::Twilio, self.fetch_account().await) })
    }

    fn send<'a>(
        &'a self,
        from: &'a SenderId,
        to: &'a TargetNumber,
        body: &'a MessageText,
    ) -> BoxFuture<'a, Result<SentMessage, ProviderError>> {
        Box::pin(self.create_message(from, to, body))
    }
}
