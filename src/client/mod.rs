//! Client layer: outbound HTTP, error type and the time/nonce source the
//! providers are built on.

mod clock;
#[cfg(test)]
pub(crate) mod testing;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use crate::domain::{TemplateParamError, ValidationError};

pub use clock::{Clock, SystemClock};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
/// Status and body of a gateway response.
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound HTTP collaborator: POST a pre-encoded form body, return the raw
/// response.
///
/// The default implementation is [`ReqwestTransport`]; tests and callers with
/// their own HTTP stack can plug in anything that satisfies this trait.
pub trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone, Default)]
/// [`HttpTransport`] backed by a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a transport with custom settings.
    pub fn builder() -> TransportBuilder {
        TransportBuilder::new()
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, Default)]
/// Builder for [`ReqwestTransport`].
///
/// Use this when you need a request timeout or a custom user-agent.
pub struct TransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl TransportBuilder {
    /// Create a builder with no timeout/user-agent override.
    pub fn new() -> Self {
        Self::default()
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

    /// Build a [`ReqwestTransport`].
    pub fn build(self) -> Result<ReqwestTransport, SmsError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| SmsError::Transport(Box::new(err)))?;
        Ok(ReqwestTransport { client })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by every provider's `send`.
///
/// This error preserves:
/// - precondition failures caught before any request is built,
/// - HTTP-level failures (non-2xx status or transport failures),
/// - gateway rejections that the gateway reports as errors,
/// - encode/parse failures.
pub enum SmsError {
    /// Missing recipients, template code, template param or sign name.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the gateway.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The gateway answered but rejected the request.
    #[error("provider rejected request: {message}")]
    Provider { code: Option<String>, message: String },

    /// Request parameters could not be serialized or signed.
    #[error("encode error: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),
}

impl From<TemplateParamError> for SmsError {
    fn from(value: TemplateParamError) -> Self {
        match value {
            TemplateParamError::Missing(err) => Self::Validation(err),
            TemplateParamError::Encode(err) => Self::Encode(Box::new(err)),
        }
    }
}

/// POST `body` to `url` and hand back the body of a 2xx response.
pub(crate) async fn post_form(
    http: &dyn HttpTransport,
    url: &str,
    body: String,
) -> Result<String, SmsError> {
    debug!(url = %url, bytes = body.len(), "posting sms request");

    let response = http
        .post_form(url, body)
        .await
        .map_err(SmsError::Transport)?;

    debug!(url = %url, status = response.status, "gateway responded");

    if !(200..=299).contains(&response.status) {
        let body = if response.body.trim().is_empty() {
            None
        } else {
            Some(response.body)
        };
        return Err(SmsError::HttpStatus {
            status: response.status,
            body,
        });
    }

    Ok(response.body)
}
