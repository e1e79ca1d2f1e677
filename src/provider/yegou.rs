use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{BoxFuture, Clock, HttpTransport, ReqwestTransport, SmsError, SystemClock};
use crate::domain::{
    Credentials, Recipients, SmsResult, TemplateDraft, TemplateParam, TemplatePayload,
};
use crate::provider::{SmsProvider, resolve_gateway};
use crate::transport::yegou::{self, Mode, Outcome};

pub const DEFAULT_GATEWAY: &str = "https://sms.wilddog.com/api/v1/";

#[derive(Clone)]
/// YeGou (Wilddog) SMS gateway.
///
/// The target URL is `gateway + app_key + route`, where the route depends on
/// the [`Mode`]. Only the template code is mandatory; sign names are managed
/// on the YeGou side and `set_sign_name` has no effect.
pub struct YeGou {
    credentials: Credentials,
    gateway: String,
    mode: Mode,
    template: TemplateDraft,
    http: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
}

impl YeGou {
    /// Create a provider in [`Mode::Code`] using the default gateway.
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Result<Self, SmsError> {
        Ok(Self {
            credentials: Credentials::new(app_key, app_secret)?,
            gateway: DEFAULT_GATEWAY.to_owned(),
            mode: Mode::default(),
            template: TemplateDraft::default(),
            http: Arc::new(ReqwestTransport::new()),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_transport(mut self, http: Arc<dyn HttpTransport>) -> Self {
        self.http = http;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Full URL for the current mode.
    pub fn endpoint(&self) -> String {
        yegou::endpoint(
            resolve_gateway(&self.gateway, DEFAULT_GATEWAY),
            self.credentials.key.as_str(),
            self.mode,
        )
    }

    fn build_request(&self, recipients: &str) -> Result<String, SmsError> {
        let binding = self.template.bind(Recipients::new(recipients)?)?;
        let values = binding
            .payload()
            .map(TemplatePayload::to_values)
            .unwrap_or_default();

        let timestamp = yegou::format_timestamp(self.clock.now());
        let params = yegou::build_params(&yegou::SendParams {
            mode: self.mode,
            template_id: binding.code(),
            recipients: binding.recipients(),
            params: &values,
            timestamp: &timestamp,
        })
        .map_err(|err| SmsError::Encode(Box::new(err)))?;
        let signature = yegou::sign(&params, self.credentials.secret.expose());
        debug!(mode = %self.mode, signature = %signature, "signed yegou request");

        Ok(yegou::encode_request(&params, &signature))
    }
}

impl SmsProvider for YeGou {
    fn name(&self) -> &'static str {
        "yegou"
    }

    fn send<'a>(&'a self, recipients: &'a str) -> BoxFuture<'a, Result<SmsResult, SmsError>> {
        Box::pin(async move {
            let body = self.build_request(recipients)?;
            let url = self.endpoint();
            let response = crate::client::post_form(self.http.as_ref(), &url, body).await?;

            let outcome =
                yegou::decode_response(&response).map_err(|err| SmsError::Parse(Box::new(err)))?;
            match outcome {
                Outcome::Accepted(result) => Ok(result),
                Outcome::Rejected { code, message } => {
                    warn!(code = ?code, message = %message, "yegou rejected sms");
                    Err(SmsError::Provider {
                        code: code.map(|code| code.to_string()),
                        message,
                    })
                }
            }
        })
    }

    fn set_template_code(&mut self, code: &str) {
        self.template.code = code.to_owned();
    }

    fn set_template_param(&mut self, param: TemplateParam) {
        self.template.payload = Some(TemplatePayload::Structured(param));
    }

    fn set_template_string(&mut self, raw: &str) {
        self.template.payload = Some(TemplatePayload::Raw(raw.to_owned()));
    }

    fn set_sign_name(&mut self, _sign_name: &str) {}

    fn set_gateway(&mut self, gateway: &str) {
        self.gateway = gateway.to_owned();
    }
}
