use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{BoxFuture, Clock, HttpTransport, ReqwestTransport, SmsError, SystemClock};
use crate::domain::{
    Credentials, Recipients, SIGN_NAME_FIELD, SmsResult, TemplateDraft, TemplateParam,
    TemplatePayload, ValidationError,
};
use crate::provider::{SmsProvider, resolve_gateway};
use crate::transport::alidayu;

pub const DEFAULT_GATEWAY: &str = "http://gw.api.taobao.com/router/rest";

#[derive(Clone)]
/// Alidayu (Taobao open platform) SMS gateway.
///
/// Requests carry an uppercase MD5 `sign` over the sorted parameters wrapped
/// in the app secret. Requires template code, template param and sign name.
pub struct Alidayu {
    credentials: Credentials,
    sign_name: String,
    gateway: String,
    template: TemplateDraft,
    http: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
}

impl Alidayu {
    /// Create a provider using the default gateway and a default HTTP client.
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        sign_name: impl Into<String>,
    ) -> Result<Self, SmsError> {
        Ok(Self {
            credentials: Credentials::new(app_key, app_secret)?,
            sign_name: sign_name.into(),
            gateway: DEFAULT_GATEWAY.to_owned(),
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

    pub fn gateway(&self) -> &str {
        resolve_gateway(&self.gateway, DEFAULT_GATEWAY)
    }

    /// Validate staged state and produce the signed form body.
    fn build_request(&self, recipients: &str) -> Result<String, SmsError> {
        let binding = self.template.bind(Recipients::new(recipients)?)?;
        let sms_param = binding.required_param_string()?;
        if self.sign_name.is_empty() {
            return Err(ValidationError::Empty {
                field: SIGN_NAME_FIELD,
            }
            .into());
        }

        let timestamp = alidayu::format_timestamp(self.clock.now());
        let params = alidayu::build_params(&alidayu::SendParams {
            app_key: self.credentials.key.as_str(),
            sign_name: &self.sign_name,
            template_code: binding.code(),
            sms_param: &sms_param,
            rec_num: binding.recipients().raw(),
            timestamp: &timestamp,
        });
        let signature = alidayu::sign(&params, self.credentials.secret.expose());
        debug!(
            canonical = %alidayu::canonical_string(&params),
            sign = %signature,
            "signed alidayu request"
        );

        Ok(alidayu::encode_request(&params, &signature))
    }
}

impl SmsProvider for Alidayu {
    fn name(&self) -> &'static str {
        "alidayu"
    }

    fn send<'a>(&'a self, recipients: &'a str) -> BoxFuture<'a, Result<SmsResult, SmsError>> {
        Box::pin(async move {
            let body = self.build_request(recipients)?;
            let response =
                crate::client::post_form(self.http.as_ref(), self.gateway(), body).await?;

            let result = alidayu::decode_response(&response)
                .map_err(|err| SmsError::Parse(Box::new(err)))?;
            if !result.is_success {
                warn!(
                    code = ?result.code,
                    message = ?result.message,
                    request_id = ?result.request_id,
                    "alidayu rejected sms"
                );
            }
            Ok(result)
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

    fn set_sign_name(&mut self, sign_name: &str) {
        self.sign_name = sign_name.to_owned();
    }

    fn set_gateway(&mut self, gateway: &str) {
        self.gateway = gateway.to_owned();
    }
}
