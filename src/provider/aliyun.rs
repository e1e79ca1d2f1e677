use std::sync::Arc;

use tracing::{debug, info};

use crate::client::{BoxFuture, Clock, HttpTransport, ReqwestTransport, SmsError, SystemClock};
use crate::domain::{
    Credentials, Recipients, SIGN_NAME_FIELD, SmsResult, TemplateDraft, TemplateParam,
    TemplatePayload, ValidationError,
};
use crate::provider::{SmsProvider, resolve_gateway};
use crate::transport::aliyun;

pub const DEFAULT_GATEWAY: &str = "https://sms.aliyuncs.com";

#[derive(Clone)]
/// Aliyun (Alibaba Cloud) `SingleSendSms` gateway.
///
/// Requests are signed with HMAC-SHA1 over the percent-encoded canonical
/// query string. Any 2xx response counts as success; the body is only logged.
pub struct Aliyun {
    credentials: Credentials,
    region_id: String,
    sign_name: String,
    gateway: String,
    template: TemplateDraft,
    http: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
}

impl Aliyun {
    /// Create a provider; an empty `region_id` selects `cn-hangzhou`.
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        region_id: impl Into<String>,
        sign_name: impl Into<String>,
    ) -> Result<Self, SmsError> {
        let region_id = region_id.into();
        let region_id = if region_id.trim().is_empty() {
            aliyun::DEFAULT_REGION.to_owned()
        } else {
            region_id
        };

        Ok(Self {
            credentials: Credentials::new(access_key_id, access_key_secret)?,
            region_id,
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

    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    pub fn gateway(&self) -> &str {
        resolve_gateway(&self.gateway, DEFAULT_GATEWAY)
    }

    fn build_request(&self, recipients: &str) -> Result<String, SmsError> {
        let binding = self.template.bind(Recipients::new(recipients)?)?;
        let param_string = binding.required_param_string()?;
        if self.sign_name.is_empty() {
            return Err(ValidationError::Empty {
                field: SIGN_NAME_FIELD,
            }
            .into());
        }

        let timestamp = aliyun::format_timestamp(self.clock.now());
        let nonce = self.clock.nonce();
        let params = aliyun::build_params(&aliyun::SendParams {
            access_key_id: self.credentials.key.as_str(),
            region_id: &self.region_id,
            sign_name: &self.sign_name,
            template_code: binding.code(),
            param_string: &param_string,
            rec_num: binding.recipients().raw(),
            nonce: &nonce,
            timestamp: &timestamp,
        });
        let signature = aliyun::sign(&params, self.credentials.secret.expose())
            .map_err(|err| SmsError::Encode(Box::new(err)))?;
        debug!(
            string_to_sign = %aliyun::string_to_sign(&params),
            signature = %signature,
            "signed aliyun request"
        );

        Ok(aliyun::encode_request(&params, &signature))
    }
}

impl SmsProvider for Aliyun {
    fn name(&self) -> &'static str {
        "aliyun"
    }

    fn send<'a>(&'a self, recipients: &'a str) -> BoxFuture<'a, Result<SmsResult, SmsError>> {
        Box::pin(async move {
            let body = self.build_request(recipients)?;
            let response =
                crate::client::post_form(self.http.as_ref(), self.gateway(), body).await?;
            info!(response = %response, "aliyun sms send response");
            Ok(SmsResult::succeeded())
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

#[cfg(test)]
mod tests {
    use crate::client::testing::{FakeTransport, FixedClock};
    use crate::domain::TEMPLATE_CODE_FIELD;

    use super::*;

    fn provider(transport: &FakeTransport) -> Aliyun {
        Aliyun::new("testid", "testsecret", "", "Co")
            .unwrap()
            .with_transport(Arc::new(transport.clone()))
            .with_clock(Arc::new(FixedClock::new()))
    }

    fn configured(transport: &FakeTransport) -> Aliyun {
        let mut sms = provider(transport);
        sms.set_template_code("SMS_1");
        sms.set_template_param(TemplateParam::code("123456"));
        sms
    }

    #[test]
    fn empty_region_defaults_to_hangzhou() {
        let transport = FakeTransport::new(200, "{}");
        assert_eq!(provider(&transport).region_id(), "cn-hangzhou");

        let sms = Aliyun::new("id", "secret", "cn-beijing", "Co").unwrap();
        assert_eq!(sms.region_id(), "cn-beijing");
    }

    #[tokio::test]
    async fn send_posts_unencoded_params_with_signature() {
        let transport = FakeTransport::new(200, r#"{"Model":"abc","RequestId":"req-1"}"#);
        let sms = configured(&transport);

        let result = sms.send("13800000000").await.unwrap();
        assert!(result.is_success);
        assert_eq!(result, SmsResult::succeeded());

        let (url, body) = transport.last_request();
        assert_eq!(url.as_deref(), Some(DEFAULT_GATEWAY));
        assert_eq!(
            body.as_deref(),
            Some(concat!(
                "AccessKeyId=testid&Action=SingleSendSms&Format=JSON",
                r#"&ParamString={"code":"123456"}&RecNum=13800000000"#,
                "&RegionId=cn-hangzhou&SignName=Co&SignatureMethod=HMAC-SHA1",
                "&SignatureNonce=nonce-1&SignatureVersion=1.0&TemplateCode=SMS_1",
                "&Timestamp=2024-01-02T03:04:05Z&Version=2016-09-27",
                "&Signature=lmpyufMxXmu5flWUsUFb3VKf0FQ%3D"
            ))
        );
    }

    #[tokio::test]
    async fn any_successful_response_counts_as_success() {
        let transport = FakeTransport::new(200, "not even json");
        let sms = configured(&transport);
        assert!(sms.send("13800000000").await.unwrap().is_success);
    }

    #[tokio::test]
    async fn http_error_status_is_surfaced() {
        let transport = FakeTransport::new(400, r#"{"Code":"InvalidTemplateCode.Malformed"}"#);
        let sms = configured(&transport);

        let err = sms.send("13800000000").await.unwrap_err();
        assert!(matches!(err, SmsError::HttpStatus { status: 400, .. }));
    }

    #[tokio::test]
    async fn empty_recipients_fail_without_network_call() {
        let transport = FakeTransport::new(200, "{}");
        let sms = configured(&transport);

        assert!(matches!(
            sms.send("").await.unwrap_err(),
            SmsError::Validation(ValidationError::Empty {
                field: Recipients::FIELD
            })
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn unset_template_code_fails_validation() {
        let transport = FakeTransport::new(200, "{}");
        let mut sms = provider(&transport);
        sms.set_template_string(r#"{"code":"1"}"#);

        assert!(matches!(
            sms.send("13800000000").await.unwrap_err(),
            SmsError::Validation(ValidationError::Empty {
                field: TEMPLATE_CODE_FIELD
            })
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn missing_sign_name_fails_validation() {
        let transport = FakeTransport::new(200, "{}");
        let mut sms = configured(&transport);
        sms.set_sign_name("");

        assert!(matches!(
            sms.send("13800000000").await.unwrap_err(),
            SmsError::Validation(ValidationError::Empty {
                field: SIGN_NAME_FIELD
            })
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_propagated() {
        let transport = FakeTransport::failing("dns failure");
        let sms = configured(&transport);
        assert!(matches!(
            sms.send("13800000000").await.unwrap_err(),
            SmsError::Transport(_)
        ));
    }
}
