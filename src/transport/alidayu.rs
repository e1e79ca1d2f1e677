//! Alidayu (Taobao open platform) wire format: MD5 envelope signing.

use chrono::{DateTime, TimeDelta, Utc};
use md5::{Digest, Md5};
use serde::Deserialize;

use crate::domain::SmsResult;
use crate::transport::TransportError;
use crate::transport::canonical::{ParamSet, encode_form_with_signature, non_empty};

pub const METHOD: &str = "alibaba.aliqin.fc.sms.num.send";
pub const FORMAT: &str = "json";
pub const SIMPLIFY: &str = "true";
pub const SMS_TYPE: &str = "normal";
pub const SIGN_METHOD: &str = "md5";
pub const API_VERSION: &str = "2.0";
pub const SIGN_FIELD: &str = "sign";

const ERROR_ENVELOPE_KEY: &str = "error_response";
const BEIJING_OFFSET_HOURS: i64 = 8;

/// Dynamic inputs of one `alibaba.aliqin.fc.sms.num.send` call.
#[derive(Debug, Clone)]
pub struct SendParams<'a> {
    pub app_key: &'a str,
    pub sign_name: &'a str,
    pub template_code: &'a str,
    pub sms_param: &'a str,
    pub rec_num: &'a str,
    pub timestamp: &'a str,
}

/// The gateway expects Beijing wall-clock time, `YYYY-MM-DD hh:mm:ss`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    (now + TimeDelta::hours(BEIJING_OFFSET_HOURS))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn build_params(input: &SendParams<'_>) -> ParamSet {
    let mut params = ParamSet::new();
    params.insert("app_key", input.app_key.to_owned());
    params.insert("method", METHOD.to_owned());
    params.insert("format", FORMAT.to_owned());
    params.insert("simplify", SIMPLIFY.to_owned());
    params.insert("sms_type", SMS_TYPE.to_owned());
    params.insert("sms_free_sign_name", input.sign_name.to_owned());
    params.insert("sign_method", SIGN_METHOD.to_owned());
    params.insert("sms_template_code", input.template_code.to_owned());
    params.insert("sms_param", input.sms_param.to_owned());
    params.insert("rec_num", input.rec_num.to_owned());
    params.insert("v", API_VERSION.to_owned());
    params.insert("timestamp", input.timestamp.to_owned());
    params
}

/// `key1value1key2value2...` over non-empty values, sorted by key.
pub fn canonical_string(params: &ParamSet) -> String {
    non_empty(params).fold(String::new(), |mut acc, (key, value)| {
        acc.push_str(key);
        acc.push_str(value);
        acc
    })
}

/// Uppercase hex MD5 of `secret + canonical + secret`.
pub fn sign(params: &ParamSet, secret: &str) -> String {
    let envelope = format!("{secret}{}{secret}", canonical_string(params));
    hex::encode_upper(Md5::digest(envelope.as_bytes()))
}

/// Form body: every parameter percent-encoded plus `sign`.
pub fn encode_request(params: &ParamSet, signature: &str) -> String {
    encode_form_with_signature(params, SIGN_FIELD, signature)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireCode {
    String(String),
    Number(serde_json::Number),
}

impl WireCode {
    fn into_string(self) -> String {
        match self {
            Self::String(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SuccessResponse {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    result: Option<SuccessResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct SuccessResult {
    #[serde(default)]
    err_code: Option<WireCode>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error_response: ErrorResult,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorResult {
    #[serde(default)]
    code: Option<WireCode>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    request_id: Option<String>,
}

/// Classify by the presence of the `error_response` envelope, then decode
/// the matching shape.
pub fn decode_response(body: &str) -> Result<SmsResult, TransportError> {
    if body.contains(ERROR_ENVELOPE_KEY) {
        let parsed: ErrorResponse = serde_json::from_str(body)?;
        let error = parsed.error_response;
        return Ok(SmsResult {
            is_success: false,
            code: error.code.map(WireCode::into_string),
            message: error.msg,
            model: None,
            request_id: error.request_id,
        });
    }

    let parsed: SuccessResponse = serde_json::from_str(body)?;
    let result = parsed.result.ok_or(TransportError::MissingField { field: "result" })?;
    Ok(SmsResult {
        is_success: result.success,
        code: result.err_code.map(WireCode::into_string),
        message: result.msg,
        model: result.model,
        request_id: parsed.request_id,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn scenario_params() -> ParamSet {
        build_params(&SendParams {
            app_key: "K",
            sign_name: "Co",
            template_code: "T",
            sms_param: r#"{"code":"123456"}"#,
            rec_num: "13800000000",
            timestamp: "2024-01-02 11:04:05",
        })
    }

    #[test]
    fn timestamp_is_beijing_time() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(now), "2024-01-02 11:04:05");

        let late = Utc.with_ymd_and_hms(2024, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(format_timestamp(late), "2025-01-01 04:00:00");
    }

    #[test]
    fn params_use_gateway_field_names() {
        let params = scenario_params();
        assert_eq!(params["app_key"], "K");
        assert_eq!(params["sms_template_code"], "T");
        assert_eq!(params["sms_param"], r#"{"code":"123456"}"#);
        assert_eq!(params["rec_num"], "13800000000");
        assert_eq!(params["sms_free_sign_name"], "Co");
        assert_eq!(params["method"], METHOD);
        assert_eq!(params["sign_method"], "md5");
        assert_eq!(params["v"], "2.0");
        assert_eq!(params.len(), 12);
    }

    #[test]
    fn canonical_string_concatenates_sorted_pairs_without_separators() {
        assert_eq!(
            canonical_string(&scenario_params()),
            concat!(
                "app_keyKformatjsonmethodalibaba.aliqin.fc.sms.num.send",
                "rec_num13800000000sign_methodmd5simplifytruesms_free_sign_nameCo",
                r#"sms_param{"code":"123456"}sms_template_codeTsms_typenormal"#,
                "timestamp2024-01-02 11:04:05v2.0"
            )
        );
    }

    #[test]
    fn sign_matches_known_vector() {
        let mut params = ParamSet::new();
        params.insert("b", "Y".to_owned());
        params.insert("a", "X".to_owned());
        params.insert("c", String::new());
        assert_eq!(sign(&params, "secret"), "0349D365DFEEFE52142B1DF1B1D6805F");
    }

    #[test]
    fn sign_matches_known_vector_for_send_scenario() {
        let signature = sign(&scenario_params(), "S");
        assert_eq!(signature, "C3F8ADF2F7EEA857048E263FFA802D0B");
        assert_eq!(signature, sign(&scenario_params(), "S"));
    }

    #[test]
    fn request_body_contains_encoded_params_and_sign() {
        let params = scenario_params();
        let body = encode_request(&params, &sign(&params, "S"));
        assert_eq!(
            body,
            concat!(
                "app_key=K&format=json&method=alibaba.aliqin.fc.sms.num.send",
                "&rec_num=13800000000&sign_method=md5&simplify=true&sms_free_sign_name=Co",
                "&sms_param=%7B%22code%22%3A%22123456%22%7D&sms_template_code=T",
                "&sms_type=normal&timestamp=2024-01-02+11%3A04%3A05&v=2.0",
                "&sign=C3F8ADF2F7EEA857048E263FFA802D0B"
            )
        );
    }

    #[test]
    fn decode_success_shape() {
        let json = r#"
        {
          "result": {"err_code": "0", "model": "134523^4351232", "success": true, "msg": "OK"},
          "request_id": "z29ci6jh3x0a"
        }
        "#;
        let result = decode_response(json).unwrap();
        assert!(result.is_success);
        assert_eq!(result.code.as_deref(), Some("0"));
        assert_eq!(result.message.as_deref(), Some("OK"));
        assert_eq!(result.model.as_deref(), Some("134523^4351232"));
        assert_eq!(result.request_id.as_deref(), Some("z29ci6jh3x0a"));
    }

    #[test]
    fn decode_error_shape() {
        let json = r#"
        {
          "error_response": {
            "code": 15,
            "msg": "Remote service error",
            "sub_code": "isv.BUSINESS_LIMIT_CONTROL",
            "sub_msg": "触发业务流控",
            "request_id": "iu2qbr2h5w3a"
          }
        }
        "#;
        let result = decode_response(json).unwrap();
        assert!(!result.is_success);
        assert_eq!(result.code.as_deref(), Some("15"));
        assert_eq!(result.message.as_deref(), Some("Remote service error"));
        assert_eq!(result.model, None);
        assert_eq!(result.request_id.as_deref(), Some("iu2qbr2h5w3a"));
    }

    #[test]
    fn decode_error_shape_accepts_string_code() {
        let json = r#"{"error_response":{"code":"25","msg":"Invalid signature"}}"#;
        let result = decode_response(json).unwrap();
        assert_eq!(result.code.as_deref(), Some("25"));
        assert_eq!(result.message.as_deref(), Some("Invalid signature"));
        assert_eq!(result.request_id, None);
    }

    #[test]
    fn decode_requires_result_object_on_success_shape() {
        assert!(matches!(
            decode_response(r#"{"request_id":"x"}"#),
            Err(TransportError::MissingField { field: "result" })
        ));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        assert!(matches!(
            decode_response("{ not json }"),
            Err(TransportError::Json(_))
        ));
    }
}
