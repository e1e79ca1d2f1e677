//! Aliyun (Alibaba Cloud RPC) wire format: HMAC-SHA1 over the
//! percent-encoded canonical query string.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::transport::TransportError;
use crate::transport::canonical::{ParamSet, non_empty, percent_encode};

type HmacSha1 = Hmac<Sha1>;

pub const ACTION: &str = "SingleSendSms";
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const SIGNATURE_VERSION: &str = "1.0";
pub const FORMAT: &str = "JSON";
pub const API_VERSION: &str = "2016-09-27";
pub const DEFAULT_REGION: &str = "cn-hangzhou";
pub const SIGNATURE_FIELD: &str = "Signature";

const HTTP_METHOD: &str = "POST";

/// Dynamic inputs of one `SingleSendSms` call.
#[derive(Debug, Clone)]
pub struct SendParams<'a> {
    pub access_key_id: &'a str,
    pub region_id: &'a str,
    pub sign_name: &'a str,
    pub template_code: &'a str,
    pub param_string: &'a str,
    pub rec_num: &'a str,
    pub nonce: &'a str,
    pub timestamp: &'a str,
}

/// ISO 8601 in UTC: `YYYY-MM-DDThh:mm:ssZ`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn build_params(input: &SendParams<'_>) -> ParamSet {
    let mut params = ParamSet::new();
    params.insert("Action", ACTION.to_owned());
    params.insert("SignName", input.sign_name.to_owned());
    params.insert("TemplateCode", input.template_code.to_owned());
    params.insert("RecNum", input.rec_num.to_owned());
    params.insert("ParamString", input.param_string.to_owned());
    params.insert("AccessKeyId", input.access_key_id.to_owned());
    params.insert("RegionId", input.region_id.to_owned());
    params.insert("SignatureNonce", input.nonce.to_owned());
    params.insert("SignatureMethod", SIGNATURE_METHOD.to_owned());
    params.insert("SignatureVersion", SIGNATURE_VERSION.to_owned());
    params.insert("Format", FORMAT.to_owned());
    params.insert("Timestamp", input.timestamp.to_owned());
    params.insert("Version", API_VERSION.to_owned());
    params
}

/// `key=value&...` over non-empty values in canonical order, optionally
/// percent-encoding both sides of each pair.
pub fn param_string(params: &ParamSet, encode: bool) -> String {
    non_empty(params)
        .map(|(key, value)| {
            if encode {
                format!("{}={}", percent_encode(key), percent_encode(value))
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// `POST&%2F&<percent-encoded canonical query string>`.
pub fn string_to_sign(params: &ParamSet) -> String {
    format!(
        "{HTTP_METHOD}&{}&{}",
        percent_encode("/"),
        percent_encode(&param_string(params, true))
    )
}

/// Base64 HMAC-SHA1 of `string_to_sign` keyed by `secret&`, percent-encoded
/// for direct inclusion in the body.
pub fn sign(params: &ParamSet, secret: &str) -> Result<String, TransportError> {
    let key = format!("{secret}&");
    let mut mac =
        HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| TransportError::InvalidKey)?;
    mac.update(string_to_sign(params).as_bytes());
    let digest = BASE64.encode(mac.finalize().into_bytes());
    Ok(percent_encode(&digest))
}

/// Body: the unencoded parameter string with `&Signature=<signature>`
/// appended. The signature is already percent-encoded.
pub fn encode_request(params: &ParamSet, signature: &str) -> String {
    format!("{}&{SIGNATURE_FIELD}={signature}", param_string(params, false))
}
