//! YeGou (Wilddog SMS) wire format: salted SHA-256 signing and sub-route
//! selection.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::{Recipients, SmsResult};
use crate::transport::TransportError;
use crate::transport::canonical::{ParamSet, encode_form_with_signature, non_empty};

pub const CODE_ROUTE: &str = "/code/send";
pub const NOTIFY_ROUTE: &str = "/notify/send";
pub const SIGNATURE_FIELD: &str = "signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Which send route a YeGou request goes to.
pub enum Mode {
    /// Verification code to a single number.
    #[default]
    Code,
    /// Notification to one or more numbers.
    Notify,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Notify => "notify",
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            Self::Code => CODE_ROUTE,
            Self::Notify => NOTIFY_ROUTE,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"notify"` (any case) selects [`Mode::Notify`]; every other value falls
/// back to [`Mode::Code`].
impl From<&str> for Mode {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("notify") {
            Self::Notify
        } else {
            Self::Code
        }
    }
}

impl FromStr for Mode {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value))
    }
}

/// `gateway + app_key + route`.
pub fn endpoint(gateway: &str, app_key: &str, mode: Mode) -> String {
    format!("{gateway}{app_key}{}", mode.route())
}

/// Millisecond Unix timestamp.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

/// Dynamic inputs of one send call.
#[derive(Debug, Clone)]
pub struct SendParams<'a> {
    pub mode: Mode,
    pub template_id: &'a str,
    pub recipients: &'a Recipients,
    pub params: &'a [String],
    pub timestamp: &'a str,
}

pub fn build_params(input: &SendParams<'_>) -> Result<ParamSet, TransportError> {
    let mut params = ParamSet::new();
    params.insert("templateId", input.template_id.to_owned());
    match input.mode {
        Mode::Notify => {
            params.insert("mobiles", input.recipients.joined());
        }
        Mode::Code => {
            params.insert("mobile", input.recipients.raw().to_owned());
        }
    }
    if !input.params.is_empty() {
        params.insert("params", serde_json::to_string(input.params)?);
    }
    params.insert("timestamp", input.timestamp.to_owned());
    Ok(params)
}

/// `k1=v1&k2=v2...&secret` over non-empty values, sorted by key.
pub fn string_to_sign(params: &ParamSet, secret: &str) -> String {
    let pairs = non_empty(params)
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{pairs}&{secret}")
}

/// Lowercase hex SHA-256 of [`string_to_sign`].
pub fn sign(params: &ParamSet, secret: &str) -> String {
    hex::encode(Sha256::digest(string_to_sign(params, secret).as_bytes()))
}

pub fn encode_request(params: &ParamSet, signature: &str) -> String {
    encode_form_with_signature(params, SIGNATURE_FIELD, signature)
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errcode: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Outcome of a YeGou response: success means the error `message` is absent
/// or empty. The documented success shape (`status`/`data`) is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(SmsResult),
    Rejected { code: Option<i64>, message: String },
}

pub fn decode_response(body: &str) -> Result<Outcome, TransportError> {
    let parsed: ErrorResponse = serde_json::from_str(body)?;
    match parsed.message {
        Some(message) if !message.is_empty() => Ok(Outcome::Rejected {
            code: parsed.errcode,
            message,
        }),
        _ => Ok(Outcome::Accepted(SmsResult {
            message: Some(body.to_owned()),
            ..SmsResult::succeeded()
        })),
    }
}
