//! Uniform client for Chinese cloud SMS gateways.
//!
//! Three gateways with incompatible signing schemes sit behind one
//! [`SmsProvider`] contract:
//!
//! - [`Alidayu`]: uppercase MD5 over `secret + sorted key/value pairs + secret`,
//! - [`Aliyun`]: HMAC-SHA1 over the RFC 3986 percent-encoded query string,
//! - [`YeGou`]: SHA-256 over `sorted k=v pairs & secret`.
//!
//! The crate is layered like a typed API client: a domain layer of validated
//! types, a transport layer for canonicalization and wire-format quirks, and
//! a provider layer orchestrating one signed HTTP POST per send.
//!
//! ```rust,no_run
//! use smsgate::{Alidayu, SmsProvider, TemplateParam};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsgate::SmsError> {
//!     let mut sms = Alidayu::new("app-key", "app-secret", "MyCompany")?;
//!     sms.set_template_code("SMS_0000001");
//!     sms.set_template_param(TemplateParam::code("123456"));
//!     let result = sms.send("13800000000").await?;
//!     println!("delivered: {}", result.is_success);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
pub mod provider;
mod transport;

pub use client::{
    Clock, HttpResponse, HttpTransport, ReqwestTransport, SmsError, SystemClock, TransportBuilder,
};
pub use domain::{
    AccessKey, Credentials, Recipients, Secret, SmsResult, TemplateBinding, TemplateParam,
    TemplatePayload, ValidationError,
};
pub use provider::{Alidayu, Aliyun, ProviderConfig, SmsProvider, YeGou, YeGouMode};
