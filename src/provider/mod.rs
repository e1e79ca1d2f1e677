//! Provider layer: one contract, three gateways.
//!
//! Callers stage template data through setters, then call
//! [`SmsProvider::send`]. Each `send` snapshots the staged state, validates
//! it, signs a fresh request and performs exactly one HTTP POST.

mod alidayu;
mod aliyun;
mod yegou;

use std::sync::Arc;

use serde::Deserialize;

use crate::client::{BoxFuture, Clock, HttpTransport, ReqwestTransport, SmsError, SystemClock};
use crate::domain::{SmsResult, TemplateParam};

pub use alidayu::Alidayu;
pub use aliyun::Aliyun;
pub use yegou::YeGou;

pub use crate::transport::yegou::Mode as YeGouMode;

/// Uniform send contract implemented by every gateway.
///
/// Setters are last-write-wins and are expected before `send`. `send` only
/// reads the provider, so a configured provider may be shared between
/// concurrent sends.
pub trait SmsProvider: Send + Sync {
    /// Stable provider key, e.g. `"aliyun"`.
    fn name(&self) -> &'static str;

    /// Send the staged template to `recipients` (comma-separated when the
    /// gateway accepts several numbers).
    fn send<'a>(&'a self, recipients: &'a str) -> BoxFuture<'a, Result<SmsResult, SmsError>>;

    fn set_template_code(&mut self, code: &str);

    fn set_template_param(&mut self, param: TemplateParam);

    fn set_template_string(&mut self, raw: &str);

    fn set_sign_name(&mut self, sign_name: &str);

    fn set_gateway(&mut self, gateway: &str);
}

/// An empty override means "use the default".
pub(crate) fn resolve_gateway<'a>(configured: &'a str, default: &'static str) -> &'a str {
    if configured.is_empty() {
        default
    } else {
        configured
    }
}

#[derive(Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
/// Provider selection as it would appear in an application config file.
///
/// ```rust
/// let config: smsgate::ProviderConfig = serde_json::from_str(
///     r#"{"provider":"yegou","app_key":"app","app_secret":"secret","mode":"notify"}"#,
/// ).unwrap();
/// let sms = config.into_provider().unwrap();
/// assert_eq!(sms.name(), "yegou");
/// ```
pub enum ProviderConfig {
    Alidayu {
        app_key: String,
        app_secret: String,
        #[serde(default)]
        sign_name: String,
        #[serde(default)]
        gateway: Option<String>,
    },
    Aliyun {
        access_key_id: String,
        access_key_secret: String,
        #[serde(default)]
        region_id: String,
        #[serde(default)]
        sign_name: String,
        #[serde(default)]
        gateway: Option<String>,
    },
    YeGou {
        app_key: String,
        app_secret: String,
        #[serde(default)]
        mode: Option<String>,
        #[serde(default)]
        gateway: Option<String>,
    },
}

impl ProviderConfig {
    /// Build the configured provider with the default HTTP client and clock.
    pub fn into_provider(self) -> Result<Box<dyn SmsProvider>, SmsError> {
        self.into_provider_with(Arc::new(ReqwestTransport::new()), Arc::new(SystemClock))
    }

    /// Like [`ProviderConfig::into_provider`], with injected collaborators.
    pub fn into_provider_with(
        self,
        http: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Box<dyn SmsProvider>, SmsError> {
        let (mut provider, gateway): (Box<dyn SmsProvider>, Option<String>) = match self {
            Self::Alidayu {
                app_key,
                app_secret,
                sign_name,
                gateway,
            } => {
                let sms = Alidayu::new(app_key, app_secret, sign_name)?
                    .with_transport(http)
                    .with_clock(clock);
                (Box::new(sms), gateway)
            }
            Self::Aliyun {
                access_key_id,
                access_key_secret,
                region_id,
                sign_name,
                gateway,
            } => {
                let sms = Aliyun::new(access_key_id, access_key_secret, region_id, sign_name)?
                    .with_transport(http)
                    .with_clock(clock);
                (Box::new(sms), gateway)
            }
            Self::YeGou {
                app_key,
                app_secret,
                mode,
                gateway,
            } => {
                let mode = mode
                    .as_deref()
                    .map(YeGouMode::from)
                    .unwrap_or_default();
                let sms = YeGou::new(app_key, app_secret)?
                    .with_mode(mode)
                    .with_transport(http)
                    .with_clock(clock);
                (Box::new(sms), gateway)
            }
        };

        if let Some(gateway) = gateway {
            provider.set_gateway(&gateway);
        }
        Ok(provider)
    }
}
