use std::io;

use smsgate::{ProviderConfig, SmsProvider, TemplateParam};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = std::env::var("YEGOU_CONFIG").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            r#"YEGOU_CONFIG is required, e.g. {"provider":"yegou","app_key":"..","app_secret":"..","mode":"notify"}"#,
        )
    })?;
    let template = std::env::var("YEGOU_TEMPLATE_ID").unwrap_or_else(|_| "100000".to_owned());
    let phones = std::env::var("SMS_PHONE")?;

    let config: ProviderConfig = serde_json::from_str(&config)?;
    let mut sms: Box<dyn SmsProvider> = config.into_provider()?;
    sms.set_template_code(&template);
    sms.set_template_param(TemplateParam::code("123456"));

    let result = sms.send(&phones).await?;
    println!("success: {}, response: {:?}", result.is_success, result.message);

    Ok(())
}
