use std::io;

use smsgate::{Alidayu, SmsProvider, TemplateParam};
use tracing_subscriber::EnvFilter;

fn required(name: &str) -> io::Result<String> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app_key = required("ALIDAYU_APP_KEY")?;
    let app_secret = required("ALIDAYU_APP_SECRET")?;
    let sign_name = required("ALIDAYU_SIGN_NAME")?;
    let template = required("ALIDAYU_TEMPLATE_CODE")?;
    let phone = required("SMS_PHONE")?;
    let code = std::env::var("SMS_CODE").unwrap_or_else(|_| "123456".to_owned());

    let mut sms = Alidayu::new(app_key, app_secret, sign_name)?;
    sms.set_template_code(&template);
    sms.set_template_param(TemplateParam::code(code));

    let result = sms.send(&phone).await?;
    println!(
        "success: {}, code: {:?}, message: {:?}, request_id: {:?}",
        result.is_success, result.code, result.message, result.request_id
    );

    Ok(())
}
