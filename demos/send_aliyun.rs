use std::io;
use std::sync::Arc;
use std::time::Duration;

use smsgate::{Aliyun, ReqwestTransport, SmsProvider, TemplateParam};
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

    let access_key_id = required("ALIYUN_ACCESS_KEY_ID")?;
    let access_key_secret = required("ALIYUN_ACCESS_KEY_SECRET")?;
    let region_id = std::env::var("ALIYUN_REGION_ID").unwrap_or_default();
    let sign_name = required("ALIYUN_SIGN_NAME")?;
    let template = required("ALIYUN_TEMPLATE_CODE")?;
    let phone = required("SMS_PHONE")?;

    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_secs(10))
        .user_agent("smsgate-demo")
        .build()?;

    let mut sms = Aliyun::new(access_key_id, access_key_secret, region_id, sign_name)?
        .with_transport(Arc::new(transport));
    sms.set_template_code(&template);
    sms.set_template_param(TemplateParam::code("123456"));

    let result = sms.send(&phone).await?;
    println!("success: {}", result.is_success);

    Ok(())
}
