use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of request timestamps and replay-protection nonces.
///
/// Queried on every send; values are never cached between requests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn nonce(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall clock plus random v4 UUID nonces.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn nonce(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
