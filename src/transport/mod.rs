//! Transport layer: wire-format details per gateway (canonicalization,
//! signing, serialization/deserialization). No I/O.

pub mod alidayu;
pub mod aliyun;
pub mod canonical;
pub mod yegou;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing `{field}`")]
    MissingField { field: &'static str },

    #[error("signing key rejected by HMAC")]
    InvalidKey,
}
