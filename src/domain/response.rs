#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Normalized outcome of one send, independent of the gateway.
///
/// Text fields are `None` when the gateway did not report them.
pub struct SmsResult {
    pub is_success: bool,
    pub code: Option<String>,
    pub message: Option<String>,
    pub model: Option<String>,
    pub request_id: Option<String>,
}

impl SmsResult {
    pub fn succeeded() -> Self {
        Self {
            is_success: true,
            ..Self::default()
        }
    }
}
