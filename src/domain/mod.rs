//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{
    SIGN_NAME_FIELD, TEMPLATE_CODE_FIELD, TEMPLATE_PARAM_FIELD, TemplateBinding, TemplateDraft,
    TemplateParam, TemplateParamError, TemplatePayload,
};
pub use response::SmsResult;
pub use validation::ValidationError;
pub use value::{AccessKey, Credentials, Recipients, Secret};
