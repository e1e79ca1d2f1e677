use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::validation::ValidationError;
use crate::domain::value::Recipients;

pub const TEMPLATE_CODE_FIELD: &str = "template_code";
pub const TEMPLATE_PARAM_FIELD: &str = "template_param";
pub const SIGN_NAME_FIELD: &str = "sign_name";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Named template variables, kept in insertion order.
///
/// Serializes as a JSON object (`{"code":"123456"}`), which is what the
/// Alibaba gateways expect. Setting an existing name replaces its value in
/// place.
pub struct TemplateParam {
    entries: Vec<(String, String)>,
}

impl TemplateParam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the common verification-code template: `{"code": <code>}`.
    pub fn code(code: impl Into<String>) -> Self {
        Self::new().with("code", code)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for TemplateParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Template fill-in data staged through `set_template_param` (structured)
/// or `set_template_string` (raw, passed to the gateway untouched).
pub enum TemplatePayload {
    Structured(TemplateParam),
    Raw(String),
}

impl TemplatePayload {
    /// String form used by gateways that take a JSON object.
    pub fn to_wire_string(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Structured(param) => param.to_json(),
            Self::Raw(raw) => Ok(raw.clone()),
        }
    }

    /// Positional values for gateways that take a list of arguments.
    pub fn to_values(&self) -> Vec<String> {
        match self {
            Self::Structured(param) => param.values().map(str::to_owned).collect(),
            Self::Raw(raw) => vec![raw.clone()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Mutable template state held by a provider between setter calls.
///
/// Last write wins. Turned into a [`TemplateBinding`] at the start of each send.
pub struct TemplateDraft {
    pub code: String,
    pub payload: Option<TemplatePayload>,
}

impl TemplateDraft {
    pub fn bind(&self, recipients: Recipients) -> Result<TemplateBinding, ValidationError> {
        TemplateBinding::new(self.code.clone(), self.payload.clone(), recipients)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable per-send snapshot: template id, its parameters and recipients.
///
/// Invariant: template code is non-empty.
pub struct TemplateBinding {
    code: String,
    payload: Option<TemplatePayload>,
    recipients: Recipients,
}

impl TemplateBinding {
    pub fn new(
        code: impl Into<String>,
        payload: Option<TemplatePayload>,
        recipients: Recipients,
    ) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.is_empty() {
            return Err(ValidationError::Empty {
                field: TEMPLATE_CODE_FIELD,
            });
        }
        Ok(Self {
            code,
            payload,
            recipients,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn payload(&self) -> Option<&TemplatePayload> {
        self.payload.as_ref()
    }

    pub fn recipients(&self) -> &Recipients {
        &self.recipients
    }

    /// Wire string of the payload, failing when nothing (or an empty string)
    /// was staged.
    pub fn required_param_string(&self) -> Result<String, TemplateParamError> {
        let encoded = match &self.payload {
            Some(payload) => payload.to_wire_string()?,
            None => String::new(),
        };
        if encoded.is_empty() {
            return Err(TemplateParamError::Missing(ValidationError::Empty {
                field: TEMPLATE_PARAM_FIELD,
            }));
        }
        Ok(encoded)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateParamError {
    #[error(transparent)]
    Missing(ValidationError),

    #[error("template param could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}
