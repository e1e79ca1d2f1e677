//! Canonical parameter sets and the encodings shared by all gateways.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Gateway parameters keyed by their wire names.
///
/// `BTreeMap` iterates in ascending byte order of the key, which is the
/// canonical order every gateway signs in.
pub type ParamSet = BTreeMap<&'static str, String>;

/// `application/x-www-form-urlencoded` escaping of a single value
/// (space becomes `+`, only `*-._` and alphanumerics stay literal).
pub fn query_escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Rewrite form-encoded output into RFC 3986 form: `+` to `%20`, `*` to
/// `%2A`, `%7E` back to `~`.
pub fn rfc3986_fixup(encoded: &str) -> String {
    encoded
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// RFC 3986 percent-encoding as required by Alibaba Cloud RPC signing.
pub fn percent_encode(value: &str) -> String {
    rfc3986_fixup(&query_escape(value))
}

/// Non-empty entries, in canonical order.
pub fn non_empty(params: &ParamSet) -> impl Iterator<Item = (&'static str, &str)> {
    params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (*key, value.as_str()))
}

/// Form body with every entry (empty ones included) followed by the
/// signature field.
pub fn encode_form_with_signature(params: &ParamSet, field: &str, signature: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.append_pair(field, signature);
    serializer.finish()
}
