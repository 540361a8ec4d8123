//! Request path construction for collection endpoints.
//!
//! Parameter order is fixed: `size`, `page`, search, `order`/`sort`, then
//! filters in key order. Identical queries always produce identical paths.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::query::{FilterValue, ListQuery};

/// Characters left alone by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode one query value or path segment.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// The query string for `query`, without the leading `?`.
pub fn build_query_string(query: &ListQuery) -> String {
    let mut params: Vec<(String, String)> = vec![
        ("size".to_string(), query.page_size().to_string()),
        ("page".to_string(), query.page().to_string()),
    ];

    if let Some(field) = query.search_field()
        && !query.search_text().is_empty()
    {
        params.push((field.to_string(), encode_component(query.search_text())));
    }

    if let (Some(field), Some(direction)) = (query.sort_field(), query.sort_direction()) {
        params.push(("order".to_string(), encode_component(field)));
        params.push(("sort".to_string(), direction.to_string()));
    }

    for (key, value) in query.filters() {
        let encoded = match value {
            FilterValue::Bool(_) | FilterValue::NotNull(_) => value.wire_value(),
            FilterValue::Enum(_) | FilterValue::Text(_) => encode_component(&value.wire_value()),
        };
        params.push((format!("{}{}", value.prefix(), key), encoded));
    }

    params
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Full request path: `<base>?<query string>`.
pub fn build_path(base: &str, query: &ListQuery) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{}", build_query_string(query))
}
