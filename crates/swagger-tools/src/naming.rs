//! Tool name generation.

use crate::document::{HttpMethod, Operation};

/// Generate the exposed tool name for an operation.
///
/// An `operationId` is trusted to already be a legal tool name and is used verbatim. Otherwise the
/// name is derived from the method and path template: `{x}` segments become `by_x`, every other
/// non-alphanumeric character becomes `_`.
#[must_use]
pub fn generate_tool_name(
    prefix: &str,
    method: HttpMethod,
    path: &str,
    operation: &Operation,
) -> String {
    if let Some(op_id) = &operation.operation_id {
        return format!("{prefix}{op_id}");
    }
    generate_canonical_name(prefix, method, path)
}

/// Name derived from method + path only.
///
/// A path without segments (`/`) yields `<prefix><method>_`.
#[must_use]
pub fn generate_canonical_name(prefix: &str, method: HttpMethod, path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(transform_segment)
        .collect();

    format!("{prefix}{}_{}", method.as_str(), segments.join("_"))
}

fn transform_segment(segment: &str) -> String {
    if let Some(inner) = segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
    {
        return format!("by_{inner}");
    }

    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
