//! Request builder: descriptor provenance + argument bag -> resolved HTTP request.
//!
//! Building is fail-open. Missing required arguments, unresolved placeholders and type mismatches
//! are passed through to the remote API, whose own error response is what the caller sees.

use crate::document::{CollectionFormat, HttpMethod, ParamLocation, Parameter, SwaggerDocument};
use crate::error::{Result, SwaggerToolsError};
use rmcp::model::JsonObject;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// A fully resolved outbound request. Built fresh per invocation.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    /// Absolute URL without the collected query parameters.
    pub url: Url,
    /// Query parameters by name (possibly empty, never omitted).
    pub query: JsonObject,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    collection_formats: HashMap<String, CollectionFormat>,
}

impl ResolvedRequest {
    /// Query parameters serialized to name/value pairs.
    ///
    /// Arrays follow the parameter's `collectionFormat` (default `csv`); objects expand to
    /// `name[key]=value`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (name, value) in &self.query {
            match value {
                Value::Array(items) => {
                    let format = self
                        .collection_formats
                        .get(name)
                        .copied()
                        .unwrap_or_default();
                    match format.separator() {
                        Some(sep) => {
                            let joined: Vec<String> = items.iter().map(value_to_string).collect();
                            pairs.push((name.clone(), joined.join(sep)));
                        }
                        None => {
                            pairs.extend(items.iter().map(|v| (name.clone(), value_to_string(v))));
                        }
                    }
                }
                Value::Object(fields) => {
                    pairs.extend(
                        fields
                            .iter()
                            .map(|(k, v)| (format!("{name}[{k}]"), value_to_string(v))),
                    );
                }
                other => pairs.push((name.clone(), value_to_string(other))),
            }
        }
        pairs
    }

    /// The request URL with the query parameters appended.
    #[must_use]
    pub fn full_url(&self) -> Url {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return self.url.clone();
        }

        let mut query = self.url.query().map(str::to_string).unwrap_or_default();
        for (key, value) in &pairs {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(&percent_encode(key));
            query.push('=');
            query.push_str(&percent_encode(value));
        }

        let mut url = self.url.clone();
        url.set_query(Some(&query));
        url
    }
}

/// Build the outbound request for one invocation.
///
/// # Errors
///
/// Returns an error only if the substituted path cannot be resolved against `base_url`.
pub fn build_request(
    method: HttpMethod,
    path_template: &str,
    parameters: &[Parameter],
    args: &JsonObject,
    base_url: &Url,
) -> Result<ResolvedRequest> {
    let mut path = path_template.to_string();
    for (key, value) in args {
        path = path.replace(&format!("{{{key}}}"), &percent_encode(&value_to_string(value)));
    }

    let mut query = JsonObject::new();
    let mut collection_formats = HashMap::new();
    let mut body = JsonObject::new();

    for param in parameters {
        let Some(value) = args.get(&param.name) else {
            continue;
        };

        match param.location {
            ParamLocation::Query => {
                query.insert(param.name.clone(), value.clone());
                if let Some(format) = param.collection_format {
                    collection_formats.insert(param.name.clone(), format);
                }
            }
            ParamLocation::Body => match value {
                Value::Object(fields) => {
                    body.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                other => {
                    body.insert(param.name.clone(), other.clone());
                }
            },
            // Already substituted into the path above.
            ParamLocation::Path => {}
            // Not forwarded; the only request header is the JSON content type.
            ParamLocation::Header | ParamLocation::FormData => {}
        }
    }

    let url = resolve_against_base(base_url, &path)?;

    let (body, headers) = if body.is_empty() {
        (None, Vec::new())
    } else {
        (
            Some(Value::Object(body)),
            vec![("content-type".to_string(), "application/json".to_string())],
        )
    };

    Ok(ResolvedRequest {
        method,
        url,
        query,
        body,
        headers,
        collection_formats,
    })
}

/// Absolute paths extend the base URL's path instead of replacing it.
fn resolve_against_base(base: &Url, path: &str) -> Result<Url> {
    if path.starts_with('/') {
        let mut url = base.clone();
        let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        return Ok(url);
    }

    base.join(path).map_err(|e| {
        SwaggerToolsError::Runtime(format!(
            "Failed to resolve path '{path}' against base URL {base}: {e}"
        ))
    })
}

/// Parse an absolute http(s) base URL.
///
/// # Errors
///
/// Returns an error if the URL is invalid, relative, or not http(s).
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| SwaggerToolsError::Config(format!("Invalid baseUrl '{base_url}': {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SwaggerToolsError::Config(format!(
            "Invalid baseUrl '{base_url}': must be an absolute http(s) URL"
        )));
    }
    if url.host_str().is_none() {
        return Err(SwaggerToolsError::Config(format!(
            "Invalid baseUrl '{base_url}': missing host"
        )));
    }
    Ok(url)
}

/// Base URL declared by the document: first scheme (default `https`), host (default
/// `localhost`), basePath (default empty).
///
/// # Errors
///
/// Returns an error if the declared parts don't form a valid URL.
pub fn document_base_url(doc: &SwaggerDocument) -> Result<Url> {
    let scheme = doc.schemes.first().map_or("https", String::as_str);
    let host = doc.host.as_deref().unwrap_or("localhost");
    let base_path = match doc.base_path.as_deref() {
        None | Some("") => String::new(),
        Some(p) if p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{p}"),
    };
    parse_base_url(&format!("{scheme}://{host}{base_path}"))
}

/// Convert a JSON value to a string for path/query parameters.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Percent-encode everything except RFC 3986 unreserved characters.
fn percent_encode(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn is_unreserved(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~')
}
