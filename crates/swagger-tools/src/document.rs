//! Swagger 2.0 document model.
//!
//! Only the parts of the document that drive tool generation and request building are modeled;
//! everything else is ignored during deserialization. The model is expected to be built from an
//! already dereferenced document (see [`crate::resolver`]).

use crate::error::{Result, SwaggerToolsError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A parsed, dereferenced Swagger document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDocument {
    #[serde(default)]
    pub swagger: Option<String>,
    /// Present only on OpenAPI 3.x documents, which are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub schemes: Vec<String>,
    /// Path template -> raw path item. Kept raw so `x-*` extensions at this level don't break
    /// parsing; see [`Self::path_items`].
    #[serde(default)]
    pub paths: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SwaggerDocument {
    /// Parse a dereferenced document value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not look like a Swagger 2.0 document.
    pub fn from_value(value: Value, location: &str) -> Result<Self> {
        let doc: SwaggerDocument =
            serde_json::from_value(value).map_err(|e| SwaggerToolsError::SpecParse {
                location: location.to_string(),
                message: e.to_string(),
            })?;
        doc.check_version(location)?;
        Ok(doc)
    }

    fn check_version(&self, location: &str) -> Result<()> {
        if let Some(v) = &self.openapi {
            return Err(SwaggerToolsError::SpecParse {
                location: location.to_string(),
                message: format!("OpenAPI {v} documents are not supported (expected swagger: \"2.0\")"),
            });
        }
        match self.swagger.as_deref() {
            Some("2.0") => Ok(()),
            Some(other) => Err(SwaggerToolsError::SpecParse {
                location: location.to_string(),
                message: format!("unsupported swagger version '{other}' (expected \"2.0\")"),
            }),
            None => Err(SwaggerToolsError::SpecParse {
                location: location.to_string(),
                message: "missing 'swagger' version field".to_string(),
            }),
        }
    }

    /// Iterate path items in document order, skipping `x-*` extension keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no `paths` collection or a path item is malformed.
    pub fn path_items(&self) -> Result<Vec<(&str, PathItem)>> {
        let paths = self.paths.as_ref().ok_or_else(|| {
            SwaggerToolsError::Config("Swagger document has no 'paths' collection".to_string())
        })?;

        let mut out = Vec::with_capacity(paths.len());
        for (path, raw) in paths {
            if path.starts_with("x-") {
                continue;
            }
            let item: PathItem = serde_json::from_value(raw.clone()).map_err(|e| {
                SwaggerToolsError::Config(format!("Invalid path item '{path}': {e}"))
            })?;
            out.push((path.as_str(), item));
        }
        Ok(out)
    }
}

/// One entry of `paths`: shared parameters plus method -> operation entries.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Method keys (and any extension keys) in document order.
    #[serde(flatten)]
    pub entries: IndexMap<String, Value>,
}

impl PathItem {
    /// Operations for the supported methods, in document order.
    ///
    /// Other keys (`options`, `head`, `x-*`, ...) are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a supported method's operation is malformed.
    pub fn operations(&self) -> Result<Vec<(HttpMethod, Operation)>> {
        let mut ops = Vec::new();
        for (key, raw) in &self.entries {
            let Some(method) = HttpMethod::from_key(key) else {
                tracing::debug!(key = %key, "skipping unsupported path item key");
                continue;
            };
            let op: Operation = serde_json::from_value(raw.clone()).map_err(|e| {
                SwaggerToolsError::Config(format!("Invalid '{key}' operation: {e}"))
            })?;
            ops.push((method, op));
        }
        Ok(ops)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// A single parameter declaration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(default, rename = "type")]
    pub param_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    /// Body parameters carry their shape here instead of `type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<CollectionFormat>,
}

impl Parameter {
    /// Declared primitive type, falling back to `schema.type` for body parameters.
    #[must_use]
    pub fn declared_type(&self) -> Option<&str> {
        self.param_type.as_deref().or_else(|| {
            self.schema
                .as_ref()
                .and_then(|s| s.get("type"))
                .and_then(Value::as_str)
        })
    }

    /// Declared item type for array parameters.
    #[must_use]
    pub fn item_type(&self) -> Option<&str> {
        self.items
            .as_ref()
            .or_else(|| self.schema.as_ref().and_then(|s| s.get("items")))
            .and_then(|i| i.get("type"))
            .and_then(Value::as_str)
    }
}

/// Parameter location (`in`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
}

impl ParamLocation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Body => "body",
            ParamLocation::FormData => "formData",
        }
    }
}

/// Array serialization for query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionFormat {
    #[default]
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

impl CollectionFormat {
    /// Separator for the joined forms; `None` for `multi` (one pair per item).
    #[must_use]
    pub fn separator(self) -> Option<&'static str> {
        match self {
            CollectionFormat::Csv => Some(","),
            CollectionFormat::Ssv => Some(" "),
            CollectionFormat::Tsv => Some("\t"),
            CollectionFormat::Pipes => Some("|"),
            CollectionFormat::Multi => None,
        }
    }
}

/// HTTP methods that become tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Map a path item key to a supported method. Keys are matched case-sensitively, as written
    /// in Swagger documents.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    #[must_use]
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}
