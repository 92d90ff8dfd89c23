//! Swagger `$ref` dereferencer.
//!
//! Swagger 2.0 documents commonly share parameters and schemas through `$ref`, sometimes split
//! across files (or URLs). The whole document is dereferenced once at load time, so the rest of
//! the crate only ever sees inline definitions.
//!
//! Supported references:
//! - Local refs (`#/...`)
//! - File refs (`./common.yaml#/...`, `/abs/path/spec.yaml#/...`, `file:///...#/...`)
//! - URL refs (`https://example.com/common.yaml#/...`)
//!
//! `$ref` resolution is **relative to the document that contains the `$ref`**. A reference that
//! points back at one of its own ancestors is left in place as a `$ref` object.

use crate::config::SpecSource;
use crate::error::{Result, SwaggerToolsError};
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocId {
    Url(Url),
    File(PathBuf),
}

impl DocId {
    /// Document identifier for the configured root source.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL source is not a valid URL.
    pub fn from_source(source: &SpecSource) -> Result<Self> {
        match source {
            SpecSource::Url(url) => {
                let url = Url::parse(url).map_err(|e| {
                    SwaggerToolsError::Config(format!("Invalid Swagger document URL '{url}': {e}"))
                })?;
                Ok(DocId::Url(strip_fragment(url)))
            }
            SpecSource::File(path) => Ok(DocId::File(canonicalize_best_effort(path.clone()))),
        }
    }

    fn display(&self) -> String {
        match self {
            DocId::Url(u) => u.to_string(),
            DocId::File(p) => p.display().to_string(),
        }
    }
}

fn strip_fragment(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}

fn canonicalize_best_effort(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}

type WalkFuture<'b> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'b>>;

#[derive(Debug)]
pub struct ReferenceResolver<'a> {
    root_doc: DocId,
    client: &'a Client,
    docs: RwLock<HashMap<DocId, Arc<Value>>>,
}

impl<'a> ReferenceResolver<'a> {
    /// Create a resolver for a root document that has already been loaded.
    #[must_use]
    pub fn new(root_doc: DocId, root_value: Value, client: &'a Client) -> Self {
        let mut docs = HashMap::new();
        docs.insert(root_doc.clone(), Arc::new(root_value));
        Self {
            root_doc,
            client,
            docs: RwLock::new(docs),
        }
    }

    /// Dereference the whole root document.
    ///
    /// # Errors
    ///
    /// Returns an error if a reference cannot be resolved, or if a referenced document cannot be
    /// loaded/parsed.
    pub async fn dereference_root(&self) -> Result<Value> {
        let root = self.load_doc(&self.root_doc).await?;
        let mut stack = Vec::new();
        self.walk(self.root_doc.clone(), (*root).clone(), &mut stack)
            .await
    }

    fn walk<'b>(&'b self, doc: DocId, value: Value, stack: &'b mut Vec<String>) -> WalkFuture<'b> {
        Box::pin(async move {
            match value {
                Value::Object(map) => {
                    let reference = map.get("$ref").and_then(Value::as_str).map(str::to_string);
                    if let Some(reference) = reference {
                        let key = Self::canonical_ref_key(&doc, &reference)?;
                        if stack.contains(&key) {
                            tracing::debug!(reference = %reference, "leaving cyclic $ref in place");
                            return Ok(Value::Object(map));
                        }

                        let (target_doc, target) = self.resolve_ref_value(&doc, &reference).await?;
                        stack.push(key);
                        let resolved = self.walk(target_doc, target, stack).await;
                        stack.pop();
                        return resolved;
                    }

                    let mut out = Map::with_capacity(map.len());
                    for (k, v) in map {
                        let v = self.walk(doc.clone(), v, stack).await?;
                        out.insert(k, v);
                    }
                    Ok(Value::Object(out))
                }
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for v in items {
                        out.push(self.walk(doc.clone(), v, stack).await?);
                    }
                    Ok(Value::Array(out))
                }
                other => Ok(other),
            }
        })
    }

    async fn resolve_ref_value(
        &self,
        current_doc: &DocId,
        reference: &str,
    ) -> Result<(DocId, Value)> {
        let (target_doc, pointer) = Self::parse_ref(current_doc, reference)?;
        let doc_value = self.load_doc(&target_doc).await?;

        let selected = if let Some(ptr) = pointer {
            doc_value.pointer(&ptr).cloned().ok_or_else(|| {
                SwaggerToolsError::Reference(format!(
                    "Unresolved $ref '{}' (doc {}, missing pointer '{}')",
                    reference,
                    target_doc.display(),
                    ptr
                ))
            })?
        } else {
            (*doc_value).clone()
        };

        Ok((target_doc, selected))
    }

    fn parse_ref(current_doc: &DocId, reference: &str) -> Result<(DocId, Option<String>)> {
        let (doc_part, frag_part) = match reference.split_once('#') {
            Some((d, f)) => (d, Some(f)),
            None => (reference, None),
        };

        let target_doc = Self::resolve_doc(current_doc, doc_part)?;

        let ptr = match frag_part {
            Some("") | None => None,
            Some(frag) if frag.starts_with('/') => Some(frag.to_string()),
            Some(_) => {
                return Err(SwaggerToolsError::Reference(format!(
                    "Unsupported $ref fragment (expected JSON pointer starting with '/'): {reference}",
                )));
            }
        };

        Ok((target_doc, ptr))
    }

    fn resolve_doc(current_doc: &DocId, doc_part: &str) -> Result<DocId> {
        if doc_part.is_empty() {
            return Ok(current_doc.clone());
        }

        if doc_part.starts_with("http://") || doc_part.starts_with("https://") {
            let url = Url::parse(doc_part).map_err(|e| {
                SwaggerToolsError::Reference(format!("Bad $ref URL '{doc_part}': {e}"))
            })?;
            return Ok(DocId::Url(strip_fragment(url)));
        }

        if doc_part.starts_with("file://") {
            let url = Url::parse(doc_part).map_err(|e| {
                SwaggerToolsError::Reference(format!("Bad $ref file URL '{doc_part}': {e}"))
            })?;
            let path = url.to_file_path().map_err(|()| {
                SwaggerToolsError::Reference(format!("Bad $ref file URL (not a path): {doc_part}"))
            })?;
            return Ok(DocId::File(canonicalize_best_effort(path)));
        }

        match current_doc {
            DocId::Url(base) => {
                let joined = base.join(doc_part).map_err(|e| {
                    SwaggerToolsError::Reference(format!(
                        "Failed to resolve relative $ref '{doc_part}' against base {base}: {e}",
                    ))
                })?;
                Ok(DocId::Url(strip_fragment(joined)))
            }
            DocId::File(base) => {
                let resolved = if Path::new(doc_part).is_absolute() {
                    PathBuf::from(doc_part)
                } else {
                    base.parent()
                        .unwrap_or_else(|| Path::new("."))
                        .join(doc_part)
                };
                Ok(DocId::File(canonicalize_best_effort(resolved)))
            }
        }
    }

    fn canonical_ref_key(current_doc: &DocId, reference: &str) -> Result<String> {
        let (target_doc, pointer) = Self::parse_ref(current_doc, reference)?;
        let mut key = match &target_doc {
            DocId::Url(u) => format!("url:{u}"),
            DocId::File(p) => format!("file:{}", p.display()),
        };
        if let Some(ptr) = pointer {
            key.push('#');
            key.push_str(&ptr);
        }
        Ok(key)
    }

    async fn load_doc(&self, doc: &DocId) -> Result<Arc<Value>> {
        if let Some(v) = self.docs.read().get(doc).cloned() {
            return Ok(v);
        }

        let content = match doc {
            DocId::File(path) => std::fs::read_to_string(path).map_err(|e| {
                SwaggerToolsError::Reference(format!(
                    "Failed to read referenced file {}: {e}",
                    path.display(),
                ))
            })?,
            DocId::Url(url) => self
                .client
                .get(url.clone())
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| {
                    SwaggerToolsError::Reference(format!(
                        "Failed to fetch referenced URL {}: {}",
                        crate::redact::redact_url(url),
                        crate::redact::sanitize_reqwest_error(&e)
                    ))
                })?
                .text()
                .await
                .map_err(|e| {
                    SwaggerToolsError::Reference(format!(
                        "Failed to read referenced URL body: {}",
                        crate::redact::sanitize_reqwest_error(&e)
                    ))
                })?,
        };

        // YAML is a superset of JSON.
        let parsed: Value = serde_yaml::from_str(&content).map_err(|e| {
            SwaggerToolsError::Reference(format!(
                "Failed to parse referenced document {}: {e}",
                doc.display(),
            ))
        })?;

        let parsed = Arc::new(parsed);
        self.docs.write().insert(doc.clone(), Arc::clone(&parsed));
        Ok(parsed)
    }
}
