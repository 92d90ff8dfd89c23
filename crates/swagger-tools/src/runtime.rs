//! Swagger tool source: load -> dereference -> catalog, then list/call at runtime.

use crate::catalog::Catalog;
use crate::config::{ApiSourceConfig, ClientConfig, SpecSource};
use crate::document::SwaggerDocument;
use crate::error::{Result, SwaggerToolsError};
use crate::proxy::InvocationProxy;
use crate::redact::sanitize_reqwest_error;
use crate::request::{document_base_url, parse_base_url};
use crate::resolver::{DocId, ReferenceResolver};
use reqwest::Client;
use rmcp::model::{CallToolResult, JsonObject, Tool};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Swagger tool source exposing each API operation as an MCP tool.
///
/// Everything is resolved at construction; afterwards the source is read-only and cheap to clone.
#[derive(Debug, Clone)]
pub struct SwaggerToolSource {
    catalog: Arc<Catalog>,
    /// Base URL for API calls
    base_url: Url,
    proxy: InvocationProxy,
    /// `info.title` of the loaded document
    spec_title: String,
    spec_version: String,
}

impl SwaggerToolSource {
    /// Load the document, build the catalog and the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded, parsed or dereferenced, if it has no
    /// `paths`, or if the catalog cannot be built.
    pub async fn build(config: ApiSourceConfig, client: &ClientConfig) -> Result<Self> {
        let proxy = InvocationProxy::new(client)?;
        let doc = load_document(&config.spec, proxy.client()).await?;
        Self::from_document(&config, &doc, proxy)
    }

    /// Build from an already loaded document.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the catalog cannot be built.
    pub fn from_document(
        config: &ApiSourceConfig,
        doc: &SwaggerDocument,
        proxy: InvocationProxy,
    ) -> Result<Self> {
        let base_url = match &config.base_url {
            Some(base_url) => resolve_base_url(base_url, &config.spec)?,
            None => document_base_url(doc)?,
        };
        let catalog = Catalog::build(doc, &config.tool_prefix)?;

        tracing::info!(
            title = %doc.info.title,
            version = %doc.info.version,
            base_url = %base_url,
            tools = catalog.len(),
            "Discovered {} tools from Swagger document",
            catalog.len()
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            base_url,
            proxy,
            spec_title: doc.info.title.clone(),
            spec_version: doc.info.version.clone(),
        })
    }

    /// List the MCP `Tool`s exposed by this source, in document order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.catalog.iter().map(|t| t.to_tool()).collect()
    }

    /// Execute a tool call.
    ///
    /// Outbound failures are reported inside the returned `CallToolResult` (`isError = true`).
    ///
    /// # Errors
    ///
    /// Returns [`SwaggerToolsError::UnknownTool`] if no tool has this name.
    pub async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> Result<CallToolResult> {
        let tool = self
            .catalog
            .get(name)
            .ok_or_else(|| SwaggerToolsError::UnknownTool(name.to_string()))?;
        let arguments = arguments.unwrap_or_default();

        tracing::debug!(tool = %name, method = %tool.method, path = %tool.path, "calling tool");
        Ok(self.proxy.invoke(tool, &arguments, &self.base_url).await)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn spec_title(&self) -> &str {
        &self.spec_title
    }

    #[must_use]
    pub fn spec_version(&self) -> &str {
        &self.spec_version
    }
}

/// Relative base URLs (e.g. `/api`) are resolved against the document URL when there is one.
fn resolve_base_url(base_url: &str, spec: &SpecSource) -> Result<Url> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        return parse_base_url(base_url);
    }

    if let SpecSource::Url(spec_url) = spec {
        let mut spec_url = Url::parse(spec_url).map_err(|e| {
            SwaggerToolsError::Config(format!("Invalid Swagger document URL '{spec_url}': {e}"))
        })?;
        spec_url.set_fragment(None);
        let resolved = spec_url.join(base_url).map_err(|e| {
            SwaggerToolsError::Config(format!("Invalid baseUrl '{base_url}': {e}"))
        })?;
        return parse_base_url(resolved.as_str());
    }

    Err(SwaggerToolsError::Config(format!(
        "Invalid baseUrl '{base_url}': must be an absolute http(s) URL",
    )))
}

/// Load a Swagger document from its source and dereference every `$ref`.
///
/// # Errors
///
/// Returns an error if the document cannot be fetched/read, is not valid JSON/YAML, has
/// unresolvable references, or is not a Swagger 2.0 document.
pub async fn load_document(source: &SpecSource, client: &Client) -> Result<SwaggerDocument> {
    let location = source.location();
    let content = match source {
        SpecSource::Url(url) => {
            tracing::info!("Fetching Swagger document from {}", url);
            let resp = client
                .get(url.as_str())
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| SwaggerToolsError::SpecFetch {
                    url: url.clone(),
                    message: sanitize_reqwest_error(&e),
                })?;
            resp.text().await.map_err(|e| SwaggerToolsError::SpecReadBody {
                url: url.clone(),
                message: sanitize_reqwest_error(&e),
            })?
        }
        SpecSource::File(path) => {
            tracing::info!("Loading Swagger document from {}", path.display());
            std::fs::read_to_string(path).map_err(|e| SwaggerToolsError::SpecReadFile {
                path: path.display().to_string(),
                source: e,
            })?
        }
    };

    // JSON is a valid subset of YAML, so serde_yaml alone is enough.
    let raw: Value = serde_yaml::from_str(&content).map_err(|e| SwaggerToolsError::SpecParse {
        location: location.clone(),
        message: e.to_string(),
    })?;

    let resolver = ReferenceResolver::new(DocId::from_source(source)?, raw, client);
    let dereferenced = resolver.dereference_root().await?;

    SwaggerDocument::from_value(dereferenced, &location)
}
