use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a Swagger-backed tool source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSourceConfig {
    /// Where the Swagger document is loaded from.
    pub spec: SpecSource,

    /// Prefix prepended to every generated tool name.
    #[serde(default)]
    pub tool_prefix: String,

    /// Override base URL from spec (`schemes`/`host`/`basePath`).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ApiSourceConfig {
    #[must_use]
    pub fn new(spec: SpecSource) -> Self {
        Self {
            spec,
            tool_prefix: String::new(),
            base_url: None,
        }
    }
}

/// Swagger document location. Exactly one source is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecSource {
    /// Fetched over HTTP(S).
    Url(String),
    /// Read from the local filesystem.
    File(PathBuf),
}

impl SpecSource {
    /// Location string used in logs and error messages.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            SpecSource::Url(url) => url.clone(),
            SpecSource::File(path) => path.display().to_string(),
        }
    }
}

impl fmt::Display for SpecSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Process-wide outbound HTTP client settings, fixed at construction time.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Skip TLS certificate validation for every outbound request.
    #[serde(default)]
    pub ignore_tls: bool,

    /// Static `Authorization` header value (e.g. `Bearer abc`).
    #[serde(default)]
    pub auth_header: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("ignore_tls", &self.ignore_tls)
            .field("auth_header", &self.auth_header.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_config_deserializes_camel_case() {
        let cfg: ApiSourceConfig = serde_json::from_value(json!({
            "spec": { "file": "./petstore.yaml" },
            "toolPrefix": "petstore_",
            "baseUrl": "https://api.example.com/v2"
        }))
        .expect("valid config");

        assert_eq!(cfg.spec, SpecSource::File(PathBuf::from("./petstore.yaml")));
        assert_eq!(cfg.tool_prefix, "petstore_");
        assert_eq!(cfg.base_url.as_deref(), Some("https://api.example.com/v2"));
    }

    #[test]
    fn client_config_debug_redacts_auth_header() {
        let cfg = ClientConfig {
            ignore_tls: true,
            auth_header: Some("Bearer secret-token".to_string()),
        };
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("<redacted>"));
    }
}
