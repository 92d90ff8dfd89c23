use crate::logging::LogFormat;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use swagger_mcp_tools::config::{ApiSourceConfig, ClientConfig, SpecSource};

/// Expose a Swagger 2.0 described REST API as MCP tools over stdio.
#[derive(Debug, Parser)]
#[command(name = "swagger-mcp", version, about)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["swagger_url", "swagger_file"]),
))]
pub struct Cli {
    /// URL of the Swagger document
    #[arg(long, env = "SWAGGER_URL")]
    pub swagger_url: Option<String>,

    /// Path of a local Swagger document (JSON or YAML)
    #[arg(long, env = "SWAGGER_FILE")]
    pub swagger_file: Option<PathBuf>,

    /// Prefix for every generated tool name
    #[arg(long, env = "TOOL_PREFIX", default_value = "")]
    pub tool_prefix: String,

    /// Override the API base URL declared by the document
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Skip TLS certificate validation for outbound requests
    #[arg(long, env = "IGNORE_SSL", value_parser = clap::builder::BoolishValueParser::new())]
    pub ignore_ssl: bool,

    /// Full `Authorization` header value sent with every API call (e.g. `Bearer abc`)
    #[arg(long, env = "AUTH_HEADER", hide_env_values = true)]
    pub auth_header: Option<String>,

    /// Log filter (`error`, `warn`, `info`, `debug`, `trace`, or an env-filter directive)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// # Errors
    ///
    /// Returns an error if no document source is configured.
    pub fn source_config(&self) -> anyhow::Result<ApiSourceConfig> {
        let spec = match (&self.swagger_url, &self.swagger_file) {
            (Some(url), _) => SpecSource::Url(url.clone()),
            (None, Some(path)) => SpecSource::File(path.clone()),
            (None, None) => anyhow::bail!("either --swagger-url or --swagger-file is required"),
        };

        let mut cfg = ApiSourceConfig::new(spec);
        cfg.tool_prefix.clone_from(&self.tool_prefix);
        cfg.base_url.clone_from(&self.base_url);
        Ok(cfg)
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            ignore_tls: self.ignore_ssl,
            auth_header: self.auth_header.clone(),
        }
    }
}
