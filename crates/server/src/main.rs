use anyhow::Context as _;
use clap::Parser as _;
use swagger_mcp::cli::Cli;
use swagger_mcp::logging;
use swagger_mcp::mcp::McpServer;
use swagger_mcp_tools::runtime::SwaggerToolSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format)?;

    let source_config = cli.source_config()?;
    let location = source_config.spec.location();
    let source = SwaggerToolSource::build(source_config, &cli.client_config())
        .await
        .with_context(|| format!("failed to load Swagger document from {location}"))?;

    tracing::debug!("serving MCP over stdio");

    McpServer::new(source)
        .serve_stdio()
        .await
        .context("stdio transport failed")
}
