use anyhow::Context as _;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use serde_json::{Value, json};
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

/// Pick an unused TCP port on localhost.
///
/// Note: this does not reserve the port; it's still possible for another process to bind it
/// before you do.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails or if the bound socket's
/// local address cannot be read.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = StdTcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// Local HTTP upstream standing in for a REST API.
///
/// - `GET /swagger.json` serves the configured document (if any)
/// - `/status/{code}` answers with that status and `{"error": "status <code>"}`
/// - `/plain` answers with a `text/plain` body
/// - anything else echoes the request as JSON:
///   `{method, path, query, content_type, authorization, body}`
///
/// The server shuts down when the value is dropped.
pub struct EchoUpstream {
    base_url: Url,
    shutdown: Option<oneshot::Sender<()>>,
}

impl EchoUpstream {
    /// Start an echo upstream on an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> anyhow::Result<Self> {
        Self::spawn(None).await
    }

    /// Start an echo upstream that also serves `document` at `/swagger.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start_with_document(document: Value) -> anyhow::Result<Self> {
        Self::spawn(Some(document)).await
    }

    async fn spawn(document: Option<Value>) -> anyhow::Result<Self> {
        let app = Router::new()
            .route("/", any(handle))
            .route("/{*path}", any(handle))
            .with_state(Arc::new(document));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind echo upstream")?;
        let addr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}/")).context("echo upstream url")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            base_url,
            shutdown: Some(shutdown_tx),
        })
    }

    /// `http://127.0.0.1:<port>/`
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    #[must_use]
    pub fn document_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/swagger.json");
        url
    }
}

impl Drop for EchoUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(document): State<Arc<Option<Value>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path();

    if path == "/swagger.json"
        && let Some(doc) = &*document
    {
        return axum::Json(doc.clone()).into_response();
    }

    if path == "/plain" {
        return "plain text response".into_response();
    }

    if let Some(code) = path.strip_prefix("/status/") {
        let status = code
            .parse::<u16>()
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (
            status,
            axum::Json(json!({ "error": format!("status {}", status.as_u16()) })),
        )
            .into_response();
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    axum::Json(json!({
        "method": method.as_str(),
        "path": path,
        "query": uri.query().unwrap_or(""),
        "content_type": header("content-type"),
        "authorization": header("authorization"),
        "body": body,
    }))
    .into_response()
}
