//! Web interface and JSON API.
//!
//! A single form page takes a lecture URL and answers with the rendered cheat
//! sheet plus a download link. The PDF is embedded in the page as a data URI,
//! so the server keeps no state between requests.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::CruxError;
use crate::pipeline::{CheatSheet, JobFailure, Pipeline, Stage};
use crate::render::{to_html, DOCUMENT_FILENAME, DOCUMENT_MIME_TYPE};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, Level};

/// Shared application state.
pub struct AppState {
    pipeline: Pipeline,
}

/// Run the web server.
///
/// Credentials and tools are checked before binding; the server refuses to
/// start without them.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let credentials = preflight::check(&settings)?;
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let pipeline = Pipeline::new(&settings, &credentials, prompts)?;

    let app = create_router(Arc::new(AppState { pipeline }));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("CruX Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Web form", "GET  /");
    Output::kv("Cheat sheet (form)", "POST /cheat-sheet");
    Output::kv("Cheat sheet (JSON)", "POST /api/cheat-sheet");
    Output::kv("Cheat sheet (PDF)", "POST /api/cheat-sheet/pdf");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router for a ready pipeline.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/cheat-sheet", post(cheat_sheet_page))
        .route("/api/cheat-sheet", post(cheat_sheet_json))
        .route("/api/cheat-sheet/pdf", post(cheat_sheet_pdf))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    async fn generate(&self, url: &str) -> Result<CheatSheet, RequestError> {
        let job = self.pipeline.submit(url).await.map_err(|e| match e {
            CruxError::MissingUrl => RequestError::MissingUrl,
            other => RequestError::Failed(JobFailure {
                stage: other.stage().unwrap_or(Stage::Fetch),
                message: other.to_string(),
            }),
        })?;
        job.outcome().map_err(RequestError::Failed)
    }
}

enum RequestError {
    MissingUrl,
    Failed(JobFailure),
}

impl RequestError {
    fn status(&self) -> StatusCode {
        match self {
            RequestError::MissingUrl => StatusCode::BAD_REQUEST,
            RequestError::Failed(failure) if failure.stage == Stage::Render => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RequestError::Failed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn stage(&self) -> Option<Stage> {
        match self {
            RequestError::MissingUrl => None,
            RequestError::Failed(failure) => Some(failure.stage),
        }
    }

    fn message(&self) -> String {
        match self {
            RequestError::MissingUrl => CruxError::MissingUrl.to_string(),
            RequestError::Failed(failure) => failure.message.clone(),
        }
    }
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct CheatSheetRequest {
    #[serde(default)]
    url: String,
}

#[derive(Serialize)]
struct CheatSheetResponse {
    summary: String,
    filename: &'static str,
    mime_type: &'static str,
    document_base64: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    error: String,
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                stage: self.stage(),
                error: self.message(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index() -> Html<String> {
    Html(page("", ""))
}

async fn cheat_sheet_page(
    State(state): State<Arc<AppState>>,
    Form(req): Form<CheatSheetRequest>,
) -> Response {
    match state.generate(&req.url).await {
        Ok(sheet) => {
            let body = format!(
                "<p><a class=\"download\" download=\"{name}\" href=\"{href}\">Download {name}</a></p>\n\
                 <article>{summary}</article>",
                name = DOCUMENT_FILENAME,
                href = data_uri(&sheet.document),
                summary = to_html(&sheet.summary),
            );
            Html(page(&req.url, &body)).into_response()
        }
        Err(RequestError::MissingUrl) => (
            StatusCode::BAD_REQUEST,
            Html(page("", "<p class=\"warning\">&#9888;&#65039; Paste a link first!</p>")),
        )
            .into_response(),
        Err(e) => {
            error!("Cheat sheet request failed: {}", e.message());
            let body = format!("<p class=\"error\">{}</p>", escape_html(&e.message()));
            (e.status(), Html(page(&req.url, &body))).into_response()
        }
    }
}

async fn cheat_sheet_json(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheatSheetRequest>,
) -> Result<Json<CheatSheetResponse>, RequestError> {
    let sheet = state.generate(&req.url).await?;
    Ok(Json(CheatSheetResponse {
        document_base64: general_purpose::STANDARD.encode(&sheet.document),
        filename: sheet.filename(),
        mime_type: sheet.mime_type(),
        summary: sheet.summary,
    }))
}

async fn cheat_sheet_pdf(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheatSheetRequest>,
) -> Result<Response, RequestError> {
    let sheet = state.generate(&req.url).await?;
    Ok((
        [
            (header::CONTENT_TYPE, DOCUMENT_MIME_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOCUMENT_FILENAME),
            ),
        ],
        sheet.document,
    )
        .into_response())
}

// === HTML ===

fn data_uri(document: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        DOCUMENT_MIME_TYPE,
        general_purpose::STANDARD.encode(document)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(url: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>CruX</title>
<style>
body {{ font-family: sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; }}
form {{ display: flex; gap: .5rem; }}
input[type=url] {{ flex: 1; padding: .5rem; }}
.warning {{ color: #8a6d00; }}
.error {{ color: #b00020; }}
.download {{ font-weight: bold; }}
</style>
</head>
<body>
<h1>CruX</h1>
<p>Turn a lecture video into a cheat sheet with a practice exam.</p>
<form method="post" action="/cheat-sheet">
<input type="url" name="url" placeholder="YouTube URL" value="{url}">
<button type="submit">Generate cheat sheet</button>
</form>
{body}
</body>
</html>
"#,
        url = escape_html(url),
        body = body,
    )
}
