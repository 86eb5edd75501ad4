//! HTTP Server for the campaign report API.
//!
//! # API Endpoints
//!
//! | Method | Path                 | Description                              |
//! |--------|----------------------|------------------------------------------|
//! | GET    | `/health`            | Health check                             |
//! | POST   | `/api/report`        | Upload the four CSVs, get the report     |
//! | POST   | `/api/report/export` | Upload the four CSVs, get the ROAS CSV   |
//! | GET    | `/api/logs`          | SSE stream for real-time logs            |
//!
//! Both POST endpoints take a multipart body with file fields `influencers`,
//! `posts`, `tracking`, `payouts` and optional repeated text fields
//! `platform`, `category`, `gender`.

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, ReportResponse};
use crate::config::MAX_UPLOAD_SIZE;
use crate::dataset::{CampaignInputs, Dataset};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::export::{roas_csv, ROAS_EXPORT_FILE};
use crate::filter::FilterRequest;
use crate::pipeline::{build_report, ReportOutcome};

type ApiError = (StatusCode, Json<Value>);

/// Build the application router.
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/report", post(report))
        .route("/api/report/export", post(export))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Influence server running on http://localhost:{}", port);
    println!("   POST /api/report        - Upload the four CSV files");
    println!("   POST /api/report/export - Download {}", ROAS_EXPORT_FILE);
    println!("   GET  /api/logs          - SSE log stream");
    println!("   GET  /health            - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "influence",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "report": "POST /api/report",
            "export": "POST /api/report/export",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Report endpoint
async fn report(multipart: Multipart) -> Result<Json<ReportResponse>, ApiError> {
    let outcome = run(multipart).await?;
    Ok(Json(ReportResponse::from(outcome)))
}

/// ROAS export endpoint
async fn export(multipart: Multipart) -> Result<Response, ApiError> {
    let outcome = run(multipart).await?;

    let report = match outcome {
        ReportOutcome::Ready(report) => report,
        waiting @ ReportOutcome::Waiting { .. } => {
            return Ok((StatusCode::CONFLICT, Json(ReportResponse::from(waiting))).into_response());
        }
    };

    let body = roas_csv(&report.roas)
        .map_err(|e| into_api_error(ServerError::Pipeline(PipelineError::Export(e))))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ROAS_EXPORT_FILE),
            ),
        ],
        body,
    )
        .into_response())
}

async fn run(multipart: Multipart) -> Result<ReportOutcome, ApiError> {
    let (inputs, request) = read_upload(multipart).await.map_err(into_api_error)?;
    build_report(&inputs, &request).map_err(|e| into_api_error(e.into()))
}

/// Collect the uploaded files and filter fields.
async fn read_upload(mut multipart: Multipart) -> ServerResult<(CampaignInputs, FilterRequest)> {
    let mut inputs = CampaignInputs::new();
    let mut request = FilterRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if let Ok(dataset) = name.parse::<Dataset>() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            log_info(format!("📄 Received {} ({} bytes)", dataset.file_name(), bytes.len()));
            // An empty file input counts as not uploaded
            if !bytes.is_empty() {
                inputs.set(dataset, bytes.to_vec());
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
        apply_filter_field(&mut request, &name, value)?;
    }

    Ok((inputs, request))
}

/// Add one `platform`/`category`/`gender` value to the request.
fn apply_filter_field(request: &mut FilterRequest, name: &str, value: String) -> ServerResult<()> {
    let target = match name {
        "platform" | "platforms" => &mut request.platforms,
        "category" | "categories" => &mut request.categories,
        "gender" | "genders" => &mut request.genders,
        other => return Err(ServerError::BadRequest(format!("Unknown field '{}'", other))),
    };
    target.get_or_insert_with(Vec::new).push(value.trim().to_string());
    Ok(())
}

fn status_for(error: &ServerError) -> StatusCode {
    match error {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(PipelineError::Load(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ServerError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn into_api_error(error: ServerError) -> ApiError {
    log_error(error.to_string());
    (status_for(&error), Json(error_response(&error.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "influence-test-boundary";

    const INFLUENCERS: &str = "influencer_id,name,platform,category,gender\n\
        1,Asha,Instagram,Beauty,Female\n\
        2,Ravi,YouTube,Tech,Male\n\
        3,Meera,TikTok,Food,Female\n";
    const POSTS: &str = "influencer_id,platform,reach,likes,comments\n1,Instagram,100,10,5\n";
    const TRACKING: &str = "influencer_id,revenue,orders\n1,1000,8\n2,300,2\n3,50,1\n";
    const PAYOUTS: &str = "influencer_id,basis,rate,orders,total_payout\n\
        1,per_order,62.5,8,500\n\
        2,per_post,200,1,200\n\
        3,flat_fee,100,1,100\n";

    enum Part<'a> {
        File(&'a str, &'a str),
        Text(&'a str, &'a str),
    }

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match part {
                Part::File(name, content) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{0}\"; filename=\"{0}.csv\"\r\n\
                         Content-Type: text/csv\r\n\r\n{1}\r\n",
                        name, content
                    ));
                }
                Part::Text(name, value) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    ));
                }
            }
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn all_files<'a>() -> Vec<Part<'a>> {
        vec![
            Part::File("influencers", INFLUENCERS),
            Part::File("posts", POSTS),
            Part::File("tracking", TRACKING),
            Part::File("payouts", PAYOUTS),
        ]
    }

    async fn send(request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, disposition, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_report_waits_for_missing_files() {
        let request = multipart_request(
            "/api/report",
            &[Part::File("influencers", INFLUENCERS), Part::File("posts", "")],
        );
        let (status, _, body) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "waiting");
        assert_eq!(json["missing"], json!(["posts", "tracking", "payouts"]));
        assert!(json.get("report").is_none());
    }

    #[tokio::test]
    async fn test_export_conflicts_while_waiting() {
        let request = multipart_request(
            "/api/report/export",
            &[Part::File("tracking", TRACKING)],
        );
        let (status, disposition, body) = send(request).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(disposition.is_none());
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "waiting");
    }

    #[tokio::test]
    async fn test_bad_file_is_unprocessable() {
        let mut parts = all_files();
        parts[1] = Part::File("posts", "influencer_id,platform,likes\n1,Instagram,3\n");
        let (status, _, body) = send(multipart_request("/api/report", &parts)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["error"].as_str().unwrap().contains("posts.csv"));
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let mut parts = all_files();
        parts.push(Part::Text("budget", "10"));
        let (status, _, _) = send(multipart_request("/api/report", &parts)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_with_repeated_filters() {
        let mut parts = all_files();
        parts.push(Part::Text("platform", "Instagram"));
        parts.push(Part::Text("platform", "TikTok"));
        let (status, _, body) = send(multipart_request("/api/report", &parts)).await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ready");
        let report = &json["report"];
        assert_eq!(report["selection"]["platforms"], json!(["Instagram", "TikTok"]));
        assert_eq!(report["influencerCount"], 2);
        assert_eq!(report["totals"]["totalRevenue"], 1050.0);
        assert_eq!(report["totals"]["totalPayout"], 600.0);
        assert_eq!(report["roas"][0]["name"], "Asha");
    }

    #[tokio::test]
    async fn test_export_downloads_roas_csv() {
        let (status, disposition, body) =
            send(multipart_request("/api/report/export", &all_files())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            disposition.as_deref(),
            Some("attachment; filename=\"roas_summary.csv\"")
        );
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some("name,platform,category,revenue,payout,roas"));
        assert_eq!(lines.next(), Some("Asha,Instagram,Beauty,1000.0,500.0,2.0"));
    }

    #[test]
    fn test_filter_fields_accumulate() {
        let mut request = FilterRequest::default();
        apply_filter_field(&mut request, "platform", "Instagram".into()).unwrap();
        apply_filter_field(&mut request, "platform", " YouTube ".into()).unwrap();
        apply_filter_field(&mut request, "genders", "Female".into()).unwrap();

        assert_eq!(
            request.platforms,
            Some(vec!["Instagram".to_string(), "YouTube".to_string()])
        );
        assert_eq!(request.genders, Some(vec!["Female".to_string()]));
        assert_eq!(request.categories, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut request = FilterRequest::default();
        let err = apply_filter_field(&mut request, "budget", "10".into()).unwrap_err();
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_load_errors_are_unprocessable() {
        let err = ServerError::Pipeline(PipelineError::Load(LoadError::MissingColumns {
            dataset: Dataset::Posts,
            missing: vec!["reach".into()],
        }));
        assert_eq!(status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
