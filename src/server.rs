// http server mode - classify and run sql behind the guard

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::core::{QueryResult, Report};
use crate::{Db, Error, Guard};

struct AppState {
    db: Db,
    guard: Guard,
}

#[derive(Deserialize)]
struct ClassifyRequest {
    sql: String,
}

#[derive(Deserialize)]
struct QueryRequest {
    sql: String,
    #[serde(default)]
    dry_run: bool,
}

#[derive(Deserialize)]
struct TransactRequest {
    statements: Vec<String>,
}

#[derive(Serialize)]
struct QueryResponse {
    sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct TransactResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<QueryResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub struct Server;

impl Server {
    pub async fn run(db_url: &str, guard: Guard, host: &str, port: u16) -> Result<(), Error> {
        let db = Db::connect(db_url).await?;
        let mode = guard.mode();

        let state = Arc::new(AppState { db, guard });

        let app = Router::new()
            .route("/health", get(health))
            .route("/schema", get(get_schema))
            .route("/classify", post(classify))
            .route("/query", post(query))
            .route("/transact", post(transact))
            .layer(CorsLayer::permissive())
            .with_state(state);

        let addr = format!("{host}:{port}");
        info!(%addr, %mode, "server running");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }
}

// blocked and oversized input are the caller's fault, the rest is ours
pub(crate) fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Blocked(_) | Error::WritesDisabled => StatusCode::FORBIDDEN,
        Error::InputTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        Error::Database(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn get_schema(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    match state.db.schema().await {
        Ok(schema) => Ok(Json(serde_json::json!({ "schema": schema }))),
        Err(e) => Err((
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<Report>, (StatusCode, Json<ErrorResponse>)> {
    state.guard.inspect(&req.sql).map(Json).map_err(|e| {
        (
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}

async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> (StatusCode, Json<QueryResponse>) {
    // dry run: report what the guard thinks, run nothing
    if req.dry_run {
        return match state.guard.check(&req.sql) {
            Ok(report) => (
                StatusCode::OK,
                Json(QueryResponse {
                    sql: req.sql,
                    report: Some(report),
                    result: None,
                    error: None,
                }),
            ),
            Err(e) => (
                status_for(&e),
                Json(QueryResponse {
                    report: state.guard.inspect(&req.sql).ok(),
                    sql: req.sql,
                    result: None,
                    error: Some(e.to_string()),
                }),
            ),
        };
    }

    match state.db.run(&state.guard, &req.sql).await {
        Ok(result) => (
            StatusCode::OK,
            Json(QueryResponse {
                sql: req.sql,
                report: None,
                result: Some(result),
                error: None,
            }),
        ),
        Err(e) => (
            status_for(&e),
            Json(QueryResponse {
                report: e.is_rejection().then(|| state.guard.inspect(&req.sql).ok()).flatten(),
                sql: req.sql,
                result: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}

async fn transact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransactRequest>,
) -> (StatusCode, Json<TransactResponse>) {
    match state.db.transact(&state.guard, &req.statements).await {
        Ok(results) => (
            StatusCode::OK,
            Json(TransactResponse {
                results: Some(results),
                error: None,
            }),
        ),
        Err(e) => (
            status_for(&e),
            Json(TransactResponse {
                results: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}
