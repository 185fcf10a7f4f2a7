
use crate::backend::{ApiResponse, ReviewBackend, ReviewResponse};
use crate::nlp::SentimentAnalyzer;
use crate::store::ReviewTable;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    version: &'static str,
}

/// Routes: `POST /review` and `GET /health`
pub fn router<S, T>(backend: Arc<ReviewBackend<S, T>>) -> Router
where
    S: SentimentAnalyzer + 'static,
    T: ReviewTable + 'static,
{
    Router::new()
        .route("/review", post(review_handler::<S, T>))
        .route("/health", get(health_handler))
        .with_state(backend)
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<S, T>(
    backend: Arc<ReviewBackend<S, T>>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()>
where
    S: SentimentAnalyzer + 'static,
    T: ReviewTable + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    serve_listener(backend, listener, shutdown).await
}

pub async fn serve_listener<S, T>(
    backend: Arc<ReviewBackend<S, T>>,
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()>
where
    S: SentimentAnalyzer + 'static,
    T: ReviewTable + 'static,
{
    tracing::info!(addr = %listener.local_addr()?, "listening for reviews");
    axum::serve(listener, router(backend))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn review_handler<S, T>(
    State(backend): State<Arc<ReviewBackend<S, T>>>,
    body: String,
) -> Response
where
    S: SentimentAnalyzer + 'static,
    T: ReviewTable + 'static,
{
    match backend.handle(&body).await {
        Ok(response) => into_http(response),
        Err(e) => {
            tracing::error!(error = %e, "review request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ReviewResponse::fail())).into_response()
        }
    }
}

async fn health_handler() -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn into_http(response: ApiResponse) -> Response {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::OK);
    let content_type = response
        .content_type()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or(HeaderValue::from_static("application/json"));

    (status, [(header::CONTENT_TYPE, content_type)], response.body).into_response()
}
