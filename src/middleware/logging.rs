use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode, Uri},
};
use std::time::{Duration, Instant};
use tower::{Layer, Service};

use super::request_id::RequestId;

/// Logs one line per finished request, at a level picked by status class.
#[derive(Clone)]
pub struct LoggingLayer;

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService { inner }
    }
}

#[derive(Clone)]
pub struct LoggingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for LoggingService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let start = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;
            log_completion(&request_id, &method, &uri, response.status(), start.elapsed());
            Ok(response)
        })
    }
}

fn log_completion(request_id: &str, method: &Method, uri: &Uri, status: StatusCode, elapsed: Duration) {
    let duration_ms = elapsed.as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(%request_id, %method, %uri, %status, duration_ms, "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(%request_id, %method, %uri, %status, duration_ms, "Request rejected");
    } else {
        tracing::info!(%request_id, %method, %uri, %status, duration_ms, "Request completed");
    }
}
