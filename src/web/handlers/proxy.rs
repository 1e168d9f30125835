use crate::catalog::apps::App;
use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

/// Mirrors `service.go::topVhostFilter`'s use of
/// `httputil.NewSingleHostReverseProxy`: forwards the request to the
/// app's local port, rewriting the `Host` header to match.
pub async fn forward(app: App, req: Request) -> Response {
    let addr = format!("127.0.0.1:{}", app.local_port);

    let tcp = match TcpStream::connect(&addr).await {
        Ok(tcp) => tcp,
        Err(err) => {
            tracing::warn!(vhost = %app.vhost, error = %err, "vhost backend unreachable");
            return axum::http::StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let io = TokioIo::new(tcp);
    let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!(vhost = %app.vhost, error = %err, "vhost handshake failed");
            return axum::http::StatusCode::BAD_GATEWAY.into_response();
        }
    };
    tokio::spawn(async move {
        if let Err(err) = conn.await {
            tracing::debug!(error = %err, "vhost proxy connection closed");
        }
    });

    let (mut parts, body) = req.into_parts();
    parts.headers.insert(
        axum::http::header::HOST,
        axum::http::HeaderValue::from_str(&addr).unwrap_or(axum::http::HeaderValue::from_static("localhost")),
    );
    let forwarded_req = hyper::Request::from_parts(parts, body);

    let response = match sender.send_request(forwarded_req).await {
        Ok(resp) => resp,
        Err(err) => {
            tracing::warn!(vhost = %app.vhost, error = %err, "vhost request failed");
            return axum::http::StatusCode::BAD_GATEWAY.into_response();
        }
    };

    let (parts, body) = response.into_parts();
    let body = Body::new(body.map_err(axum::Error::new));
    Response::from_parts(parts, body)
}
