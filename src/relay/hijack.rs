use super::registration::HijackedStream;
use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;

/// Serves HTTP/2 requests over a connection we already own, until the
/// relay closes it. This is the direct analogue of
/// `http2.Server{}.ServeConn(hijackedConn, ...)` in the original agent: no
/// `TcpListener::accept` is involved, the connection was handed to us by
/// the registration handshake.
pub async fn serve_http2(stream: HijackedStream, router: Router) -> anyhow::Result<()> {
    let io = TokioIo::new(stream);
    let service = TowerToHyperService::new(router);

    auto::Builder::new(TokioExecutor::new())
        .serve_connection(io, service)
        .await
        .map_err(|e| anyhow::anyhow!("serving relay connection: {e}"))
}
