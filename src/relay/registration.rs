use crate::config::RelayConfig;
use crate::errors::RelayError;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use sha1::{Digest, Sha1};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// Accepts any server certificate. Only reachable when
/// `relay.disable_cert_checking` is set, which is a development-only
/// escape hatch mirroring the original agent's `DisableCertChecking` flag.
#[derive(Debug)]
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

fn tls_config(disable_cert_checking: bool) -> Arc<rustls::ClientConfig> {
    if disable_cert_checking {
        let config = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
            .with_no_client_auth();
        Arc::new(config)
    } else {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Arc::new(config)
    }
}

/// A connection we have dialed and fully own, ready to be handed straight
/// to an HTTP/2 server. Boxed so registration can return either a plain or
/// TLS-wrapped stream behind one type.
pub type HijackedStream = Box<dyn ReadWrite>;

pub trait ReadWrite: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> ReadWrite for T {}

#[derive(Debug, Serialize)]
struct RegistrationBody {
    version: &'static str,
    local_addr: String,
    relay_addr: String,
    arch: String,
}

fn hex_sha1(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

/// Dials the relay, performs the registration handshake over plain
/// HTTP/1.1 (a `PUT /fs` carrying the agent's own info), then reclaims the
/// raw, still-open connection for HTTP/2 serving — the Rust equivalent of
/// the original's `httputil.ClientConn.Hijack()`.
pub async fn connect_and_register(
    config: &RelayConfig,
    local_addr: &str,
) -> Result<HijackedStream, RelayError> {
    let addr = format!("{}:{}", config.host, config.port);
    let tcp = TcpStream::connect(&addr).await.map_err(RelayError::Connect)?;
    tcp.set_nodelay(true).ok();

    let server_name = ServerName::try_from(config.host.clone())
        .map_err(|_| RelayError::Tls("invalid relay hostname".to_string()))?;
    let connector = TlsConnector::from(tls_config(config.disable_cert_checking));
    let tls_stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(|e| RelayError::Tls(e.to_string()))?;

    let io = TokioIo::new(tls_stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| RelayError::Malformed(e.to_string()))?;

    // Drive the handshake-owned connection in the background only until we
    // get our response; we reclaim the IO afterward with `without_shutdown`.
    let conn_task = tokio::spawn(conn.without_shutdown());

    let body = RegistrationBody {
        version: env!("CARGO_PKG_VERSION"),
        local_addr: local_addr.to_string(),
        relay_addr: addr.clone(),
        arch: crate::relay::arch_string(),
    };
    let body_bytes =
        serde_json::to_vec(&body).map_err(|e| RelayError::Malformed(e.to_string()))?;

    let request = Request::builder()
        .method("PUT")
        .uri("/fs")
        .header("Api-Key", hex_sha1(&config.api_key))
        .header("Authorization", format!("Token {}", config.shared_secret))
        .header("Content-Type", "application/json")
        .body(Full::<Bytes>::from(body_bytes))
        .map_err(|e| RelayError::Malformed(e.to_string()))?;

    let response = sender
        .send_request(request)
        .await
        .map_err(|e| RelayError::Malformed(e.to_string()))?;

    if response.status() != StatusCode::OK {
        return Err(RelayError::RegistrationRejected(response.status().as_u16()));
    }
    drop(response);
    drop(sender);

    let parts = conn_task
        .await
        .map_err(|e| RelayError::Malformed(e.to_string()))?
        .map_err(|e| RelayError::Malformed(e.to_string()))?;

    Ok(Box::new(parts.io.into_inner()))
}
