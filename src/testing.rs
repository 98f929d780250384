//! Local HTTPS stand-in for the cluster manager, for tests that need the real
//! TLS client rather than a plain-HTTP mock.

use rustls::ServerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

pub const CA_PEM: &str = include_str!("../testdata/ca.pem");
pub const OTHER_CA_PEM: &str = include_str!("../testdata/other-ca.pem");
// Leaf for IP 127.0.0.1 and DNS localhost, issued by CA_PEM.
const SERVER_PEM: &str = include_str!("../testdata/server.pem");
const SERVER_KEY: &str = include_str!("../testdata/server.key");

pub struct StubRoute {
    path: String,
    status: u16,
    set_cookie: bool,
    body: String,
}

impl StubRoute {
    pub fn json(path: &str, body: serde_json::Value) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            set_cookie: false,
            body: body.to_string(),
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_string(),
            status,
            set_cookie: false,
            body: String::new(),
        }
    }

    pub fn with_session_cookie(mut self) -> Self {
        self.set_cookie = true;
        self
    }

    fn response(&self) -> String {
        let cookie = if self.set_cookie {
            "Set-Cookie: SESSION=tls-stub; Path=/; Secure; HttpOnly\r\n"
        } else {
            ""
        };
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
            self.status,
            if self.status < 400 { "OK" } else { "Error" },
            self.body.len(),
            cookie,
            self.body
        )
    }
}

/// Serves each route on 127.0.0.1 behind the fixture leaf certificate, one
/// request per connection. Unknown paths get a 404.
pub struct TlsStub {
    pub port: u16,
}

impl TlsStub {
    pub async fn start(routes: Vec<StubRoute>) -> Self {
        let acceptor = acceptor();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(routes);

        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                let acceptor = acceptor.clone();
                let routes = routes.clone();
                tokio::spawn(async move {
                    // Handshake failures are the client rejecting us.
                    let Ok(mut tls) = acceptor.accept(tcp).await else {
                        return;
                    };
                    let Some(path) = read_request_path(&mut tls).await else {
                        return;
                    };
                    let response = routes
                        .iter()
                        .find(|r| r.path == path)
                        .map(StubRoute::response)
                        .unwrap_or_else(|| StubRoute::status(&path, 404).response());
                    let _ = tls.write_all(response.as_bytes()).await;
                    let _ = tls.shutdown().await;
                });
            }
        });

        Self { port }
    }
}

/// A config file pointing at a stub, trusting `ca_pem`. Removed on drop.
pub struct StubConfig {
    dir: PathBuf,
    pub path: PathBuf,
}

impl StubConfig {
    pub fn write(tag: &str, port: u16, ca_pem: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("cm-report-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let truststore = dir.join("ca.pem");
        std::fs::write(&truststore, ca_pem).unwrap();

        let path = dir.join("config.yaml");
        std::fs::write(
            &path,
            format!(
                "host: 127.0.0.1\nport: {}\nadmin_user: admin\nadmin_password: secret\ntruststore: {}\ntimeout_secs: 5\n",
                port,
                truststore.display()
            ),
        )
        .unwrap();

        Self { dir, path }
    }
}

impl Drop for StubConfig {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn acceptor() -> TlsAcceptor {
    let certs = rustls_pemfile::certs(&mut SERVER_PEM.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = rustls_pemfile::private_key(&mut SERVER_KEY.as_bytes())
        .unwrap()
        .unwrap();
    let config = ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(certs, key)
    .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Reads the request head and returns its path without the query string.
async fn read_request_path<S: AsyncRead + Unpin>(stream: &mut S) -> Option<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let target = head.lines().next()?.split_whitespace().nth(1)?;
    Some(target.split('?').next()?.to_string())
}
