pub mod aggregator;

use reqwest::header::{ACCEPT, COOKIE, HeaderValue, SET_COOKIE};
use reqwest::{Certificate, Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::helpers::session_cookie;
use crate::models::cm::{ApiList, ClusterSummary, ServiceSummary, VersionInfo};

pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Authenticated session with the cluster manager. Lives for one report run.
pub struct Session {
    cookie: HeaderValue,
    pub server_version: String,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first one; zero disables retrying.
    pub retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

pub struct ManagerClient {
    base_url: Url,
    http: Client,
    credentials: Credentials,
    retry: RetryPolicy,
    session: Option<Session>,
}

impl ManagerClient {
    /// Builds an HTTPS-only client whose sole trust anchors are the
    /// certificates in the configured PEM bundle.
    pub fn new(cfg: &Config) -> Result<Self> {
        let pem = cfg.trust_anchor_pem()?;
        let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
            ReportError::Configuration(format!(
                "parsing truststore {}: {}",
                cfg.truststore.display(),
                e
            ))
        })?;
        if certs.is_empty() {
            return Err(ReportError::Configuration(format!(
                "truststore {} contains no certificates",
                cfg.truststore.display()
            )));
        }

        let mut builder = Client::builder()
            .timeout(cfg.timeout())
            .https_only(true)
            .tls_built_in_root_certs(false);
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
        let http = builder
            .build()
            .map_err(|e| ReportError::Configuration(format!("building HTTP client: {}", e)))?;

        Self::from_parts(
            &cfg.base_url(),
            http,
            Credentials {
                user: cfg.admin_user.clone(),
                password: cfg.admin_password.clone(),
            },
            RetryPolicy::with_retries(cfg.retries),
        )
    }

    pub fn from_parts(
        base_url: &str,
        http: Client,
        credentials: Credentials,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ReportError::Configuration(format!("base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ReportError::Configuration(format!(
                "base URL {} cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            http,
            credentials,
            retry,
            session: None,
        })
    }

    /// Exchanges the credentials for a session cookie via the version
    /// endpoint. Never retried: a failure here ends the run.
    pub async fn establish_session(&mut self) -> Result<&Session> {
        let url = self.endpoint(&["cm", "version"], None)?;
        let path = url.path().to_string();
        debug!("GET {} (session bootstrap)", path);

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ReportError::Authentication(format!("GET {}: {}", path, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ReportError::Authentication(format!(
                "GET {} returned {}: {}",
                path,
                status,
                body.trim()
            )));
        }

        let cookie = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(session_cookie)
            .ok_or_else(|| {
                ReportError::Authentication(format!("GET {} issued no session cookie", path))
            })?;
        let cookie = HeaderValue::from_str(&cookie)
            .map_err(|e| ReportError::Authentication(format!("unusable session cookie: {}", e)))?;

        let body = resp
            .text()
            .await
            .map_err(|e| ReportError::Authentication(format!("GET {}: {}", path, e)))?;
        let info: VersionInfo = serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!("unexpected version payload from {}: {}", path, e);
            VersionInfo::default()
        });

        Ok(self.session.insert(Session {
            cookie,
            server_version: info.version,
        }))
    }

    pub async fn list_clusters(&self) -> Result<Vec<ClusterSummary>> {
        let list: ApiList<ClusterSummary> =
            self.get_json(&["clusters"], Some(("view", "SUMMARY"))).await?;
        Ok(list.items)
    }

    pub async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceSummary>> {
        let list: ApiList<ServiceSummary> = self
            .get_json(&["clusters", cluster, "services"], Some(("view", "FULL")))
            .await?;
        Ok(list.items)
    }

    fn endpoint(&self, segments: &[&str], query: Option<(&str, &str)>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ReportError::Configuration(format!("base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Option<(&str, &str)>,
    ) -> Result<T> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| ReportError::Authentication("no session established".into()))?;
        let url = self.endpoint(segments, query)?;

        let mut attempt = 0;
        let mut backoff = self.retry.initial_backoff;
        loop {
            match self.get_once(&url, session).await {
                Err(e) if e.is_retryable() && attempt < self.retry.retries => {
                    attempt += 1;
                    warn!(
                        "attempt {} of {} failed: {}, retrying after {:?}",
                        attempt,
                        self.retry.retries + 1,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.retry.max_backoff);
                }
                result => return result,
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &Url, session: &Session) -> Result<T> {
        let path = url.path().to_string();
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(COOKIE, session.cookie.clone())
            .send()
            .await
            .map_err(|source| ReportError::Transport {
                path: path.clone(),
                source,
            })?;

        if resp.status().as_u16() >= 400 {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ReportError::Api {
                path,
                status,
                body: body.trim().to_string(),
            });
        }

        let body = resp.text().await.map_err(|source| ReportError::Transport {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&body).map_err(|source| ReportError::Decode { path, source })
    }
}
