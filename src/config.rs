use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub admin_user: String,
    #[serde(default)]
    pub admin_password: String,
    #[serde(default)]
    pub truststore: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_required_major")]
    pub required_major: u32,
    #[serde(default = "default_target_service")]
    pub target_service: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retries: u32,
}

fn default_port() -> u16 {
    7183
}

fn default_api_version() -> String {
    "v45".to_string()
}

fn default_required_major() -> u32 {
    7
}

fn default_target_service() -> String {
    "HDFS".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Configuration(format!("reading config {}: {}", path.display(), e))
        })?;
        let cfg = Self::from_yaml(&data)?;

        if !cfg.truststore.is_file() {
            return Err(ReportError::Configuration(format!(
                "truststore {} is not a readable file",
                cfg.truststore.display()
            )));
        }

        Ok(cfg)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(data)
            .map_err(|e| ReportError::Configuration(format!("parsing config: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("host", self.host.as_str()),
            ("admin_user", self.admin_user.as_str()),
            ("admin_password", self.admin_password.as_str()),
            ("api_version", self.api_version.as_str()),
            ("target_service", self.target_service.as_str()),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ReportError::Configuration(format!("{} must be set", key)));
            }
        }
        if self.truststore.as_os_str().is_empty() {
            return Err(ReportError::Configuration("truststore must be set".into()));
        }
        Ok(())
    }

    /// `https://{host}:{port}/api/{version}`
    pub fn base_url(&self) -> String {
        format!(
            "https://{}:{}/api/{}",
            self.host, self.port, self.api_version
        )
    }

    /// The cluster the report should focus on, if one was configured.
    pub fn preferred_cluster(&self) -> Option<&str> {
        self.cluster_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn trust_anchor_pem(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.truststore).map_err(|e| {
            ReportError::Configuration(format!(
                "reading truststore {}: {}",
                self.truststore.display(),
                e
            ))
        })
    }
}
