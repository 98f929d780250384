use serde::{Deserialize, Serialize};

// Typed views of the cluster manager's JSON. Only the fields the report reads
// are modelled; everything else in the payload is ignored.

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<String>,
}

// --- Clusters ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub full_version: String,
}

// --- Services ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub service_state: String,
    #[serde(default)]
    pub health_summary: String,
    #[serde(default)]
    pub service_url: String,
    #[serde(default)]
    pub health_checks: Vec<HealthCheck>,
}

impl ServiceSummary {
    /// API identifier, or the display name when the manager omitted it.
    pub fn identity(&self) -> &str {
        if self.name.is_empty() {
            &self.display_name
        } else {
            &self.name
        }
    }

    pub fn is_type(&self, service_type: &str) -> bool {
        self.service_type.eq_ignore_ascii_case(service_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: String,
}
