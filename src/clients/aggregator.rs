use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::helpers::matches_major;
use crate::models::cm::{ClusterSummary, ServiceSummary};
use crate::models::views::{ReportOutcome, SkipReason};
use crate::report::{self, ReportSink};

use super::ManagerClient;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub preferred_cluster: Option<String>,
    pub required_major: u32,
    pub target_service: String,
}

impl From<&Config> for ReportOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            preferred_cluster: cfg.preferred_cluster().map(str::to_string),
            required_major: cfg.required_major,
            target_service: cfg.target_service.clone(),
        }
    }
}

/// Runs the dependent query chain: session, clusters, services, the
/// distinguished service and its health checks.
pub struct Aggregator {
    client: ManagerClient,
    options: ReportOptions,
}

impl Aggregator {
    pub fn new(client: ManagerClient, options: ReportOptions) -> Self {
        Self { client, options }
    }

    pub async fn run(&mut self, sink: &mut dyn ReportSink) -> Result<ReportOutcome> {
        let session = self.client.establish_session().await?;
        info!("session established, cluster manager {}", session.server_version);

        let mut outcome = ReportOutcome::default();

        let clusters = self.client.list_clusters().await?;
        outcome.cluster_count = clusters.len();
        report::cluster_section(sink, &clusters);

        let Some(cluster) = select_cluster(&clusters, self.options.preferred_cluster.as_deref())
        else {
            info!("no clusters registered, nothing to report");
            outcome.skipped = Some(SkipReason::NoClusters);
            return Ok(outcome);
        };
        outcome.selected_cluster = Some(cluster.name.clone());

        if !matches_major(&cluster.full_version, self.options.required_major) {
            let reason = SkipReason::IncompatibleVersion {
                version: cluster.full_version.clone(),
                required_major: self.options.required_major,
            };
            info!("skipping services of {}: {}", cluster.name, reason);
            outcome.skipped = Some(reason);
            return Ok(outcome);
        }

        let services = self.client.list_services(&cluster.name).await?;
        outcome.service_count = services.len();
        report::service_section(sink, &cluster.name, &services);

        let target = self.options.target_service.as_str();
        let matches = services.iter().filter(|s| s.is_type(target)).count();
        if matches > 1 {
            warn!(
                "{} services of type {} on {}, reporting the last one",
                matches, target, cluster.name
            );
        }

        let distinguished = locate_service(&services, target);
        outcome.distinguished = distinguished.map(|s| s.identity().to_string());
        report::health_section(sink, &cluster.name, target, distinguished);

        Ok(outcome)
    }
}

/// The configured cluster when it is listed, otherwise the last one.
pub fn select_cluster<'a>(
    clusters: &'a [ClusterSummary],
    preferred: Option<&str>,
) -> Option<&'a ClusterSummary> {
    if let Some(name) = preferred {
        if let Some(found) = clusters.iter().find(|c| c.name == name) {
            return Some(found);
        }
        warn!("configured cluster {:?} is not registered", name);
    }

    let last = clusters.last()?;
    if clusters.len() > 1 {
        warn!(
            "{} clusters registered, reporting only on {}",
            clusters.len(),
            last.name
        );
    }
    Some(last)
}

/// Last service of `service_type` in listing order, compared ignoring case.
pub fn locate_service<'a>(
    services: &'a [ServiceSummary],
    service_type: &str,
) -> Option<&'a ServiceSummary> {
    services.iter().rev().find(|s| s.is_type(service_type))
}
