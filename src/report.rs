use crate::models::cm::{ClusterSummary, ServiceSummary};

/// Where report lines go. Blank lines separate sections.
pub trait ReportSink {
    fn line(&mut self, line: String);

    fn blank(&mut self) {
        self.line(String::new());
    }
}

pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn line(&mut self, line: String) {
        println!("{}", line);
    }
}

impl ReportSink for Vec<String> {
    fn line(&mut self, line: String) {
        self.push(line);
    }
}

pub fn cluster_section(sink: &mut dyn ReportSink, clusters: &[ClusterSummary]) {
    sink.line("List all known clusters".to_string());
    for cluster in clusters {
        sink.line(format!("{} - {}", cluster.name, cluster.full_version));
    }
    sink.blank();
}

pub fn service_section(sink: &mut dyn ReportSink, cluster: &str, services: &[ServiceSummary]) {
    sink.line(format!("Services on cluster {}:", cluster));
    for service in services {
        sink.line(format!("{} - {}", service.display_name, service.service_type));
    }
    sink.blank();
}

/// Status, URL and health checks of the distinguished service, or a labelled
/// empty finding when the cluster has none.
pub fn health_section(
    sink: &mut dyn ReportSink,
    cluster: &str,
    target: &str,
    service: Option<&ServiceSummary>,
) {
    let Some(svc) = service else {
        sink.line(format!("No {} service found on cluster {}", target, cluster));
        return;
    };

    sink.line("Service status:".to_string());
    sink.line(format!(
        "{} {} {}",
        svc.identity(),
        svc.service_state,
        svc.health_summary
    ));
    sink.blank();

    sink.line("Service URL:".to_string());
    sink.line(svc.service_url.clone());
    sink.blank();

    sink.line("Health check:".to_string());
    for check in &svc.health_checks {
        sink.line(format!("{} --- {}", check.name, check.summary));
    }
}
