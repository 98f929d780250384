/// What a single report run found, for the closing log line and for tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    pub cluster_count: usize,
    pub selected_cluster: Option<String>,
    pub service_count: usize,
    pub distinguished: Option<String>,
    pub skipped: Option<SkipReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoClusters,
    IncompatibleVersion { version: String, required_major: u32 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoClusters => write!(f, "no clusters registered"),
            SkipReason::IncompatibleVersion {
                version,
                required_major,
            } => write!(
                f,
                "cluster version {:?} is not {}.x",
                version, required_major
            ),
        }
    }
}
