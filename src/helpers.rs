use chrono::{DateTime, SecondsFormat, Utc};

/// True when `full_version` belongs to the `major` release line, e.g. "7.1.7"
/// for major 7. A bare "7" or "70.1" does not match.
pub fn matches_major(full_version: &str, major: u32) -> bool {
    full_version
        .trim()
        .strip_prefix(&major.to_string())
        .is_some_and(|rest| rest.starts_with('.'))
}

/// The `name=value` pair of a `Set-Cookie` header, without its attributes.
pub fn session_cookie(set_cookie: &str) -> Option<String> {
    let pair = set_cookie.split(';').next()?.trim();
    match pair.split_once('=') {
        Some((name, _)) if !name.trim().is_empty() => Some(pair.to_string()),
        _ => None,
    }
}

pub fn report_banner(host: &str, at: DateTime<Utc>) -> String {
    format!(
        "Cluster report for {} generated {}",
        host,
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
