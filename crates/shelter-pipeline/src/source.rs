//! Source selection.

use std::fmt;
use std::path::PathBuf;

use shelter_adapter_arcgis::{SourceUrl, classify_source_url};

use crate::config::EtlConfig;

/// Why the local snapshot is used instead of the feature service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalReason {
    /// `--local` was passed
    Forced,
    /// The source URL is missing, invalid or a placeholder
    Unusable(SourceUrl),
}

impl fmt::Display for LocalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalReason::Forced => write!(f, "local source requested"),
            LocalReason::Unusable(url) => write!(f, "{url}"),
        }
    }
}

/// Where a run reads its records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceChoice {
    /// Fetch features from this URL
    Remote(String),
    /// Load the local snapshot
    Local(LocalReason),
}

/// Chooses the record source for a run.
pub fn select_source(config: &EtlConfig) -> SourceChoice {
    if config.force_local {
        return SourceChoice::Local(LocalReason::Forced);
    }

    match classify_source_url(config.source_url.as_deref()) {
        SourceUrl::Usable(url) => SourceChoice::Remote(url.to_string()),
        other => SourceChoice::Local(LocalReason::Unusable(other)),
    }
}

/// Where a run's records actually came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    /// The ArcGIS feature service
    Remote(String),
    /// A local snapshot file
    LocalSnapshot(PathBuf),
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOrigin::Remote(url) => write!(f, "{url}"),
            RecordOrigin::LocalSnapshot(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCGIS_URL: &str =
        "https://services3.arcgis.com/abc/arcgis/rest/services/Winter_Shelters/FeatureServer/0/query?where=1%3D1&outFields=*&f=json";

    #[test]
    fn test_usable_url_is_remote() {
        let config = EtlConfig::default().with_source_url(ARCGIS_URL);
        assert!(matches!(
            select_source(&config),
            SourceChoice::Remote(url) if url.starts_with("https://services3.arcgis.com/")
        ));
    }

    #[test]
    fn test_force_local_wins() {
        let config = EtlConfig::default()
            .with_source_url(ARCGIS_URL)
            .with_force_local(true);
        assert_eq!(select_source(&config), SourceChoice::Local(LocalReason::Forced));
    }

    #[test]
    fn test_missing_url_is_local() {
        assert_eq!(
            select_source(&EtlConfig::default()),
            SourceChoice::Local(LocalReason::Unusable(SourceUrl::Missing))
        );
    }

    #[test]
    fn test_placeholder_url_is_local() {
        let config = EtlConfig::default().with_source_url("https://your-arcgis-server.com/query");
        assert!(matches!(
            select_source(&config),
            SourceChoice::Local(LocalReason::Unusable(SourceUrl::Placeholder(_)))
        ));
    }

    #[test]
    fn test_non_http_url_is_local() {
        let config = EtlConfig::default().with_source_url("ftp://data.example/shelters");
        assert!(matches!(
            select_source(&config),
            SourceChoice::Local(LocalReason::Unusable(SourceUrl::Invalid(_)))
        ));
    }
}
