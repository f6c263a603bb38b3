//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser};
use shelter_adapter_fs::DEFAULT_SNAPSHOT_PATH;
use shelter_gcp_auth::CredentialConfig;
use shelter_pipeline::{DEFAULT_COLLECTION, EtlConfig};

/// Import winter shelter data from an ArcGIS feature service into Firestore
#[derive(Parser, Debug)]
#[command(name = "shelter-etl", author, version, about, long_about = None)]
pub struct Cli {
    /// Load records from the local snapshot instead of the feature service
    #[arg(long)]
    pub local: bool,

    /// Delete every document in the collection before writing
    #[arg(long)]
    pub clear: bool,

    /// ArcGIS feature service query URL
    #[arg(long, env = "ARCGIS_SHELTERS_URL")]
    pub source_url: Option<String>,

    /// Destination Firestore collection
    #[arg(long, env = "FIRESTORE_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Local snapshot, written every run and read on fallback
    #[arg(long, env = "SHELTER_SNAPSHOT_PATH", default_value = DEFAULT_SNAPSHOT_PATH)]
    pub snapshot: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Firestore credential sources, highest priority first.
#[derive(Args, Debug)]
#[command(next_help_heading = "Credentials")]
pub struct CredentialArgs {
    /// Service account JSON, inline
    #[arg(long, env = "FIREBASE_SERVICE_ACCOUNT_JSON", hide_env_values = true)]
    pub service_account_json: Option<String>,

    /// Path to a service account JSON file
    #[arg(long, env = "FIREBASE_SERVICE_ACCOUNT_PATH")]
    pub service_account_path: Option<PathBuf>,

    /// Firebase project id
    #[arg(long, env = "FIREBASE_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Service account email
    #[arg(long, env = "FIREBASE_CLIENT_EMAIL")]
    pub client_email: Option<String>,

    /// Service account private key (PEM, `\n` escapes allowed)
    #[arg(long, env = "FIREBASE_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Application Default Credentials file
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub application_credentials: Option<PathBuf>,

    /// Project for Application Default Credentials
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub google_cloud_project: Option<String>,

    #[arg(long, env = "GCLOUD_PROJECT", hide = true)]
    pub gcloud_project: Option<String>,
}

impl Cli {
    /// Pipeline options from the parsed arguments.
    pub fn etl_config(&self) -> EtlConfig {
        EtlConfig {
            source_url: self.source_url.clone(),
            force_local: self.local,
            clear: self.clear,
            collection: self.collection.clone(),
            snapshot_path: self.snapshot.clone(),
        }
    }
}

impl CredentialArgs {
    /// Credential sources for the resolver.
    pub fn credential_config(&self) -> CredentialConfig {
        CredentialConfig {
            service_account_json: self.service_account_json.clone(),
            service_account_path: self.service_account_path.clone(),
            project_id: self.project_id.clone(),
            client_email: self.client_email.clone(),
            private_key: self.private_key.clone(),
            application_credentials: self.application_credentials.clone(),
            ambient_project_id: self
                .google_cloud_project
                .clone()
                .or_else(|| self.gcloud_project.clone()),
            ..CredentialConfig::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "shelter-etl",
            "--local",
            "--clear",
            "--collection",
            "shelters",
            "--snapshot",
            "/tmp/snap.json",
            "--source-url",
            "https://services.arcgis.com/q",
            "-vv",
        ])
        .unwrap();

        let config = cli.etl_config();
        assert!(config.force_local);
        assert!(config.clear);
        assert_eq!(config.collection, "shelters");
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/snap.json"));
        assert_eq!(config.source_url.as_deref(), Some("https://services.arcgis.com/q"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_ambient_project_prefers_google_cloud_project() {
        let cli = Cli::try_parse_from([
            "shelter-etl",
            "--google-cloud-project",
            "primary",
            "--gcloud-project",
            "legacy",
        ])
        .unwrap();

        let config = cli.credentials.credential_config();
        assert_eq!(config.ambient_project_id.as_deref(), Some("primary"));
    }

    #[test]
    fn test_ambient_project_falls_back_to_gcloud_project() {
        let cli = Cli::try_parse_from(["shelter-etl", "--gcloud-project", "legacy"]).unwrap();

        let config = cli.credentials.credential_config();
        assert_eq!(config.ambient_project_id.as_deref(), Some("legacy"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
