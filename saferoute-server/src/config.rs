use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use saferoute_core::{Region, RegionCatalog, RouterConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub graph_dir: PathBuf,
    /// JSON or CSV incident file. Routes ignore crime data when absent.
    pub incidents_path: Option<PathBuf>,
    pub request_timeout_seconds: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            graph_dir: PathBuf::from("graphs"),
            incidents_path: None,
            request_timeout_seconds: 30,
        }
    }
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub router: RouterConfig,
    /// Replaces the built-in district table when non-empty.
    pub regions: Vec<Region>,
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        Ok(toml::from_str(&text)?)
    }

    pub fn region_catalog(&self) -> RegionCatalog {
        if self.regions.is_empty() {
            RegionCatalog::bangladesh_districts()
        } else {
            RegionCatalog::new(self.regions.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saferoute_core::IncidentFailurePolicy;

    #[test]
    fn reads_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saferoute.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            bind = "127.0.0.1:9000"
            graph_dir = "/srv/graphs"
            incidents_path = "/srv/incidents.csv"

            [router]
            alpha = 500.0
            proximity_meters = 50.0
            incident_failure = "fail"
            incident_time_window = { before_seconds = 10800, after_seconds = 10800 }

            [[regions]]
            name = "Dhaka"
            min_lat = 23.5
            min_lng = 90.2
            max_lat = 24.0
            max_lng = 90.6
            "#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.server.bind, "127.0.0.1:9000");
        assert_eq!(settings.server.graph_dir, PathBuf::from("/srv/graphs"));
        assert_eq!(settings.server.request_timeout_seconds, 30);
        assert_eq!(settings.router.alpha, 500.0);
        assert_eq!(settings.router.beta, 1e-5);
        assert_eq!(settings.router.proximity_meters, 50.0);
        assert_eq!(settings.router.incident_failure, IncidentFailurePolicy::Fail);
        assert_eq!(
            settings.router.incident_time_window.map(|w| w.before_seconds),
            Some(10_800)
        );
        assert_eq!(settings.region_catalog().len(), 1);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.server.bind, "0.0.0.0:8080");
        assert!(settings.server.incidents_path.is_none());
        assert_eq!(settings.region_catalog().len(), 64);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::from_file(&dir.path().join("absent.toml")).is_err());
    }
}
