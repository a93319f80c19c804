use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Which upload relay a deployment talks to. Both speak the same contract;
/// only the storage behind them differs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhotoBackend {
    Drive,
    Firebase,
}

/// Remote endpoints and service identifiers, read once at startup from
/// `oysterlog.json` in the app data dir. Absent fields keep their defaults,
/// so a deployment only overrides what it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sheet_append_url: String,
    pub reference_sheet_id: String,
    pub photo_backend: PhotoBackend,
    pub drive_upload_url: String,
    pub firebase_upload_url: String,
    pub email_api_url: String,
    pub email_service_id: String,
    pub email_template_id: String,
    pub email_public_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_append_url: "https://sheetdb.io/api/v1/jnhhby8k1fo3b".into(),
            reference_sheet_id: "1tnNSICiEBqtWQFtvm3f97aSVcw2XRPcw9Zl4Im9Kdr0".into(),
            photo_backend: PhotoBackend::Drive,
            drive_upload_url: "http://localhost:3001/upload-photo".into(),
            firebase_upload_url: "http://localhost:3002/upload-photo".into(),
            email_api_url: "https://api.emailjs.com/api/v1.0/email/send".into(),
            email_service_id: "service_uclwzai".into(),
            email_template_id: "template_vbhx2kn".into(),
            email_public_key: "p3npZNZS0Qh-04faz".into(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("ignoring malformed config {}: {err}", path.display());
                Self::default()
            }),
            Err(err) => {
                warn!("failed to read config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn reference_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:json",
            self.reference_sheet_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("oysterlog.json"));
        assert_eq!(config.photo_backend, PhotoBackend::Drive);
        assert!(config.sheet_append_url.starts_with("https://sheetdb.io/"));
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oysterlog.json");
        std::fs::write(
            &path,
            r#"{"photo_backend": "firebase", "firebase_upload_url": "https://fb.example/upload-photo"}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.photo_backend, PhotoBackend::Firebase);
        assert_eq!(config.firebase_upload_url, "https://fb.example/upload-photo");
        assert_eq!(config.email_service_id, "service_uclwzai");
    }
}
