pub mod commands;
mod services;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::models::{PendingSubmission, SheetRow, SubmissionOutcome};
use crate::store::SessionStore;

use services::{EmailClient, PhotoUploader, ReceiptParams, SheetClient};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a submission is already being processed")]
    InFlight,
    #[error("Photo upload failed: {0}")]
    Upload(String),
    #[error("Submission failed: {0}")]
    Append(String),
    #[error(transparent)]
    Persist(#[from] anyhow::Error),
}

/// Orchestrates one confirmed submission: optional photo upload, one batch
/// append, optional email receipt, then log clearing. Strictly ordered —
/// nothing is appended until the photo (if any) has landed, and local state
/// survives untouched through any upload or append failure so the user can
/// retry.
#[derive(Clone)]
pub struct SubmissionController {
    store: Arc<SessionStore>,
    photo: PhotoUploader,
    sheet: SheetClient,
    email: EmailClient,
    in_flight: Arc<Mutex<()>>,
}

impl SubmissionController {
    pub fn new(store: Arc<SessionStore>, client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            store,
            photo: PhotoUploader::from_config(client.clone(), config),
            sheet: SheetClient::new(client.clone(), config.sheet_append_url.clone()),
            email: EmailClient::new(client, config),
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub async fn submit(
        &self,
        pending: PendingSubmission,
    ) -> Result<SubmissionOutcome, SubmitError> {
        // No queueing and no cancellation: one submission runs to
        // completion or failure before another may start.
        let _guard = self.in_flight.try_lock().map_err(|_| SubmitError::InFlight)?;

        info!(
            "submitting {} entries for cage {}",
            pending.values.len(),
            pending.config.cage_id
        );

        let photo_file_id = match &pending.photo_path {
            Some(path) => self.photo.upload(path).await?,
            None => None,
        };

        // One timestamp for the whole batch, so its rows correlate later.
        let submitted_at = Utc::now();
        let rows = build_rows(&pending, submitted_at);
        self.sheet.append(&rows).await?;

        let receipt_sent = match pending.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => {
                match self.email.send_receipt(&build_receipt(&pending, email)).await {
                    Ok(()) => true,
                    Err(err) => {
                        // Receipt failure never rolls back a landed batch.
                        warn!("email receipt failed: {err:#}");
                        false
                    }
                }
            }
            _ => false,
        };

        self.store.clear_log()?;

        info!("submission complete ({} rows)", rows.len());
        Ok(SubmissionOutcome {
            rows_submitted: rows.len(),
            photo_file_id,
            receipt_sent,
        })
    }
}

fn build_rows(pending: &PendingSubmission, submitted_at: DateTime<Utc>) -> Vec<SheetRow> {
    let date = submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let cage_id = parse_cage_id(&pending.config.cage_id);
    pending
        .values
        .iter()
        .map(|&value| SheetRow {
            cage_id,
            month: pending.config.month.as_str().to_string(),
            data_type: pending.config.data_type.as_str().to_string(),
            value,
            comment: pending.comment.clone(),
            date: date.clone(),
        })
        .collect()
}

fn build_receipt(pending: &PendingSubmission, email: &str) -> ReceiptParams {
    let data = pending
        .values
        .iter()
        .map(|&value| format_value(value))
        .collect::<Vec<_>>()
        .join(", ");

    ReceiptParams {
        email: email.to_string(),
        cage_id: pending.config.cage_id.clone(),
        month: pending.config.month.display_name().to_string(),
        data_type: pending.config.data_type.label().to_string(),
        data,
        comments: pending.comment.clone(),
    }
}

// The gate already validated this, but parsing is kept total anyway.
fn parse_cage_id(raw: &str) -> i64 {
    let raw = raw.trim();
    raw.parse::<i64>()
        .or_else(|_| raw.parse::<f64>().map(|value| value as i64))
        .unwrap_or(0)
}

/// Measurements read back as whole numbers when they are whole, matching
/// how the worker typed them.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataType, Month, SessionConfig};
    use std::time::Duration;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> AppConfig {
        AppConfig {
            sheet_append_url: format!("{base_url}/append"),
            drive_upload_url: format!("{base_url}/upload-photo"),
            email_api_url: format!("{base_url}/email/send"),
            ..AppConfig::default()
        }
    }

    fn seeded_store(dir: &std::path::Path, values: Vec<f64>) -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::new(dir.to_path_buf()).unwrap());
        store.replace_log(values).unwrap();
        store
    }

    fn pending(values: Vec<f64>) -> PendingSubmission {
        PendingSubmission {
            values,
            config: SessionConfig {
                cage_id: "4".into(),
                month: Month::Aug,
                data_type: DataType::Size,
            },
            comment: String::new(),
            email: None,
            photo_path: None,
        }
    }

    #[tokio::test]
    async fn batch_lands_with_shared_timestamp_and_clears_log() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/append"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), vec![12.0, 15.0, 9.0]);
        let controller = SubmissionController::new(
            store.clone(),
            reqwest::Client::new(),
            &test_config(&server.uri()),
        );

        let outcome = controller.submit(pending(vec![12.0, 15.0, 9.0])).await.unwrap();
        assert_eq!(outcome.rows_submitted, 3);
        assert!(!outcome.receipt_sent);
        assert_eq!(outcome.photo_file_id, None);
        assert!(store.log().is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = requests[0].body_json().unwrap();
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 3);

        let first_date = rows[0]["date"].as_str().unwrap();
        for (row, expected) in rows.iter().zip([12.0, 15.0, 9.0]) {
            assert_eq!(row["cage_id"], 4);
            assert_eq!(row["month"], "aug");
            assert_eq!(row["type"], "size");
            assert_eq!(row["value"], expected);
            assert_eq!(row["date"], first_date);
        }
    }

    #[tokio::test]
    async fn failed_photo_upload_aborts_before_append() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-photo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": false,
                "error": "Drive quota exceeded"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/append"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), vec![12.0, 15.0, 9.0]);
        let controller = SubmissionController::new(
            store.clone(),
            reqwest::Client::new(),
            &test_config(&server.uri()),
        );

        let photo = dir.path().join("cage.jpg");
        std::fs::write(&photo, b"not really a jpeg").unwrap();

        let mut request = pending(vec![12.0, 15.0, 9.0]);
        request.photo_path = Some(photo);

        let err = controller.submit(request).await.unwrap_err();
        assert!(matches!(err, SubmitError::Upload(_)));
        assert_eq!(err.to_string(), "Photo upload failed: Drive quota exceeded");

        // Local data survives for a retry.
        assert_eq!(store.log(), vec![12.0, 15.0, 9.0]);
    }

    #[tokio::test]
    async fn successful_upload_threads_file_id_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-photo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "fileId": "drive-abc123"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/append"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), vec![7.0]);
        let controller = SubmissionController::new(
            store,
            reqwest::Client::new(),
            &test_config(&server.uri()),
        );

        let photo = dir.path().join("cage.jpg");
        std::fs::write(&photo, b"bytes").unwrap();
        let mut request = pending(vec![7.0]);
        request.photo_path = Some(photo);

        let outcome = controller.submit(request).await.unwrap();
        assert_eq!(outcome.photo_file_id.as_deref(), Some("drive-abc123"));
    }

    #[tokio::test]
    async fn failed_append_preserves_log() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/append"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), vec![3.0, 4.0]);
        let controller = SubmissionController::new(
            store.clone(),
            reqwest::Client::new(),
            &test_config(&server.uri()),
        );

        let err = controller.submit(pending(vec![3.0, 4.0])).await.unwrap_err();
        assert!(matches!(err, SubmitError::Append(_)));
        assert_eq!(store.log(), vec![3.0, 4.0]);
    }

    #[tokio::test]
    async fn email_failure_is_swallowed_but_not_reported_as_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/append"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/email/send"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), vec![12.0]);
        let controller = SubmissionController::new(
            store.clone(),
            reqwest::Client::new(),
            &test_config(&server.uri()),
        );

        let mut request = pending(vec![12.0]);
        request.email = Some("worker@example.com".into());

        let outcome = controller.submit(request).await.unwrap();
        assert!(!outcome.receipt_sent);
        assert!(store.log().is_empty());
    }

    #[tokio::test]
    async fn receipt_sent_reported_when_email_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/append"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/email/send"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), vec![12.5, 9.0]);
        let controller = SubmissionController::new(
            store,
            reqwest::Client::new(),
            &test_config(&server.uri()),
        );

        let mut request = pending(vec![12.5, 9.0]);
        request.config.month = Month::Sep;
        request.config.data_type = DataType::Count;
        request.email = Some("worker@example.com".into());
        request.comment = "north pier".into();

        let outcome = controller.submit(request).await.unwrap();
        assert!(outcome.receipt_sent);

        let requests = server.received_requests().await.unwrap();
        let email = requests
            .iter()
            .find(|req| req.url.path() == "/email/send")
            .unwrap();
        let body: serde_json::Value = email.body_json().unwrap();
        assert_eq!(body["template_params"]["month"], "September");
        assert_eq!(body["template_params"]["type"], "Shell Spat Count");
        assert_eq!(body["template_params"]["data"], "12.5, 9");
        assert_eq!(body["template_params"]["comments"], "north pier");
    }

    #[tokio::test]
    async fn second_submission_rejected_while_first_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/append"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let store = seeded_store(dir.path(), vec![1.0]);
        let controller = SubmissionController::new(
            store,
            reqwest::Client::new(),
            &test_config(&server.uri()),
        );

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(pending(vec![1.0])).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(controller.is_in_flight());
        let err = controller.submit(pending(vec![1.0])).await.unwrap_err();
        assert!(matches!(err, SubmitError::InFlight));

        first.await.unwrap().unwrap();
        assert!(!controller.is_in_flight());
    }

    #[test]
    fn rows_are_built_in_log_order() {
        let at = Utc::now();
        let rows = build_rows(&pending(vec![12.0, 15.0, 9.0]), at);
        let values: Vec<f64> = rows.iter().map(|row| row.value).collect();
        assert_eq!(values, vec![12.0, 15.0, 9.0]);
        assert!(rows.iter().all(|row| row.date == rows[0].date));
    }
}
