use anyhow::{anyhow, Context, Result};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::SubmitError;
use crate::config::{AppConfig, PhotoBackend};
use crate::models::SheetRow;

/// Wire response shared by both upload relays.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(rename = "fileId")]
    file_id: Option<String>,
    error: Option<String>,
}

/// One HTTP relay speaking the upload contract: multipart POST with a single
/// `photo` field, JSON `{success, fileId?, error?}` back.
#[derive(Clone)]
pub struct RelayUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayUploader {
    fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    async fn upload(&self, path: &Path) -> Result<Option<String>, SubmitError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| SubmitError::Upload(format!("could not read photo: {err}")))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());

        let form = Form::new().part("photo", Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| SubmitError::Upload(err.to_string()))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|err| SubmitError::Upload(err.to_string()))?;

        if !body.success {
            return Err(SubmitError::Upload(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(body.file_id)
    }
}

/// Photo upload capability. Both backends are thin relays behind the same
/// contract; configuration picks which one a deployment talks to.
#[derive(Clone)]
pub enum PhotoUploader {
    Drive(RelayUploader),
    Firebase(RelayUploader),
}

impl PhotoUploader {
    pub fn from_config(client: reqwest::Client, config: &AppConfig) -> Self {
        match config.photo_backend {
            PhotoBackend::Drive => {
                Self::Drive(RelayUploader::new(client, config.drive_upload_url.clone()))
            }
            PhotoBackend::Firebase => Self::Firebase(RelayUploader::new(
                client,
                config.firebase_upload_url.clone(),
            )),
        }
    }

    pub async fn upload(&self, path: &Path) -> Result<Option<String>, SubmitError> {
        match self {
            Self::Drive(relay) | Self::Firebase(relay) => relay.upload(path).await,
        }
    }
}

#[derive(Serialize)]
struct AppendRequest<'a> {
    data: &'a [SheetRow],
}

/// Client for the tabular append relay. One POST carries the whole batch.
#[derive(Clone)]
pub struct SheetClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SheetClient {
    pub fn new(client: reqwest::Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    pub async fn append(&self, rows: &[SheetRow]) -> Result<(), SubmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AppendRequest { data: rows })
            .send()
            .await
            .map_err(|err| SubmitError::Append(err.to_string()))?;

        response
            .error_for_status()
            .map_err(|err| SubmitError::Append(err.to_string()))?;
        Ok(())
    }
}

/// Receipt fields, named for the notification template they fill in.
#[derive(Debug, Serialize)]
pub struct ReceiptParams {
    pub email: String,
    pub cage_id: String,
    pub month: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub data: String,
    pub comments: String,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ReceiptParams,
}

/// Client for the email notification provider. Failures here never fail a
/// submission; the caller logs and moves on.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

impl EmailClient {
    pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            client,
            endpoint: config.email_api_url.clone(),
            service_id: config.email_service_id.clone(),
            template_id: config.email_template_id.clone(),
            public_key: config.email_public_key.clone(),
        }
    }

    pub async fn send_receipt(&self, params: &ReceiptParams) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmailRequest {
                service_id: &self.service_id,
                template_id: &self.template_id,
                user_id: &self.public_key,
                template_params: params,
            })
            .send()
            .await
            .context("email request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("email provider returned {}", response.status()));
        }
        Ok(())
    }
}
