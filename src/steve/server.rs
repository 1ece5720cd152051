use crate::app_config::AppConfig;
use crate::steve::domain::{FirmwareArtifact, FirmwareStatusResponse, UpdateFirmwareRequest, UploadResponse};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

const UPLOAD_PATH: &str = "/steve/manager/firmware/upload";
const UPDATE_FIRMWARE_PATH: &str = "/steve/api/v1/updateFirmware";

/// The remote device-management service that relays firmware updates to charge boxes.
#[async_trait]
pub trait ManagementServer: Send + Sync {
    /// Uploads the firmware and returns the URL the charge box can retrieve it from.
    async fn upload_firmware(&self, artifact: &FirmwareArtifact) -> Result<String, SteveError>;

    /// Asks the server to schedule the update. Success means the request was accepted, not that the
    /// charge box received it.
    async fn update_firmware(&self, request: &UpdateFirmwareRequest) -> Result<(), SteveError>;

    async fn firmware_status(&self, charge_box_id: &str) -> Result<String, SteveError>;
}

#[derive(Debug)]
pub struct SteveServer {
    client: Client,
    config: Arc<AppConfig>,
}

impl SteveServer {
    pub fn new(client: Client, config: Arc<AppConfig>) -> Self {
        SteveServer { client, config }
    }

    fn authenticated(&self, builder: RequestBuilder) -> RequestBuilder {
        let steve = self.config.steve();
        builder.basic_auth(steve.username(), Some(steve.password()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.steve().url(), path)
    }

    // The charge box id is a single, percent-encoded path segment.
    fn firmware_status_url(&self, charge_box_id: &str) -> Result<Url, SteveError> {
        let base = self.config.steve().url();
        let mut url = Url::parse(base).map_err(|_| SteveError::InvalidUrl(base.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SteveError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(["steve", "api", "v1", "chargePoints", charge_box_id, "firmwareStatus"]);
        Ok(url)
    }
}

#[async_trait]
impl ManagementServer for SteveServer {
    #[instrument(skip_all, fields(file_name = artifact.file_name()))]
    async fn upload_firmware(&self, artifact: &FirmwareArtifact) -> Result<String, SteveError> {
        let part = Part::bytes(artifact.bytes().to_vec())
            .file_name(artifact.file_name().to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);

        let response = self
            .authenticated(self.client.post(self.endpoint(UPLOAD_PATH)))
            .multipart(form)
            .send()
            .await?;
        expect_ok(UPLOAD_PATH, response.status())?;

        let upload = response.json::<UploadResponse>().await?;
        debug!("Upload response: {:?}", upload);
        upload.url.ok_or(SteveError::MissingField {
            endpoint: UPLOAD_PATH.to_string(),
            field: "url",
        })
    }

    #[instrument(skip_all, fields(charge_box_id = %request.charge_box_id))]
    async fn update_firmware(&self, request: &UpdateFirmwareRequest) -> Result<(), SteveError> {
        let response = self
            .authenticated(self.client.post(self.endpoint(UPDATE_FIRMWARE_PATH)))
            .json(request)
            .send()
            .await?;

        expect_ok(UPDATE_FIRMWARE_PATH, response.status())
    }

    #[instrument(skip(self))]
    async fn firmware_status(&self, charge_box_id: &str) -> Result<String, SteveError> {
        let url = self.firmware_status_url(charge_box_id)?;
        let path = url.path().to_string();
        let response = self.authenticated(self.client.get(url)).send().await?;
        expect_ok(&path, response.status())?;

        let status = response.json::<FirmwareStatusResponse>().await?;
        status.status.ok_or(SteveError::MissingField {
            endpoint: path,
            field: "status",
        })
    }
}

fn expect_ok(endpoint: &str, status: StatusCode) -> Result<(), SteveError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(SteveError::Rejected {
            endpoint: endpoint.to_string(),
            status,
        })
    }
}

#[derive(Error, Debug)]
pub enum SteveError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{endpoint} responded with {status}")]
    Rejected { endpoint: String, status: StatusCode },
    #[error("{endpoint} responded without a '{field}'")]
    MissingField { endpoint: String, field: &'static str },
    #[error("invalid SteVe URL '{0}'")]
    InvalidUrl(String),
}

impl SteveError {
    /// The HTTP status the server rejected the request with, if it got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SteveError::Rejected { status, .. } => Some(*status),
            SteveError::Request(e) => e.status(),
            SteveError::MissingField { .. } | SteveError::InvalidUrl(_) => None,
        }
    }
}
