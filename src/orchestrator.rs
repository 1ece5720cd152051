use crate::app_config::AppConfig;
use crate::extensions::date_time_ext::ToIso8601;
use crate::steve::domain::{FirmwareArtifact, UpdateFirmwareRequest};
use crate::steve::{ManagementServer, SteveError};
use chrono::{DateTime, TimeDelta, Utc};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// How far in the future the charge box is told to retrieve the firmware.
const RETRIEVE_DELAY_MINUTES: i64 = 2;

#[derive(Debug, PartialEq)]
pub struct UpdateReport {
    pub firmware_url: String,
    pub retrieve_date: DateTime<Utc>,
    pub status: Option<String>,
}

/// Uploads the configured firmware, schedules the update and checks its status, in that order.
///
/// A failed upload or schedule stops the sequence. The status check is best-effort and never fails it.
#[instrument(skip_all, fields(charge_box_id = config.charger().id()))]
pub async fn run_update(server: &dyn ManagementServer, config: &AppConfig) -> Result<UpdateReport, UpdateError> {
    let charge_box_id = config.charger().id();
    info!("🚀 OTA update of '{}' via SteVe", charge_box_id);

    let firmware_url = upload(server, config.firmware().path()).await?;

    let request = UpdateFirmwareRequest {
        charge_box_id: charge_box_id.to_string(),
        location: firmware_url.clone(),
        retrieve_date: retrieve_date(Utc::now()),
        retries: config.update().retries(),
        retry_interval: config.update().retry_interval(),
    };
    schedule_update(server, &request).await?;

    let status = check_status(server, charge_box_id).await;

    info!("✅ Done! Monitor the charger's serial output for OTA progress.");
    Ok(UpdateReport {
        firmware_url,
        retrieve_date: request.retrieve_date,
        status,
    })
}

pub fn retrieve_date(now: DateTime<Utc>) -> DateTime<Utc> {
    now + TimeDelta::minutes(RETRIEVE_DELAY_MINUTES)
}

async fn upload(server: &dyn ManagementServer, path: &Path) -> Result<String, UpdateError> {
    let artifact = FirmwareArtifact::read(path).await.map_err(|source| {
        error!("❌ Unable to read {}: {}", path.display(), source);
        UpdateError::ReadFirmware {
            source,
            path: path.to_path_buf(),
        }
    })?;

    info!("[1/3] Uploading {} ({} bytes) to SteVe...", path.display(), artifact.size());
    match server.upload_firmware(&artifact).await {
        Ok(url) => {
            info!("✅ Uploaded: {}", url);
            Ok(url)
        }
        Err(e) => {
            error!(status = ?e.status(), "❌ Upload failed: {}", e);
            Err(UpdateError::Upload(e))
        }
    }
}

async fn schedule_update(server: &dyn ManagementServer, request: &UpdateFirmwareRequest) -> Result<(), UpdateError> {
    info!("[2/3] Sending UpdateFirmware to {}...", request.charge_box_id);
    match server.update_firmware(request).await {
        Ok(()) => {
            info!("✅ UpdateFirmware sent");
            info!("📅 Scheduled for: {}", request.retrieve_date.to_iso8601());
            Ok(())
        }
        Err(e) => {
            error!(status = ?e.status(), "❌ UpdateFirmware failed: {}", e);
            Err(UpdateError::Schedule(e))
        }
    }
}

async fn check_status(server: &dyn ManagementServer, charge_box_id: &str) -> Option<String> {
    info!("[3/3] Checking status...");
    match server.firmware_status(charge_box_id).await {
        Ok(status) => {
            info!("📊 Status: {}", status);
            Some(status)
        }
        Err(e) => {
            warn!("⚠️ Status check failed: {}", e);
            None
        }
    }
}

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("unable to read firmware '{}': {}", .path.display(), .source)]
    ReadFirmware { source: io::Error, path: PathBuf },
    #[error("upload failed: {0}")]
    Upload(#[source] SteveError),
    #[error("scheduling the update failed: {0}")]
    Schedule(#[source] SteveError),
}
