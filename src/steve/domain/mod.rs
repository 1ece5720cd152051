mod firmware_artifact;
mod update_firmware_request;
mod responses;

pub use firmware_artifact::FirmwareArtifact;
pub use responses::{FirmwareStatusResponse, UploadResponse};
pub use update_firmware_request::UpdateFirmwareRequest;
