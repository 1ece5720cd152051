use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FirmwareStatusResponse {
    pub status: Option<String>,
}
