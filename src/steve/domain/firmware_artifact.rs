use crate::extensions::path_ext::FileName;
use std::io;
use std::path::Path;
use tokio::fs;

/// A firmware image read fully into memory, ready to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct FirmwareArtifact {
    file_name: String,
    bytes: Vec<u8>,
}

impl FirmwareArtifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        FirmwareArtifact {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path).await?;
        Ok(FirmwareArtifact::new(path.string_file_name(), bytes))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
