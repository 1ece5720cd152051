use crate::app_config::AppConfig;
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

pub fn new_client(config: &AppConfig) -> Result<Client, SteveClientError> {
    let steve = config.steve();

    let mut builder = Client::builder();
    if steve.accept_invalid_certs() {
        warn!("⚠️ TLS certificate validation is disabled for {}", steve.url());
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(timeout) = steve.timeout() {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

#[derive(Error, Debug)]
pub enum SteveClientError {
    #[error("request error: {0}")]
    RequestError(#[from] reqwest::Error),
}
