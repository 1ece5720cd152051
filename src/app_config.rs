use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    steve: Steve,
    charger: Charger,
    firmware: Firmware,
    update: Update,
    host: Host,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(environment())
    }

    fn load_with(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn steve(&self) -> &Steve {
        &self.steve
    }

    pub fn charger(&self) -> &Charger {
        &self.charger
    }

    pub fn firmware(&self) -> &Firmware {
        &self.firmware
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn override_firmware_path(&mut self, path: Option<PathBuf>) {
        if let Some(path) = path {
            self.firmware.path = path;
        }
    }

    pub fn override_charger_id(&mut self, id: Option<String>) {
        if let Some(id) = id {
            self.charger.id = id;
        }
    }

    pub fn override_host(&mut self, directory: Option<PathBuf>, port: Option<u16>) {
        if let Some(directory) = directory {
            self.host.directory = directory;
        }
        if let Some(port) = port {
            self.host.port = port;
        }
    }
}

// Values stay strings here, typed fields are converted on deserialization.
fn environment() -> Environment {
    Environment::with_prefix("STEVE_OTA").prefix_separator("__").separator("__")
}

#[derive(Debug, Deserialize)]
pub struct Steve {
    url: String,
    username: String,
    password: String,
    #[serde(default)]
    accept_invalid_certs: bool,
    #[serde(default, with = "humantime_serde")]
    timeout: Option<Duration>,
}

impl Steve {
    /// Base URL of the SteVe server, without a trailing slash.
    pub fn url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn accept_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[derive(Debug, Deserialize)]
pub struct Charger {
    id: String,
}

impl Charger {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Deserialize)]
pub struct Firmware {
    path: PathBuf,
}

impl Firmware {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
pub struct Update {
    retries: u32,
    retry_interval: u32,
}

impl Update {
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Seconds between the device's download attempts.
    pub fn retry_interval(&self) -> u32 {
        self.retry_interval
    }
}

#[derive(Debug, Deserialize)]
pub struct Host {
    directory: PathBuf,
    port: u16,
}

impl Host {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                steve: Steve {
                    url: "https://steve.url".to_string(),
                    username: "admin".to_string(),
                    password: "admin".to_string(),
                    accept_invalid_certs: false,
                    timeout: None,
                },
                charger: Charger {
                    id: "RIVOT_100A_01".to_string(),
                },
                firmware: Firmware {
                    path: PathBuf::from("firmware.bin"),
                },
                update: Update {
                    retries: 3,
                    retry_interval: 60,
                },
                host: Host {
                    directory: PathBuf::from("."),
                    port: 8000,
                },
            },
        }
    }

    pub fn steve_url(mut self, url: String) -> Self {
        self.config.steve.url = url;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.steve.accept_invalid_certs = accept;
        self
    }

    pub fn firmware_path(mut self, path: PathBuf) -> Self {
        self.config.firmware.path = path;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.steve.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
