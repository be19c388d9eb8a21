use log::LevelFilter;
use serde::Deserialize;
use std::{
    env,
    fs::read_to_string,
    net::{IpAddr, Ipv4Addr},
    path::Path,
};

use crate::utils::types::Port;

/// The server version extracted from the Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable key to load the config from
const CONFIG_ENV_KEY: &str = "TL_CONFIG_JSON";

pub fn load_config() -> Option<Config> {
    // Attempt to load the config from the env
    if let Ok(env) = env::var(CONFIG_ENV_KEY) {
        let config: Config = match serde_json::from_str(&env) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("Failed to load env config (Using default): {:?}", err);
                return None;
            }
        };
        return Some(config);
    }

    // Attempt to load the config from disk
    let file = Path::new("config.json");
    if !file.exists() {
        return None;
    }

    let data = match read_to_string(file) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to load config file (Using defaults): {:?}", err);
            return None;
        }
    };

    let config: Config = match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("Failed to load config file (Using default): {:?}", err);
            return None;
        }
    };

    Some(config)
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: IpAddr,
    pub port: Port,
    pub logging: LevelFilter,
    pub admin: AdminConfig,
    pub gallery: GalleryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 80,
            logging: LevelFilter::Info,
            admin: Default::default(),
            gallery: Default::default(),
        }
    }
}

/// Credentials the admin login form is checked against. When either
/// value is unset every login attempt is rejected and the server is
/// effectively read only through guest sessions.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AdminConfig {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        match (&self.username, &self.password) {
            (Some(expected_username), Some(expected_password)) => {
                !expected_username.is_empty()
                    && expected_username == username
                    && expected_password == password
            }
            _ => false,
        }
    }
}

/// Configuration for the media gallery. Remote listing is used when a
/// blob token is present, otherwise the bundled files under `root` are
/// served instead.
#[derive(Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Read token for the remote blob store
    pub blob_token: Option<String>,
    /// Prefix the media files are stored under, e.g. "cfc-images/images"
    pub blob_prefix: String,
    /// Local directory of bundled media files grouped by year
    pub root: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            blob_token: None,
            blob_prefix: "images".to_string(),
            root: "images".to_string(),
        }
    }
}
