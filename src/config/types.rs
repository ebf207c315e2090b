use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// SQLite index location
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub exiftool: ExiftoolConfig,

    #[serde(default)]
    pub photoprism: PhotoprismConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            verbose: false,
            exiftool: ExiftoolConfig::default(),
            photoprism: PhotoprismConfig::default(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("picturedb.sqlite")
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExiftoolConfig {
    /// Explicit exiftool executable; looked up on PATH when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhotoprismConfig {
    /// Base URL of the PhotoPrism server, e.g. `https://photos.example.com`
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub pass: Option<String>,

    /// Remove album members the grouping query no longer selects
    #[serde(default)]
    pub delete_extras: bool,

    /// Maximum number of members fetched per album (default: 1000)
    #[serde(default = "default_member_limit")]
    pub member_limit: usize,

    /// Maximum number of albums listed per run (default: 10000)
    #[serde(default = "default_album_limit")]
    pub album_limit: usize,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PhotoprismConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            pass: None,
            delete_extras: false,
            member_limit: default_member_limit(),
            album_limit: default_album_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_member_limit() -> usize {
    1000
}

fn default_album_limit() -> usize {
    10000
}

fn default_timeout_secs() -> u64 {
    30
}
