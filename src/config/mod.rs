mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = ["./picturedb.toml", "~/.config/picturedb/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.db_path.as_os_str().is_empty() {
        anyhow::bail!("db_path cannot be empty");
    }

    if config.photoprism.member_limit == 0 {
        anyhow::bail!("photoprism.member_limit must be greater than 0");
    }

    if config.photoprism.album_limit == 0 {
        anyhow::bail!("photoprism.album_limit must be greater than 0");
    }

    Ok(())
}

/// Problems in `config` that do not stop picturedb from running.
///
/// Loading happens before logging is set up, so the caller logs these.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(ref path) = config.exiftool.path {
        if !path.exists() {
            warnings.push(format!("Configured exiftool does not exist: {:?}", path));
        }
    }

    warnings
}
