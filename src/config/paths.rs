//! Platform-specific location of the configuration file.

use camino::Utf8PathBuf;

use super::ConfigError;

/// Directory name under the platform config root.
const APP_DIR_NAME: &str = "workcycle";

/// File name of the stored configuration.
const CONFIG_FILE_NAME: &str = "config.json";

/// Returns the path of the configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDirectory`] when the platform exposes no
/// config directory, or [`ConfigError::NonUtf8Path`] when the directory is
/// not valid UTF-8.
pub fn config_file_path() -> Result<Utf8PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
    let mut path = Utf8PathBuf::from_path_buf(base)
        .map_err(|raw| ConfigError::NonUtf8Path(raw.display().to_string()))?;
    path.push(APP_DIR_NAME);
    path.push(CONFIG_FILE_NAME);
    Ok(path)
}
