use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{Config, ConfigError};

const CONFIG_DIR_NAME: &str = "envelope_budget";
const CONFIG_FILE_NAME: &str = "config.json";

/// Reads and writes the client [`Config`] as a single JSON file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base).map_err(ConfigError::io(&base))?;
        Ok(Self::new(base.join(CONFIG_FILE_NAME)))
    }

    /// Uses the platform configuration directory (e.g. `~/.config/envelope_budget`).
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Self::with_base_dir(base.join(CONFIG_DIR_NAME))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// A missing file is not an error: it yields [`Config::default`].
    pub fn load(&self) -> Result<Config, ConfigError> {
        let path = &self.config_path;
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(err) => return Err(ConfigError::io(path)(err)),
        };
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })
    }

    /// Writes next to the target first and renames over it, so readers never see a
    /// half-written file.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config).map_err(ConfigError::Encode)?;
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::io(parent))?;
        }
        let staging = staging_path(&self.config_path);
        write_synced(&staging, json.as_bytes()).map_err(ConfigError::io(&staging))?;
        fs::rename(&staging, &self.config_path).map_err(ConfigError::io(&self.config_path))?;
        debug!("saved config to {}", self.config_path.display());
        Ok(())
    }
}

/// `config.json` -> `config.json.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(CONFIG_FILE_NAME));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
