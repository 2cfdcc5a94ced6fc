//! INI configuration file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::mosaic::FetchMode;
use crate::provider::{BING_URL_TEMPLATE, DEFAULT_TIMEOUT_SECS};

/// Errors that can occur while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value '{value}' for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// URL template with `{quadkey}` and `{key}` placeholders.
    pub url_template: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            url_template: BING_URL_TEMPLATE.to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    /// Overrides the platform cache directory.
    pub directory: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

impl CacheSettings {
    /// Configured directory, or the platform default.
    pub fn resolved_directory(&self) -> Option<PathBuf> {
        self.directory.clone().or_else(crate::cache::default_cache_dir)
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub path: Option<PathBuf>,
    pub set_wallpaper: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: None,
            set_wallpaper: true,
        }
    }
}

/// `[mosaic]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MosaicSettings {
    /// 0 or 1 fetches sequentially.
    pub parallel_workers: usize,
}

impl MosaicSettings {
    pub fn fetch_mode(&self) -> FetchMode {
        fetch_mode_for(self.parallel_workers)
    }
}

/// Maps a worker count to a fetch mode. Counts below 2 are sequential.
pub fn fetch_mode_for(workers: usize) -> FetchMode {
    if workers > 1 {
        FetchMode::Parallel { workers }
    } else {
        FetchMode::Sequential
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// When set, logs are also written to a file in this directory.
    pub directory: Option<PathBuf>,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub provider: ProviderSettings,
    pub cache: CacheSettings,
    pub output: OutputSettings,
    pub mosaic: MosaicSettings,
    pub logging: LoggingSettings,
}

/// `<platform config dir>/flighteyes/config.ini`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flighteyes").join("config.ini"))
}

impl ConfigFile {
    /// Loads the file at the default location, or defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads a specific file. Missing keys keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ini = Ini::load_from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config = Self::from_ini(&ini)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Writes the configuration, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |section: &str, key: &str| ini.get_from(Some(section), key);

        if let Some(v) = get("provider", "url_template") {
            config.provider.url_template = v.to_string();
        }
        if let Some(v) = get("provider", "api_key") {
            config.provider.api_key = v.to_string();
        }
        if let Some(v) = get("provider", "timeout_secs") {
            config.provider.timeout_secs = parse_value("provider", "timeout_secs", v)?;
        }

        if let Some(v) = get("cache", "enabled") {
            config.cache.enabled = parse_bool("cache", "enabled", v)?;
        }
        config.cache.directory = get("cache", "directory").and_then(non_empty_path);

        config.output.path = get("output", "path").and_then(non_empty_path);
        if let Some(v) = get("output", "set_wallpaper") {
            config.output.set_wallpaper = parse_bool("output", "set_wallpaper", v)?;
        }

        if let Some(v) = get("mosaic", "parallel_workers") {
            config.mosaic.parallel_workers = parse_value("mosaic", "parallel_workers", v)?;
        }

        config.logging.directory = get("logging", "directory").and_then(non_empty_path);

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let path_str = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let mut ini = Ini::new();
        ini.with_section(Some("provider"))
            .set("url_template", self.provider.url_template.as_str())
            .set("api_key", self.provider.api_key.as_str())
            .set("timeout_secs", self.provider.timeout_secs.to_string());
        ini.with_section(Some("cache"))
            .set("enabled", self.cache.enabled.to_string())
            .set("directory", path_str(&self.cache.directory));
        ini.with_section(Some("output"))
            .set("path", path_str(&self.output.path))
            .set("set_wallpaper", self.output.set_wallpaper.to_string());
        ini.with_section(Some("mosaic"))
            .set("parallel_workers", self.mosaic.parallel_workers.to_string());
        ini.with_section(Some("logging"))
            .set("directory", path_str(&self.logging.directory));
        ini
    }
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(section, key, value))
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.provider.url_template, BING_URL_TEMPLATE);
        assert_eq!(config.provider.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.cache.enabled);
        assert!(config.output.set_wallpaper);
        assert_eq!(config.mosaic.fetch_mode(), FetchMode::Sequential);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let (_dir, path) = write_config("[provider]\napi_key = abc123\n");
        let config = ConfigFile::load_from(&path).unwrap();

        assert_eq!(config.provider.api_key, "abc123");
        assert_eq!(config.provider.url_template, BING_URL_TEMPLATE);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_full_file() {
        let (_dir, path) = write_config(
            "[provider]\n\
             url_template = http://localhost/{quadkey}.jpg\n\
             timeout_secs = 5\n\
             [cache]\n\
             enabled = no\n\
             directory = /tmp/quads\n\
             [output]\n\
             path = /tmp/bg.png\n\
             set_wallpaper = false\n\
             [mosaic]\n\
             parallel_workers = 8\n\
             [logging]\n\
             directory = /tmp/logs\n\
             [unknown]\n\
             whatever = 1\n",
        );
        let config = ConfigFile::load_from(&path).unwrap();

        assert_eq!(config.provider.url_template, "http://localhost/{quadkey}.jpg");
        assert_eq!(config.provider.timeout_secs, 5);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.directory, Some(PathBuf::from("/tmp/quads")));
        assert_eq!(config.output.path, Some(PathBuf::from("/tmp/bg.png")));
        assert!(!config.output.set_wallpaper);
        assert_eq!(
            config.mosaic.fetch_mode(),
            FetchMode::Parallel { workers: 8 }
        );
        assert_eq!(config.logging.directory, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_invalid_number() {
        let (_dir, path) = write_config("[mosaic]\nparallel_workers = many\n");
        let err = ConfigFile::load_from(&path).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref section, ref key, .. }
                if section == "mosaic" && key == "parallel_workers"
        ));
    }

    #[test]
    fn test_invalid_bool() {
        let (_dir, path) = write_config("[cache]\nenabled = maybe\n");
        assert!(matches!(
            ConfigFile::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigFile::load_from(&dir.path().join("absent.ini"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.provider.api_key = "secret".to_string();
        config.cache.directory = Some(PathBuf::from("/var/cache/quads"));
        config.output.set_wallpaper = false;
        config.mosaic.parallel_workers = 4;

        config.save_to(&path).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_fetch_mode_for() {
        assert_eq!(fetch_mode_for(0), FetchMode::Sequential);
        assert_eq!(fetch_mode_for(1), FetchMode::Sequential);
        assert_eq!(fetch_mode_for(3), FetchMode::Parallel { workers: 3 });
    }
}
