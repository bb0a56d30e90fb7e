use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

const DEFAULT_DIR_NAME: &str = ".quote_core";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Returns the application data directory, defaulting to `~/.quote_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("QUOTE_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub company_name: String,
    pub quote_endpoint: String,
    pub application_endpoint: String,
    pub fallback_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            company_name: "Brightline Facility Services".into(),
            quote_endpoint: "http://localhost:8787/api/quote".into(),
            application_endpoint: "http://localhost:8787/api/apply".into(),
            fallback_phone: "(512) 555-0100".into(),
            http_timeout_secs: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 5] = [
        "company_name",
        "quote_endpoint",
        "application_endpoint",
        "fallback_phone",
        "http_timeout_secs",
    ];

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    /// Updates one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "company_name" | "fallback_phone" if value.is_empty() => {
                return Err(invalid("value cannot be empty"));
            }
            "quote_endpoint" | "application_endpoint"
                if !(value.starts_with("http://") || value.starts_with("https://")) =>
            {
                return Err(invalid("expected an http:// or https:// URL"));
            }
            _ => {}
        }
        match key {
            "company_name" => self.company_name = value.to_string(),
            "quote_endpoint" => self.quote_endpoint = value.to_string(),
            "application_endpoint" => self.application_endpoint = value.to_string(),
            "fallback_phone" => self.fallback_phone = value.to_string(),
            "http_timeout_secs" => {
                self.http_timeout_secs = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(
                        value
                            .parse::<u64>()
                            .ok()
                            .filter(|secs| *secs > 0)
                            .ok_or_else(|| invalid("expected a positive number of seconds"))?,
                    )
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Missing file means defaults.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().join("nested")).unwrap();
        let mut config = Config::default();
        config.set("fallback_phone", "(737) 555-0177").unwrap();
        config.set("http_timeout_secs", "15").unwrap();
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.fallback_phone, "(737) 555-0177");
        assert_eq!(loaded.http_timeout(), Some(Duration::from_secs(15)));
        assert!(!tmp_path(manager.path()).exists());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"quote_endpoint":"https://leads.example/quote"}"#).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.quote_endpoint, "https://leads.example/quote");
        assert_eq!(loaded.fallback_phone, Config::default().fallback_phone);
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("quote_endpoint", "ftp://nope"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("http_timeout_secs", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        config.set("http_timeout_secs", "none").unwrap();
        assert_eq!(config.http_timeout(), None);
    }
}
