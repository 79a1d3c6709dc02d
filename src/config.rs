use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{ReflexError, Result};
use crate::session::SessionConfig;

/// Upper bound for every seconds-valued setting
pub const MAX_SECS: u64 = 3_600;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub max_attempts: usize,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
    pub miss_window_secs: u64,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            max_attempts: session.max_attempts,
            min_delay_secs: session.min_delay_secs,
            max_delay_secs: session.max_delay_secs,
            miss_window_secs: session.miss_window_secs,
            tick_rate_ms: 10,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ReflexError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.min_delay_secs == 0 {
            return Err(ReflexError::InvalidConfig(
                "min_delay_secs must be at least 1".into(),
            ));
        }
        if self.min_delay_secs > self.max_delay_secs {
            return Err(ReflexError::InvalidConfig(format!(
                "min_delay_secs ({}) exceeds max_delay_secs ({})",
                self.min_delay_secs, self.max_delay_secs
            )));
        }
        if self.miss_window_secs == 0 {
            return Err(ReflexError::InvalidConfig(
                "miss_window_secs must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("max_delay_secs", self.max_delay_secs),
            ("miss_window_secs", self.miss_window_secs),
        ] {
            if value > MAX_SECS {
                return Err(ReflexError::InvalidConfig(format!(
                    "{name} ({value}) exceeds {MAX_SECS}"
                )));
            }
        }
        if self.tick_rate_ms == 0 {
            return Err(ReflexError::InvalidConfig(
                "tick_rate_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            min_delay_secs: cfg.min_delay_secs,
            max_delay_secs: cfg.max_delay_secs,
            miss_window_secs: cfg.miss_window_secs,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "reflex") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("reflex_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing files give the defaults; unreadable ones are logged and also
    /// give the defaults.
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unparsable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            max_attempts: 10,
            min_delay_secs: 2,
            max_delay_secs: 4,
            miss_window_secs: 3,
            tick_rate_ms: 20,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "max_attempts": 3 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.max_attempts, 3);
        assert_eq!(cfg.max_delay_secs, 8);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        assert_eq!(
            SessionConfig::from(&Config::default()),
            SessionConfig::default()
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_attempts = Config {
            max_attempts: 0,
            ..Config::default()
        };
        assert_matches!(
            zero_attempts.validate(),
            Err(ReflexError::InvalidConfig(_))
        );

        let inverted = Config {
            min_delay_secs: 9,
            max_delay_secs: 2,
            ..Config::default()
        };
        assert_matches!(inverted.validate(), Err(ReflexError::InvalidConfig(msg)) if msg.contains("exceeds"));

        let no_window = Config {
            miss_window_secs: 0,
            ..Config::default()
        };
        assert!(no_window.validate().is_err());

        let huge_delay = Config {
            min_delay_secs: u64::MAX / 2,
            max_delay_secs: u64::MAX,
            ..Config::default()
        };
        assert_matches!(huge_delay.validate(), Err(ReflexError::InvalidConfig(msg)) if msg.contains("max_delay_secs"));

        let huge_window = Config {
            miss_window_secs: MAX_SECS + 1,
            ..Config::default()
        };
        assert_matches!(huge_window.validate(), Err(ReflexError::InvalidConfig(_)));

        let at_limit = Config {
            max_delay_secs: MAX_SECS,
            miss_window_secs: MAX_SECS,
            ..Config::default()
        };
        assert!(at_limit.validate().is_ok());
    }
}
