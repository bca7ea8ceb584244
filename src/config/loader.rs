//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading timesheet
//! configurations from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::Thresholds;

use super::types::{EngineConfig, OvertimeRules, ShowConfig, TimesheetConfig};

/// Loads and provides access to timesheet configuration.
///
/// # Directory Structure
///
/// ```text
/// config/standard/
/// ├── engine.yaml      # Rule set metadata, overtime rules, default thresholds
/// └── shows/           # Optional per-show threshold overrides
///     └── spring-tour.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use timesheet_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/standard").unwrap();
///
/// let thresholds = loader.resolve_thresholds(Some("spring-tour-2026")).unwrap();
/// println!("Daily threshold: {}", thresholds.ot_daily_threshold);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: TimesheetConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `engine.yaml` is missing, any file contains
    /// invalid YAML, or any value fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let engine = Self::load_yaml::<EngineConfig>(&engine_path)?;
        Self::validate_engine(&engine, &engine_path)?;

        let shows = Self::load_shows(&path.join("shows"))?;

        debug!(
            rule_set = %engine.name,
            shows = shows.len(),
            "Loaded timesheet configuration"
        );

        Ok(Self {
            config: TimesheetConfig::new(engine, shows),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_engine(engine: &EngineConfig, path: &Path) -> EngineResult<()> {
        let invalid = |message: String| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message,
        };

        engine
            .overtime
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        engine
            .default_thresholds
            .validate()
            .map_err(|e| invalid(e.to_string()))
    }

    /// Loads all show files from the shows directory, if it exists.
    fn load_shows(shows_dir: &Path) -> EngineResult<Vec<ShowConfig>> {
        if !shows_dir.exists() {
            return Ok(Vec::new());
        }

        let shows_dir_str = shows_dir.display().to_string();
        let entries = fs::read_dir(shows_dir).map_err(|_| EngineError::ConfigNotFound {
            path: shows_dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: shows_dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut seen = HashSet::new();
        let mut shows = Vec::with_capacity(paths.len());
        for path in paths {
            let show = Self::load_yaml::<ShowConfig>(&path)?;
            show.thresholds()
                .validate()
                .map_err(|e| EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            if !seen.insert(show.show_id.clone()) {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!("duplicate show id '{}'", show.show_id),
                });
            }
            shows.push(show);
        }

        Ok(shows)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &TimesheetConfig {
        &self.config
    }

    /// Returns the engine configuration.
    pub fn engine(&self) -> &EngineConfig {
        self.config.engine()
    }

    /// Returns the overtime rules.
    pub fn rules(&self) -> OvertimeRules {
        self.config.engine().overtime
    }

    /// Returns the thresholds used when no show override applies.
    pub fn default_thresholds(&self) -> Thresholds {
        self.config.engine().default_thresholds
    }

    /// Gets a show's configuration by id.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use timesheet_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/standard")?;
    /// let show = loader.get_show("spring-tour-2026")?;
    /// println!("Show: {}", show.name);
    /// # Ok::<(), timesheet_engine::error::EngineError>(())
    /// ```
    pub fn get_show(&self, show_id: &str) -> EngineResult<&ShowConfig> {
        self.config
            .shows()
            .get(show_id)
            .ok_or_else(|| EngineError::ShowNotFound {
                show_id: show_id.to_string(),
            })
    }

    /// Resolves the thresholds for a show, or the defaults when no show is given.
    pub fn resolve_thresholds(&self, show_id: Option<&str>) -> EngineResult<Thresholds> {
        match show_id {
            Some(show_id) => Ok(self.get_show(show_id)?.thresholds()),
            None => Ok(self.default_thresholds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/standard"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "timesheet-engine-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const MINIMAL_ENGINE: &str = r#"
name: Scratch
version: "2026-01-01"
default_thresholds:
  ot_daily_threshold: 8
  ot_weekly_threshold: 40
"#;

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.engine().name, "Standard Crew Timesheet Rules");
        assert_eq!(loader.rules(), OvertimeRules::default());
        assert_eq!(
            loader.default_thresholds(),
            Thresholds::new(dec("8"), dec("40"))
        );
    }

    #[test]
    fn test_get_show() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let show = loader.get_show("spring-tour-2026").unwrap();
        assert_eq!(show.name, "Spring Tour 2026");
        assert_eq!(show.thresholds(), Thresholds::new(dec("10"), dec("50")));
    }

    #[test]
    fn test_get_show_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_show("unknown") {
            Err(EngineError::ShowNotFound { show_id }) => assert_eq!(show_id, "unknown"),
            other => panic!("Expected ShowNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_thresholds_without_show_uses_defaults() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let thresholds = loader.resolve_thresholds(None).unwrap();
        assert_eq!(thresholds, Thresholds::new(dec("8"), dec("40")));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => assert!(path.contains("engine.yaml")),
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_shows_directory_is_allowed() {
        let dir = scratch_dir("no-shows");
        fs::write(dir.join("engine.yaml"), MINIMAL_ENGINE).unwrap();

        let loader = ConfigLoader::load(&dir).unwrap();
        assert!(loader.config().shows().is_empty());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_zero_divisor_is_rejected() {
        let dir = scratch_dir("zero-divisor");
        let yaml = format!("{}overtime:\n  zero_threshold_divisor: 0\n", MINIMAL_ENGINE);
        fs::write(dir.join("engine.yaml"), yaml).unwrap();

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("divisor"))
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_duplicate_show_ids_are_rejected() {
        let dir = scratch_dir("duplicate-shows");
        fs::write(dir.join("engine.yaml"), MINIMAL_ENGINE).unwrap();
        fs::create_dir_all(dir.join("shows")).unwrap();
        let show = "show_id: gala\nname: Gala\not_daily_threshold: 8\not_weekly_threshold: 40\n";
        fs::write(dir.join("shows").join("a.yaml"), show).unwrap();
        fs::write(dir.join("shows").join("b.yaml"), show).unwrap();

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("duplicate show id 'gala'"))
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = scratch_dir("bad-yaml");
        fs::write(dir.join("engine.yaml"), "name: [unclosed").unwrap();

        assert!(matches!(
            ConfigLoader::load(&dir),
            Err(EngineError::ConfigParseError { .. })
        ));

        fs::remove_dir_all(dir).ok();
    }
}
