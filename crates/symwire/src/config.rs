//! Configuration
//!
//! Settings come from `symwire.toml`. Every section and key is optional:
//!
//! ```toml
//! [output]
//! xml_declaration = true
//!
//! [engine]
//! name = "tree"
//! unicode_pretty = true
//! overrides = true
//!
//! [logging]
//! level = "warn"
//! format = "pretty"
//! file = "/tmp/symwire.log"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use symwire_core::{RenderOptions, RenderOverrides, TreeEngine};

use crate::error::{Result, StartupError};

pub const CONFIG_FILE_NAME: &str = "symwire.toml";

/// Root configuration from symwire.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymwireConfig {
    pub output: RenderOptions,
    pub engine: EngineSection,
    pub logging: LoggingSection,
}

/// [engine] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    /// Expression engine to encode symbolic values with
    pub name: String,
    /// Produce Unicode pretty renderings (otherwise the ASCII one is reused)
    pub unicode_pretty: bool,
    /// Install the stock function rendering overrides
    pub overrides: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        EngineSection {
            name: "tree".to_string(),
            unicode_pretty: true,
            overrides: true,
        }
    }
}

/// Output format of diagnostic events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// [logging] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
    pub format: LogFormat,
    /// Write events to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            level: "warn".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl SymwireConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StartupError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| StartupError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Find the config file to use: `explicit` if given, else `symwire.toml`
    /// in `cwd`, else the user config directory.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        let local = cwd.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("symwire").join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    /// Discover and load, falling back to defaults when no file exists.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        match Self::discover(explicit, &cwd) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        self.output
    }

    /// Build the configured expression engine.
    pub fn build_engine(&self) -> Result<TreeEngine> {
        if self.engine.name != "tree" {
            return Err(StartupError::Engine(format!(
                "unknown expression engine '{}'",
                self.engine.name
            )));
        }
        let overrides = if self.engine.overrides {
            RenderOverrides::with_defaults()
        } else {
            RenderOverrides::new()
        };
        Ok(TreeEngine::new()
            .with_overrides(overrides)
            .with_unicode(self.engine.unicode_pretty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symwire_core::ExpressionEngine;

    #[test]
    fn test_load_toml() -> anyhow::Result<()> {
        let toml_content = r#"
[output]
xml_declaration = false

[engine]
unicode_pretty = false

[logging]
level = "symwire_core=debug"
format = "json"
"#;
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file_path, toml_content)?;

        let config = SymwireConfig::load(&file_path)?;
        assert!(!config.output.xml_declaration);
        assert!(!config.engine.unicode_pretty);
        assert!(config.engine.overrides);
        assert_eq!(config.logging.level, "symwire_core=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.file, None);

        Ok(())
    }

    #[test]
    fn test_empty_file_is_default() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file_path, "")?;

        assert_eq!(SymwireConfig::load(&file_path)?, SymwireConfig::default());
        assert!(SymwireConfig::default().output.xml_declaration);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_config_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file_path, "[output]\nxml_declaration = \"sometimes\"\n")?;

        let err = SymwireConfig::load(&file_path).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&file_path, "[engine]\nunicode = true\n")?;

        assert!(SymwireConfig::load(&file_path).is_err());
        Ok(())
    }

    #[test]
    fn test_discover_prefers_explicit_then_local() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let explicit = dir.path().join("other.toml");
        assert_eq!(
            SymwireConfig::discover(Some(&explicit), dir.path()),
            Some(explicit.clone())
        );

        let local = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&local, "")?;
        assert_eq!(SymwireConfig::discover(None, dir.path()), Some(local));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = SymwireConfig::load(Path::new("/nonexistent/symwire.toml")).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn test_build_engine() -> anyhow::Result<()> {
        let mut config = SymwireConfig::default();
        config.engine.unicode_pretty = false;
        config.engine.overrides = false;
        let engine = config.build_engine()?;
        assert!(!engine.capabilities().unicode_pretty);
        assert!(engine.overrides().is_empty());

        config.engine.name = "mathematica".into();
        assert_eq!(config.build_engine().unwrap_err().kind(), "EngineError");
        Ok(())
    }
}
