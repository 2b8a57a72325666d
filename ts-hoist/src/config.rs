//! `ts-hoist.toml` configuration.
//!
//! Every section and field is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HoistError, Result};

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoistConfig {
    /// Which files are collected from `--paths`.
    #[serde(default)]
    pub files: FilesConfig,

    /// Rule behaviour.
    #[serde(default)]
    pub rule: RuleConfig,

    /// Fix application.
    #[serde(default)]
    pub fix: FixConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    /// File extensions (without the dot) that are analysed.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns or plain substrings of paths to skip.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: default_exclude(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["ts", "tsx", "mts", "cts"].iter().map(|s| s.to_string()).collect()
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string(), ".d.ts".to_string()]
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Append a numeric suffix when a derived name is already taken in the
    /// file (`ConfigType` → `ConfigType2`).
    #[serde(default = "default_true")]
    pub disambiguate_names: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            disambiguate_names: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixConfig {
    /// Upper bound on parse → lint → apply rounds per file.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
        }
    }
}

const fn default_max_passes() -> usize {
    10
}

impl HoistConfig {
    pub const FILE_NAME: &'static str = "ts-hoist.toml";

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(HoistError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|message| HoistError::ConfigParse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(toml_str: &str) -> std::result::Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| e.message().to_string())
    }

    /// An explicit `--config` path must exist; otherwise look for
    /// `ts-hoist.toml` in the working directory.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(HoistError::ConfigRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            }),
            Some(path) => Self::load(path),
            None => Self::load(&PathBuf::from(Self::FILE_NAME)),
        }
    }

    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.files.extensions.iter().any(|e| e == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = HoistConfig::parse("").unwrap();
        assert_eq!(config, HoistConfig::default());
        assert!(config.rule.disambiguate_names);
        assert_eq!(config.fix.max_passes, 10);
        assert!(config.files.extensions.contains(&"tsx".to_string()));
    }

    #[test]
    fn test_partial_sections() {
        let config = HoistConfig::parse(
            r#"
[rule]
disambiguate_names = false

[files]
exclude = ["generated"]
"#,
        )
        .unwrap();
        assert!(!config.rule.disambiguate_names);
        assert_eq!(config.files.exclude, vec!["generated".to_string()]);
        assert_eq!(config.files.extensions, default_extensions());
        assert_eq!(config.fix.max_passes, 10);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = HoistConfig::parse("[rule]\nmin_lines = 3\n").unwrap_err();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = HoistConfig::load(&dir.path().join(HoistConfig::FILE_NAME)).unwrap();
        assert_eq!(config, HoistConfig::default());
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            HoistConfig::discover(Some(&missing)),
            Err(HoistError::ConfigRead { .. })
        ));
    }

    #[test]
    fn test_accepts_extension() {
        let config = HoistConfig::default();
        assert!(config.accepts_extension(Path::new("src/app.ts")));
        assert!(config.accepts_extension(Path::new("src/App.tsx")));
        assert!(!config.accepts_extension(Path::new("src/app.js")));
        assert!(!config.accepts_extension(Path::new("Makefile")));
    }
}
