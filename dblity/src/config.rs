//! Checker configuration (`dblity.toml`).
//!
//! Every key is optional; an empty file yields [`CheckerConfig::default`].
//!
//! ```toml
//! [annotations]
//! closed = ["Closed"]
//! bound = ["Bound"]
//! inherit = ["Inherit"]
//! no_inherit = ["NoInherit"]
//!
//! [report]
//! redundant_annotations = true
//! case_arm_narrowing = true
//! smart_cast = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file the CLI picks up from the working directory.
pub const CONFIG_FILE_NAME: &str = "dblity.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    pub annotations: AnnotationNames,
    pub report: ReportOptions,
}

/// Simple annotation names recognised for each marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotationNames {
    pub closed: Vec<String>,
    pub bound: Vec<String>,
    pub inherit: Vec<String>,
    pub no_inherit: Vec<String>,
}

impl Default for AnnotationNames {
    fn default() -> Self {
        Self {
            closed: vec!["Closed".to_string()],
            bound: vec!["Bound".to_string()],
            inherit: vec!["Inherit".to_string()],
            no_inherit: vec!["NoInherit".to_string()],
        }
    }
}

impl AnnotationNames {
    fn lists(&self) -> [(&'static str, &[String]); 4] {
        [
            ("closed", &self.closed),
            ("bound", &self.bound),
            ("inherit", &self.inherit),
            ("no_inherit", &self.no_inherit),
        ]
    }
}

/// Toggles for the optional diagnostic kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportOptions {
    /// Hint when an explicit annotation restates the level the value already has.
    pub redundant_annotations: bool,
    /// Warn when a case arm's variant annotation is stronger than the scrutinee.
    pub case_arm_narrowing: bool,
    /// Note values that fill a weaker position through an implicit cast.
    pub smart_cast: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            redundant_annotations: true,
            case_arm_narrowing: true,
            smart_cast: true,
        }
    }
}

impl CheckerConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<CheckerConfig, ConfigError> {
        let config: CheckerConfig = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<CheckerConfig, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|e| e.with_path(path))
    }

    /// Reject empty names and names mapped to more than one marker.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lists = self.annotations.lists();
        for (i, &(list, names)) in lists.iter().enumerate() {
            for name in names {
                if name.trim().is_empty() {
                    return Err(ConfigError::EmptyAnnotationName { list });
                }
                if let Some(&(other, _)) = lists[i + 1..]
                    .iter()
                    .find(|(_, others)| others.contains(name))
                {
                    return Err(ConfigError::AmbiguousAnnotation {
                        name: name.clone(),
                        first: list,
                        second: other,
                    });
                }
            }
        }
        Ok(())
    }
}
