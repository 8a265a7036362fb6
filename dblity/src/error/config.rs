use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a `dblity.toml` configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("invalid config{}: {message}", origin(.path))]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    /// An annotation name list contains an empty entry.
    #[error("annotation name in [annotations.{list}] is empty")]
    EmptyAnnotationName { list: &'static str },

    /// The same annotation name is mapped to two different markers.
    #[error("annotation '{name}' is listed under both [annotations.{first}] and [annotations.{second}]")]
    AmbiguousAnnotation {
        name: String,
        first: &'static str,
        second: &'static str,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" '{}'", path.display()),
        None => String::new(),
    }
}

impl ConfigError {
    /// Attach the file the configuration text came from.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: Some(path.into()),
                message,
            },
            other => other,
        }
    }
}
