//! Error handling for solver settings and arm description files

use std::io;

/// Unified error to report invalid solver settings and failures while reading
/// arm descriptions.
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    InvalidLength { field: String, expected: usize, found: usize },
    InvalidValue { field: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ConfigError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ConfigError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ConfigError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            ConfigError::InvalidLength { ref field, expected, found } =>
                write!(f, "Invalid Length of {}: expected {}, found {}", field, expected, found),
            ConfigError::InvalidValue { ref field, ref value } =>
                write!(f, "Invalid Value of {}: {}", field, value),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            ConfigError::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}
