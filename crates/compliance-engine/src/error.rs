use thiserror::Error;

/// Errors raised while loading the rule book
#[derive(Error, Debug)]
pub enum RuleConfigError {
    #[error("Failed to read rule book {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule book {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Duplicate section key '{0}'")]
    DuplicateSection(String),
}

/// Errors a single check can raise; the dispatcher turns them into a failing result
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Invalid marker pattern '{pattern}': {source}")]
    InvalidMarker {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Check '{check}' requires parameter '{param}'")]
    MissingParameter { check: String, param: &'static str },

    #[error("Invalid value for '{param}': {reason}")]
    InvalidParameter { param: &'static str, reason: String },
}

impl CheckError {
    pub fn missing(check: &str, param: &'static str) -> Self {
        CheckError::MissingParameter {
            check: check.to_string(),
            param,
        }
    }
}
