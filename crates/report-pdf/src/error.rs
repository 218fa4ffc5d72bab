use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to encode page content: {0}")]
    ContentError(String),

    #[error("Failed to write PDF: {0}")]
    SerializationError(String),

    #[error("Failed to save report to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
