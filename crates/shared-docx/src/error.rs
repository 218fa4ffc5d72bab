use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("Not a valid .docx package: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("Missing part in package: {0}")]
    MissingPart(String),

    #[error("Malformed XML in {part} at byte {position}: {message}")]
    Xml {
        part: String,
        position: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
