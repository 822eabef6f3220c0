//! Error types for epub2cbz operations.

use thiserror::Error;

/// Errors that abort a conversion.
///
/// Everything the page pipeline can recover from (unresolved references,
/// unsupported media types, malformed content documents) is logged and
/// skipped instead of surfacing here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),
}

pub type Result<T> = std::result::Result<T, Error>;
