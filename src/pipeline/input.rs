//! Source intake: read the uploaded byte stream and check it is a PDF.
//!
//! The magic-byte check (`%PDF`) runs here, before pdfium sees the bytes, so
//! callers get `NotAPdf` rather than an opaque parser failure for a
//! mislabelled upload.

use crate::error::TranslateError;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF";

/// The raw bytes of a source document plus a name for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBytes {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceBytes {
    /// Wrap bytes already in memory, validating the PDF header.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, TranslateError> {
        let name = name.into();
        check_magic(&name, &bytes)?;
        Ok(Self { name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read a whole source stream into memory.
pub async fn read_source<R>(mut reader: R, name: &str) -> Result<SourceBytes, TranslateError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|source| TranslateError::SourceRead {
            name: name.to_string(),
            source,
        })?;
    debug!("Read {} bytes from '{}'", bytes.len(), name);
    SourceBytes::new(name, bytes)
}

/// Read a local file, mapping the common I/O failures to specific errors.
pub async fn read_source_file(path: &Path) -> Result<SourceBytes, TranslateError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TranslateError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => TranslateError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => TranslateError::SourceRead {
            name: path.display().to_string(),
            source: e,
        },
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    SourceBytes::new(path.display().to_string(), bytes)
}

fn check_magic(name: &str, bytes: &[u8]) -> Result<(), TranslateError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(());
    }
    Err(TranslateError::NotAPdf {
        name: name.to_string(),
        magic: bytes.iter().take(PDF_MAGIC.len()).copied().collect(),
    })
}
