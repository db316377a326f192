//! Clipboard copy and file download of generated content

use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::mode::Mode;

pub const DEFAULT_FILENAME_PREFIX: &str = "ai-content";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export yet - generate some content first")]
    NothingToExport,
    #[error("Failed to copy to clipboard: {0}")]
    Clipboard(String),
    #[error("Failed to save {}: {source}", path.display())]
    Download {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Destination for copied text
pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError>;
}

/// The system clipboard
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ExportError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ExportError::Clipboard(e.to_string()))?;

        clipboard
            .set_text(text)
            .map_err(|e| ExportError::Clipboard(e.to_string()))?;

        tracing::debug!("Copied {} bytes to the clipboard", text.len());
        Ok(())
    }
}

/// `<prefix>-<mode>-<ISO 8601 UTC without colons>.txt`,
/// e.g. `ai-content-blog-2024-01-15T103045.123Z.txt`
pub fn download_filename(prefix: &str, mode: Mode, at: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}.txt",
        prefix,
        mode.name(),
        at.format("%Y-%m-%dT%H%M%S%.3fZ")
    )
}

/// Write `content` verbatim into `dir`. Never overwrites an existing file.
pub fn download_as_file(
    dir: &Path,
    prefix: &str,
    mode: Mode,
    content: &str,
    at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(download_filename(prefix, mode, at));

    let write = || -> io::Result<()> {
        std::fs::create_dir_all(dir)?;
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        file.write_all(content.as_bytes())?;
        file.flush()
    };

    match write() {
        Ok(()) => {
            tracing::info!("Saved {} bytes to {}", content.len(), path.display());
            Ok(path)
        }
        Err(source) => Err(ExportError::Download { path, source }),
    }
}

/// Where downloads go when the config doesn't say
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
