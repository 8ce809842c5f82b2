use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::surface::{Snapshot, Surface, SurfaceError};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Errors that can occur while producing or consuming drawing documents
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize drawing document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("drawing field is not a PNG data URL")]
    MalformedDataUrl,

    #[error("failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("drawing image error: {0}")]
    Image(#[from] SurfaceError),
}

/// A persisted drawing: the flattened display surface as a PNG data URL plus
/// the capture time.
///
/// ```json
/// { "drawing": "data:image/png;base64,...", "timestamp": "2024-01-01T00:00:00Z" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedDrawing {
    pub drawing: String,
    pub timestamp: String,
}

impl SavedDrawing {
    /// Captures the given display surface into a document stamped with the
    /// current UTC time.
    pub fn capture<S: Surface>(display: &S) -> Result<Self, PersistenceError> {
        let snapshot = display.export_pixels()?;
        Ok(Self {
            drawing: format!("{DATA_URL_PREFIX}{}", STANDARD.encode(snapshot.png_bytes())),
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes the drawing payload into a pixel snapshot, validating the
    /// image before anything can be drawn over. A failure here leaves every
    /// surface untouched.
    pub fn decode_snapshot(&self) -> Result<Snapshot, PersistenceError> {
        let payload = self
            .drawing
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or(PersistenceError::MalformedDataUrl)?;
        let png = STANDARD.decode(payload)?;
        Ok(Snapshot::from_png_bytes(png)?)
    }
}

/// Encodes the flattened display surface as PNG bytes, ready for download.
pub fn export_png<S: Surface>(display: &S) -> Result<Vec<u8>, PersistenceError> {
    let snapshot = display.export_pixels()?;
    Ok(snapshot.png_bytes().to_vec())
}
