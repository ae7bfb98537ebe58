//! Photo upload checks and data-URI encoding.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Please select a valid image file")]
    NotAnImage { mime: String },
    #[error("File size must be less than {}MB", .max / MIB)]
    TooLarge { size: u64, max: u64 },
    #[error("Failed to read file: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// Reject anything that is not `image/*` or is larger than `max_bytes`
pub fn validate_image(mime: &str, size: u64, max_bytes: u64) -> Result<(), PhotoError> {
    if !mime.starts_with("image/") {
        return Err(PhotoError::NotAnImage {
            mime: mime.to_string(),
        });
    }
    if size > max_bytes {
        return Err(PhotoError::TooLarge {
            size,
            max: max_bytes,
        });
    }
    Ok(())
}

/// `data:<mime>;base64,<payload>`
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Validate and encode an image file. The MIME type is guessed from the file name.
pub fn load_photo(path: &Path, max_bytes: u64) -> Result<String, PhotoError> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let size = fs::metadata(path)?.len();
    validate_image(mime.essence_str(), size, max_bytes)?;

    let bytes = fs::read(path)?;
    Ok(encode_data_uri(mime.essence_str(), &bytes))
}

/// What the preview shows for an attached photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPreview {
    pub mime: String,
    pub size_bytes: usize,
}

impl PhotoPreview {
    /// Describe a data URI without decoding it. `None` for anything that is not base64 image data.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        if !mime.starts_with("image/") {
            return None;
        }
        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
        let size_bytes = (payload.len() / 4 * 3).saturating_sub(padding);
        Some(Self {
            mime: mime.to_string(),
            size_bytes,
        })
    }

    pub fn summary(&self) -> String {
        if self.size_bytes >= 1024 {
            format!("{} ({} KB)", self.mime, self.size_bytes.div_ceil(1024))
        } else {
            format!("{} ({} B)", self.mime, self.size_bytes)
        }
    }
}
