use bytes::Bytes;
use image::{DynamicImage, ImageReader};
use snafu::ResultExt;
use std::{fs, io::Cursor, path::Path};

use crate::error::{DecodeSnafu, IoReadSnafu, LayoutViewError};

/// The source page as delivered by the upload collaborator: encoded bytes.
///
/// Decoding happens on demand, so a broken image does not stop the data views.
#[derive(Debug, Clone)]
pub struct DocumentImage {
    pub bytes: Bytes,
}

impl DocumentImage {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LayoutViewError> {
        let path = path.as_ref();
        let bytes = fs::read(path).context(IoReadSnafu {
            path: path.to_string_lossy(),
        })?;
        Ok(Self::new(bytes))
    }

    pub fn decode(&self) -> Result<DynamicImage, LayoutViewError> {
        image::load_from_memory(&self.bytes).context(DecodeSnafu)
    }

    /// Intrinsic `(width, height)`, read from the image header only.
    pub fn dimensions(&self) -> Result<(u32, u32), LayoutViewError> {
        ImageReader::new(Cursor::new(&self.bytes[..]))
            .with_guessed_format()
            .map_err(image::ImageError::IoError)
            .context(DecodeSnafu)?
            .into_dimensions()
            .context(DecodeSnafu)
    }
}
