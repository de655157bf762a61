//! Compressed frame decoding
//!
//! Turns the raw bytes of one client frame into an RGB pixel buffer. The image
//! format is sniffed from the leading bytes; nothing the client says about the
//! payload is trusted.

use std::io::Cursor;

use image::{ImageFormat, ImageReader, RgbImage};

/// Error type for frame decoding
///
/// Every way a frame can fail to decode collapses into this type. It is an
/// expected, per-frame condition and is reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Zero-length payload
    #[error("empty frame")]
    Empty,
    /// Leading bytes match no supported image encoding
    #[error("unrecognized image format")]
    UnknownFormat,
    /// Format was recognized but the data is truncated or corrupt
    #[error("could not decode {format:?} image: {reason}")]
    Malformed { format: ImageFormat, reason: String },
}

/// Decoded frame: width × height × 3-channel RGB
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    /// Wrap an already-decoded RGB image
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying image
    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }
}

/// Frame codec adapter
///
/// Stateless; cheap to copy into blocking tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder;

impl FrameDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one compressed frame
    pub fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let format = image::guess_format(bytes).map_err(|_| DecodeError::UnknownFormat)?;

        let mut reader = ImageReader::new(Cursor::new(bytes));
        reader.set_format(format);

        let decoded = reader.decode().map_err(|e| DecodeError::Malformed {
            format,
            reason: e.to_string(),
        })?;

        Ok(PixelBuffer::from_rgb(decoded.into_rgb8()))
    }
}
