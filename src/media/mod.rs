//! Frame decoding
//!
//! Clients send compressed images (JPEG, PNG, WebP, ...); this module turns
//! them into RGB buffers for the pose model.

pub mod decode;

pub use decode::{DecodeError, FrameDecoder, PixelBuffer};
