//! 24-bit uncompressed BMP loading for the globe texture.

use std::path::Path;

use image::{imageops, ImageFormat};
use thiserror::Error;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;

/// Largest width or height every GPU backend accepts for a 2D texture
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

/// Errors loading a texture
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to read texture: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a BMP file (bad magic)")]
    BadMagic,

    #[error("BMP header truncated ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("unsupported BMP info header size {0}")]
    UnsupportedHeader(u32),

    #[error("invalid BMP dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("BMP is {width}x{height}, larger than {max}x{max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("unsupported BMP bit depth {0} (expected 24)")]
    UnsupportedBitDepth(u16),

    #[error("unsupported BMP compression {0} (expected none)")]
    UnsupportedCompression(u32),

    #[error("BMP pixel data truncated: need {needed} bytes, have {available}")]
    TruncatedPixels { needed: usize, available: usize },

    #[error("failed to decode BMP pixels: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decoded RGB texture, rows ordered bottom to top
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes
    pub rgb: Vec<u8>,
}

impl Texture {
    /// Expand to RGBA (opaque) for GPU upload
    pub fn to_rgba(&self) -> Vec<u8> {
        self.rgb
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect()
    }
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Decode an in-memory 24-bit uncompressed BMP
pub fn decode_bmp(bytes: &[u8]) -> Result<Texture, TextureError> {
    if bytes.len() < 2 {
        return Err(TextureError::TruncatedHeader(bytes.len()));
    }
    if &bytes[..2] != b"BM" {
        return Err(TextureError::BadMagic);
    }
    if bytes.len() < FILE_HEADER_LEN + INFO_HEADER_LEN {
        return Err(TextureError::TruncatedHeader(bytes.len()));
    }

    let pixel_offset = u32_at(bytes, 10) as usize;
    let info_len = u32_at(bytes, 14);
    if (info_len as usize) < INFO_HEADER_LEN {
        return Err(TextureError::UnsupportedHeader(info_len));
    }

    let width = u32_at(bytes, 18) as i32;
    let height = u32_at(bytes, 22) as i32;
    let bit_count = u16_at(bytes, 28);
    let compression = u32_at(bytes, 30);

    if width <= 0 || height == 0 || height == i32::MIN {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    let (w, h) = (width.unsigned_abs(), height.unsigned_abs());
    if w > MAX_TEXTURE_DIMENSION || h > MAX_TEXTURE_DIMENSION {
        return Err(TextureError::TooLarge {
            width: w,
            height: h,
            max: MAX_TEXTURE_DIMENSION,
        });
    }
    if bit_count != 24 {
        return Err(TextureError::UnsupportedBitDepth(bit_count));
    }
    if compression != 0 {
        return Err(TextureError::UnsupportedCompression(compression));
    }

    // Rows are padded to four bytes
    let row_len = (width as usize * 3 + 3) & !3;
    let needed = pixel_offset.saturating_add(row_len * height.unsigned_abs() as usize);
    if bytes.len() < needed {
        return Err(TextureError::TruncatedPixels {
            needed,
            available: bytes.len(),
        });
    }

    let mut image = image::load_from_memory_with_format(bytes, ImageFormat::Bmp)?.to_rgb8();
    imageops::flip_vertical_in_place(&mut image);

    Ok(Texture {
        width: image.width(),
        height: image.height(),
        rgb: image.into_raw(),
    })
}

/// Read and decode a BMP file
pub fn load_bmp(path: impl AsRef<Path>) -> Result<Texture, TextureError> {
    let bytes = std::fs::read(path)?;
    decode_bmp(&bytes)
}
