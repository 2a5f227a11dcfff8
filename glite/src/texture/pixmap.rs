//! Decoded CPU-side images and the pixel format table used for uploads

use crate::device::{gl, GLenum};
use crate::error::{Error, Result};
use crate::glite_bail;

/// Channel layout of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Alpha,
    LuminanceAlpha,
    Rgb888,
    Rgba8888,
    Rgb565,
    Rgba4444,
}

impl PixelFormat {
    /// GL pixel format (also used as the unsized internal format)
    pub fn gl_format(self) -> GLenum {
        match self {
            PixelFormat::Alpha => gl::ALPHA,
            PixelFormat::LuminanceAlpha => gl::LUMINANCE_ALPHA,
            PixelFormat::Rgb888 | PixelFormat::Rgb565 => gl::RGB,
            PixelFormat::Rgba8888 | PixelFormat::Rgba4444 => gl::RGBA,
        }
    }

    /// GL component type
    pub fn gl_type(self) -> GLenum {
        match self {
            PixelFormat::Alpha
            | PixelFormat::LuminanceAlpha
            | PixelFormat::Rgb888
            | PixelFormat::Rgba8888 => gl::UNSIGNED_BYTE,
            PixelFormat::Rgb565 => gl::UNSIGNED_SHORT_5_6_5,
            PixelFormat::Rgba4444 => gl::UNSIGNED_SHORT_4_4_4_4,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Alpha => 1,
            PixelFormat::LuminanceAlpha | PixelFormat::Rgb565 | PixelFormat::Rgba4444 => 2,
            PixelFormat::Rgb888 => 3,
            PixelFormat::Rgba8888 => 4,
        }
    }
}

/// Decoded image: tightly packed rows, bottom row first as GL expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl Pixmap {
    /// Wrap decoded pixels; the buffer must hold exactly `width * height` pixels
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if pixels.len() != expected {
            glite_bail!(
                "glite::Pixmap",
                Error::OutOfRange,
                "{}x{} {:?} pixmap needs {} bytes, got {}",
                width,
                height,
                format,
                expected,
                pixels.len()
            );
        }
        Ok(Self { width, height, format, pixels })
    }

    /// Zero-filled pixmap
    pub fn blank(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self { width, height, format, pixels: vec![0; len] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
#[path = "pixmap_tests.rs"]
mod tests;
