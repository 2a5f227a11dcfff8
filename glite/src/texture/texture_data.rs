//! Texture data sources consumed by the upload path
//!
//! A [`TextureData`] is one of three sources:
//! - `Decoded`: a pixmap already in memory, shared with the caller
//! - `Deferred`: a file decoded on `prepare()` and handed out once by `consume_pixmap()`
//! - `GpuAllocated`: no CPU pixels, only the description of an empty allocation

use std::sync::Arc;

use crate::asset::{AssetLoader, FileLocation};
use crate::device::{GlContext, GLenum};
use crate::error::{Error, Result};
use crate::glite_bail;
use super::pixmap::Pixmap;

/// How a texture data source delivers its pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDataKind {
    /// Produces a pixmap for the shared upload path
    Pixmap,
    /// Issues its own allocation call
    Custom,
}

// ============================================================================
// Variant payloads
// ============================================================================

/// Pixmap already resident in memory
#[derive(Debug, Clone)]
pub struct DecodedData {
    pixmap: Option<Arc<Pixmap>>,
    width: u32,
    height: u32,
    format: GLenum,
    use_mipmaps: bool,
    dispose_pixmap: bool,
    managed: bool,
}

/// Image file decoded lazily through an asset loader
#[derive(Clone)]
pub struct DeferredData {
    path: String,
    location: FileLocation,
    loader: Arc<dyn AssetLoader>,
    pixmap: Option<Arc<Pixmap>>,
    prepared: bool,
    width: u32,
    height: u32,
    format: GLenum,
    use_mipmaps: bool,
}

/// Empty GPU allocation (render targets)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuAllocatedData {
    width: u32,
    height: u32,
    mip_level: i32,
    internal_format: i32,
    format: GLenum,
    data_type: GLenum,
    prepared: bool,
}

/// Source of pixel data for a texture upload
#[derive(Clone)]
pub enum TextureData {
    Decoded(DecodedData),
    Deferred(DeferredData),
    GpuAllocated(GpuAllocatedData),
}

impl TextureData {
    // ===== CONSTRUCTORS =====

    /// Wrap a decoded pixmap
    ///
    /// `dispose_pixmap` drops this source's reference once uploaded; a
    /// disposed source can no longer be reloaded. `managed` marks the
    /// pixmap as retained for context-loss reloads.
    pub fn from_pixmap(pixmap: Arc<Pixmap>, use_mipmaps: bool, dispose_pixmap: bool, managed: bool) -> Self {
        TextureData::Decoded(DecodedData {
            width: pixmap.width(),
            height: pixmap.height(),
            format: pixmap.format().gl_format(),
            pixmap: Some(pixmap),
            use_mipmaps,
            dispose_pixmap,
            managed,
        })
    }

    /// Image file decoded on `prepare()`
    pub fn from_file(
        loader: Arc<dyn AssetLoader>,
        path: impl Into<String>,
        location: FileLocation,
        use_mipmaps: bool,
    ) -> Self {
        TextureData::Deferred(DeferredData {
            path: path.into(),
            location,
            loader,
            pixmap: None,
            prepared: false,
            width: 0,
            height: 0,
            format: 0,
            use_mipmaps,
        })
    }

    /// Empty allocation of the given size and formats
    pub fn gpu_only(
        width: u32,
        height: u32,
        mip_level: i32,
        internal_format: i32,
        format: GLenum,
        data_type: GLenum,
    ) -> Self {
        TextureData::GpuAllocated(GpuAllocatedData {
            width,
            height,
            mip_level,
            internal_format,
            format,
            data_type,
            prepared: false,
        })
    }

    // ===== LIFECYCLE =====

    pub fn kind(&self) -> TextureDataKind {
        match self {
            TextureData::Decoded(_) | TextureData::Deferred(_) => TextureDataKind::Pixmap,
            TextureData::GpuAllocated(_) => TextureDataKind::Custom,
        }
    }

    pub fn is_prepared(&self) -> bool {
        match self {
            TextureData::Decoded(_) => true,
            TextureData::Deferred(data) => data.prepared,
            TextureData::GpuAllocated(data) => data.prepared,
        }
    }

    /// Make the data ready for consumption
    ///
    /// Fails on already prepared data. A deferred source whose file cannot be
    /// decoded fails with `Error::AssetNotFound` and stays unprepared.
    pub fn prepare(&mut self) -> Result<()> {
        match self {
            TextureData::Decoded(_) => {
                glite_bail!(
                    "glite::TextureData",
                    Error::InvalidState,
                    "prepare() must not be called on decoded data, it is always prepared"
                );
            }
            TextureData::Deferred(data) => {
                if data.prepared {
                    glite_bail!("glite::TextureData", Error::InvalidState, "Already prepared");
                }
                if data.pixmap.is_none() {
                    let Some(pixmap) = data.loader.load_image(&data.path, data.location) else {
                        glite_bail!(
                            "glite::TextureData",
                            Error::AssetNotFound,
                            "{} ({:?})",
                            data.path,
                            data.location
                        );
                    };
                    data.width = pixmap.width();
                    data.height = pixmap.height();
                    data.format = pixmap.format().gl_format();
                    data.pixmap = Some(Arc::new(pixmap));
                }
                data.prepared = true;
                Ok(())
            }
            TextureData::GpuAllocated(data) => {
                if data.prepared {
                    glite_bail!("glite::TextureData", Error::InvalidState, "Already prepared");
                }
                data.prepared = true;
                Ok(())
            }
        }
    }

    /// Hand out the pixmap for upload
    ///
    /// Deferred data gives up its pixmap and returns to the unprepared state.
    pub fn consume_pixmap(&mut self) -> Result<Arc<Pixmap>> {
        match self {
            TextureData::Decoded(data) => match &data.pixmap {
                Some(pixmap) => Ok(pixmap.clone()),
                None => glite_bail!(
                    "glite::TextureData",
                    Error::InvalidState,
                    "Pixmap was disposed after a previous upload"
                ),
            },
            TextureData::Deferred(data) => {
                if !data.prepared {
                    glite_bail!(
                        "glite::TextureData",
                        Error::InvalidState,
                        "Call prepare() before consuming the pixmap of {}",
                        data.path
                    );
                }
                data.prepared = false;
                match data.pixmap.take() {
                    Some(pixmap) => Ok(pixmap),
                    None => glite_bail!("glite::TextureData", Error::InvalidState, "No pixmap loaded"),
                }
            }
            TextureData::GpuAllocated(_) => glite_bail!(
                "glite::TextureData",
                Error::InvalidState,
                "GPU-only texture data does not provide a pixmap"
            ),
        }
    }

    /// Whether the consumer should drop the pixmap after upload
    pub fn disposes_pixmap(&self) -> Result<bool> {
        match self {
            TextureData::Decoded(data) => Ok(data.dispose_pixmap),
            TextureData::Deferred(_) => Ok(true),
            TextureData::GpuAllocated(_) => glite_bail!(
                "glite::TextureData",
                Error::InvalidState,
                "GPU-only texture data does not provide a pixmap"
            ),
        }
    }

    /// Drop the retained pixmap reference after an upload
    pub(crate) fn release_pixmap(&mut self) {
        match self {
            TextureData::Decoded(data) => data.pixmap = None,
            TextureData::Deferred(data) => data.pixmap = None,
            TextureData::GpuAllocated(_) => {}
        }
    }

    /// Issue the allocation call for custom data into `target` of the bound texture
    pub fn consume_custom_data(&mut self, ctx: &GlContext, target: GLenum) -> Result<()> {
        match self {
            TextureData::GpuAllocated(data) => {
                ctx.device().tex_image_2d(
                    target,
                    data.mip_level,
                    data.internal_format,
                    data.width,
                    data.height,
                    data.format,
                    data.data_type,
                    None,
                );
                Ok(())
            }
            _ => glite_bail!(
                "glite::TextureData",
                Error::InvalidState,
                "This texture data does not upload data itself"
            ),
        }
    }

    // ===== METADATA =====

    /// Width in pixels (0 for deferred data never prepared)
    pub fn width(&self) -> u32 {
        match self {
            TextureData::Decoded(data) => data.width,
            TextureData::Deferred(data) => data.width,
            TextureData::GpuAllocated(data) => data.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            TextureData::Decoded(data) => data.height,
            TextureData::Deferred(data) => data.height,
            TextureData::GpuAllocated(data) => data.height,
        }
    }

    /// GL pixel format
    pub fn format(&self) -> GLenum {
        match self {
            TextureData::Decoded(data) => data.format,
            TextureData::Deferred(data) => data.format,
            TextureData::GpuAllocated(data) => data.format,
        }
    }

    pub fn use_mipmaps(&self) -> bool {
        match self {
            TextureData::Decoded(data) => data.use_mipmaps,
            TextureData::Deferred(data) => data.use_mipmaps,
            TextureData::GpuAllocated(_) => false,
        }
    }

    /// Whether the data can be uploaded again after a context loss
    pub fn is_managed(&self) -> bool {
        match self {
            TextureData::Decoded(data) => data.managed && data.pixmap.is_some(),
            TextureData::Deferred(_) | TextureData::GpuAllocated(_) => true,
        }
    }
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureData::Decoded(data) => f.debug_tuple("Decoded").field(data).finish(),
            TextureData::Deferred(data) => f
                .debug_struct("Deferred")
                .field("path", &data.path)
                .field("location", &data.location)
                .field("prepared", &data.prepared)
                .field("width", &data.width)
                .field("height", &data.height)
                .finish(),
            TextureData::GpuAllocated(data) => f.debug_tuple("GpuAllocated").field(data).finish(),
        }
    }
}

#[cfg(test)]
#[path = "texture_data_tests.rs"]
mod tests;
