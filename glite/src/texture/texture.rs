//! 2D texture backed by a retained [`TextureData`]

use std::sync::Arc;

use crate::asset::{AssetLoader, FileLocation};
use crate::device::{gl, GlContext, Handle};
use crate::error::{Error, Result};
use crate::managed::Managed;
use crate::{glite_bail, glite_warn};
use super::gl_texture::{upload_image_data, GlTexture, GpuTexture, TextureFilter, TextureWrap};
use super::pixmap::Pixmap;
use super::texture_data::TextureData;

/// GL_TEXTURE_2D texture
#[derive(Debug)]
pub struct Texture {
    base: GlTexture,
    data: Option<TextureData>,
}

impl Texture {
    /// Texture object without storage
    pub fn empty(ctx: &GlContext) -> Self {
        Self {
            base: GlTexture::new(ctx, gl::TEXTURE_2D),
            data: None,
        }
    }

    /// Upload a pixmap, retaining it for reloads
    ///
    /// `None` creates an empty texture: there is nothing to load.
    pub fn from_pixmap(ctx: &GlContext, pixmap: Option<Arc<Pixmap>>, use_mipmaps: bool) -> Result<Self> {
        let mut texture = Self::empty(ctx);
        if let Some(pixmap) = pixmap {
            texture.load(TextureData::from_pixmap(pixmap, use_mipmaps, false, true))?;
        }
        Ok(texture)
    }

    /// Upload arbitrary texture data
    pub fn from_data(ctx: &GlContext, data: TextureData) -> Result<Self> {
        let mut texture = Self::empty(ctx);
        texture.load(data)?;
        Ok(texture)
    }

    /// Decode and upload an image file, re-reading it on reload
    ///
    /// A file the loader cannot find leaves the texture empty.
    pub fn from_file(
        ctx: &GlContext,
        loader: Arc<dyn AssetLoader>,
        path: &str,
        location: FileLocation,
        use_mipmaps: bool,
    ) -> Result<Self> {
        let mut texture = Self::empty(ctx);
        match texture.load(TextureData::from_file(loader, path, location, use_mipmaps)) {
            Ok(()) => Ok(texture),
            Err(Error::AssetNotFound(_)) => {
                glite_warn!("glite::Texture", "Nothing to load for {}, texture left empty", path);
                texture.data = None;
                Ok(texture)
            }
            Err(err) => Err(err),
        }
    }

    /// Bind, upload, resend sampler state, unbind
    ///
    /// The data is retained even when the upload fails so that the caller
    /// can inspect it.
    pub fn load(&mut self, data: TextureData) -> Result<()> {
        let data = self.data.insert(data);
        let ctx = self.base.context().clone();

        self.base.bind();
        let uploaded = upload_image_data(&ctx, gl::TEXTURE_2D, data, 0);
        if uploaded.is_ok() {
            self.base.resend_sampler_state();
        }
        self.base.unbind();
        uploaded
    }

    pub fn base(&self) -> &GlTexture {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut GlTexture {
        &mut self.base
    }

    /// Retained data, `None` for empty textures
    pub fn data(&self) -> Option<&TextureData> {
        self.data.as_ref()
    }

    /// Whether the texture survives a context loss
    pub fn is_managed(&self) -> bool {
        self.data.as_ref().map_or(true, TextureData::is_managed)
    }

    pub fn bind(&self) {
        self.base.bind();
    }

    pub fn bind_unit(&self, unit: u32) {
        self.base.bind_unit(unit);
    }

    pub fn set_filter(&mut self, min: TextureFilter, mag: TextureFilter) {
        self.base.set_filter(min, mag);
    }

    pub fn set_wrap(&mut self, u: TextureWrap, v: TextureWrap) {
        self.base.set_wrap(u, v);
    }

    pub fn handle(&self) -> Handle {
        self.base.handle()
    }

    /// Release the GPU texture; the retained data is kept
    pub fn dispose(&mut self) {
        self.base.dispose();
    }
}

impl GpuTexture for Texture {
    fn base(&self) -> &GlTexture {
        &self.base
    }

    fn width(&self) -> u32 {
        self.data.as_ref().map_or(0, TextureData::width)
    }

    fn height(&self) -> u32 {
        self.data.as_ref().map_or(0, TextureData::height)
    }

    fn depth(&self) -> u32 {
        0
    }

    fn reload(&mut self) -> Result<()> {
        if !self.is_managed() {
            glite_bail!("glite::Texture", Error::InvalidState, "Tried to reload an unmanaged texture");
        }
        self.base.regenerate();
        match self.data.take() {
            Some(data) => self.load(data),
            None => {
                self.base.bind();
                self.base.resend_sampler_state();
                self.base.unbind();
                Ok(())
            }
        }
    }
}

impl Managed for Texture {
    fn invalidate(&mut self) -> Result<()> {
        self.reload()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
