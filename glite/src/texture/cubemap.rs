//! Cube map texture with six retained faces

use std::sync::Arc;

use glam::Vec3;

use crate::asset::{AssetLoader, FileLocation};
use crate::device::{gl, GlContext, GLenum};
use crate::error::{Error, Result};
use crate::glite_bail;
use crate::managed::Managed;
use super::gl_texture::{upload_image_data, GlTexture, GpuTexture, TextureFilter, TextureWrap};
use super::pixmap::Pixmap;
use super::texture_data::TextureData;

/// Face of a cube map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubemapSide {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubemapSide {
    /// All faces in upload order
    pub const ALL: [CubemapSide; 6] = [
        CubemapSide::PositiveX,
        CubemapSide::NegativeX,
        CubemapSide::PositiveY,
        CubemapSide::NegativeY,
        CubemapSide::PositiveZ,
        CubemapSide::NegativeZ,
    ];

    pub fn index(self) -> usize {
        match self {
            CubemapSide::PositiveX => 0,
            CubemapSide::NegativeX => 1,
            CubemapSide::PositiveY => 2,
            CubemapSide::NegativeY => 3,
            CubemapSide::PositiveZ => 4,
            CubemapSide::NegativeZ => 5,
        }
    }

    /// Image target of the face
    pub fn gl_enum(self) -> GLenum {
        gl::TEXTURE_CUBE_MAP_POSITIVE_X + self.index() as GLenum
    }

    /// Up vector of a camera looking at the face
    pub fn up(self) -> Vec3 {
        match self {
            CubemapSide::PositiveY => Vec3::Z,
            CubemapSide::NegativeY => Vec3::NEG_Z,
            _ => Vec3::NEG_Y,
        }
    }

    /// Direction of a camera looking at the face
    pub fn direction(self) -> Vec3 {
        match self {
            CubemapSide::PositiveX => Vec3::X,
            CubemapSide::NegativeX => Vec3::NEG_X,
            CubemapSide::PositiveY => Vec3::Y,
            CubemapSide::NegativeY => Vec3::NEG_Y,
            CubemapSide::PositiveZ => Vec3::Z,
            CubemapSide::NegativeZ => Vec3::NEG_Z,
        }
    }
}

/// GL_TEXTURE_CUBE_MAP texture
#[derive(Debug)]
pub struct Cubemap {
    base: GlTexture,
    faces: [Option<TextureData>; 6],
}

impl Cubemap {
    /// Upload six pixmaps (+X, -X, +Y, -Y, +Z, -Z); missing faces are skipped
    pub fn from_pixmaps(ctx: &GlContext, faces: [Option<Arc<Pixmap>>; 6]) -> Result<Self> {
        let faces = faces.map(|face| face.map(|pixmap| TextureData::from_pixmap(pixmap, false, false, true)));
        Self::from_data(ctx, faces)
    }

    /// Decode and upload six image files (+X, -X, +Y, -Y, +Z, -Z)
    pub fn from_files(
        ctx: &GlContext,
        loader: Arc<dyn AssetLoader>,
        paths: [&str; 6],
        location: FileLocation,
    ) -> Result<Self> {
        let faces = paths.map(|path| Some(TextureData::from_file(loader.clone(), path, location, false)));
        Self::from_data(ctx, faces)
    }

    /// Upload arbitrary face data
    pub fn from_data(ctx: &GlContext, faces: [Option<TextureData>; 6]) -> Result<Self> {
        let mut cubemap = Self {
            base: GlTexture::new(ctx, gl::TEXTURE_CUBE_MAP),
            faces,
        };
        cubemap.load()?;
        Ok(cubemap)
    }

    fn load(&mut self) -> Result<()> {
        let ctx = self.base.context().clone();
        self.base.bind();
        self.base.resend_sampler_state();

        let mut result = Ok(());
        for side in CubemapSide::ALL {
            if let Some(data) = self.faces[side.index()].as_mut() {
                result = upload_image_data(&ctx, side.gl_enum(), data, 0);
                if result.is_err() {
                    break;
                }
            }
        }

        // The chain can only be built once all six faces are in place
        if result.is_ok() && self.faces.iter().flatten().any(TextureData::use_mipmaps) {
            ctx.device().generate_mipmap(gl::TEXTURE_CUBE_MAP);
            ctx.check_error("Cubemap mipmaps");
        }

        self.base.unbind();
        result
    }

    pub fn base(&self) -> &GlTexture {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut GlTexture {
        &mut self.base
    }

    /// Retained data of one face
    pub fn face(&self, side: CubemapSide) -> Option<&TextureData> {
        self.faces[side.index()].as_ref()
    }

    /// Whether every present face can be uploaded again
    pub fn is_managed(&self) -> bool {
        self.faces.iter().flatten().all(TextureData::is_managed)
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

    pub fn dispose(&mut self) {
        self.base.dispose();
    }

    fn max_dimension(&self, sides: [CubemapSide; 4], dimension: fn(&TextureData) -> u32) -> u32 {
        sides
            .iter()
            .filter_map(|side| self.faces[side.index()].as_ref())
            .map(dimension)
            .max()
            .unwrap_or(0)
    }
}

impl GpuTexture for Cubemap {
    fn base(&self) -> &GlTexture {
        &self.base
    }

    /// Largest width among the Z and Y faces
    fn width(&self) -> u32 {
        self.max_dimension(
            [
                CubemapSide::PositiveZ,
                CubemapSide::NegativeZ,
                CubemapSide::PositiveY,
                CubemapSide::NegativeY,
            ],
            TextureData::width,
        )
    }

    /// Largest height among the Z and X faces
    fn height(&self) -> u32 {
        self.max_dimension(
            [
                CubemapSide::PositiveZ,
                CubemapSide::NegativeZ,
                CubemapSide::PositiveX,
                CubemapSide::NegativeX,
            ],
            TextureData::height,
        )
    }

    fn depth(&self) -> u32 {
        0
    }

    fn reload(&mut self) -> Result<()> {
        if !self.is_managed() {
            glite_bail!("glite::Cubemap", Error::InvalidState, "Tried to reload an unmanaged cubemap");
        }
        self.base.regenerate();
        self.load()
    }
}

impl Managed for Cubemap {
    fn invalidate(&mut self) -> Result<()> {
        self.reload()
    }
}

#[cfg(test)]
#[path = "cubemap_tests.rs"]
mod tests;
