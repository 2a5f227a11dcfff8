//! GPU texture base: target/handle pair with a filter and wrap state cache
//!
//! The cached filter and wrap values always equal the values last sent to the
//! driver for the current handle. After a context loss the handle is
//! regenerated and the owner resends everything with `force = true`.

use crate::device::{gl, GlContext, GLenum, Handle, HandleKind};
use crate::error::Result;
use super::texture_data::{TextureData, TextureDataKind};

/// Minification / magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
    MipMap,
    MipMapNearestNearest,
    MipMapLinearNearest,
    MipMapNearestLinear,
    MipMapLinearLinear,
}

impl TextureFilter {
    pub fn gl_enum(self) -> GLenum {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
            TextureFilter::MipMap => gl::LINEAR_MIPMAP_LINEAR,
            TextureFilter::MipMapNearestNearest => gl::NEAREST_MIPMAP_NEAREST,
            TextureFilter::MipMapLinearNearest => gl::LINEAR_MIPMAP_NEAREST,
            TextureFilter::MipMapNearestLinear => gl::NEAREST_MIPMAP_LINEAR,
            TextureFilter::MipMapLinearLinear => gl::LINEAR_MIPMAP_LINEAR,
        }
    }

    /// Whether the filter samples mip levels
    pub fn is_mip_map(self) -> bool {
        !matches!(self, TextureFilter::Nearest | TextureFilter::Linear)
    }
}

/// Texture coordinate wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    MirroredRepeat,
    ClampToEdge,
    Repeat,
}

impl TextureWrap {
    pub fn gl_enum(self) -> GLenum {
        match self {
            TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
            TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            TextureWrap::Repeat => gl::REPEAT,
        }
    }
}

/// Texture types with a reconstructible GPU copy
pub trait GpuTexture {
    /// Shared target/handle/state cache
    fn base(&self) -> &GlTexture;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn depth(&self) -> u32;

    /// Regenerate the handle and re-upload from retained CPU-side data
    fn reload(&mut self) -> Result<()>;
}

/// Target/handle pair plus cached sampler state
#[derive(Debug)]
pub struct GlTexture {
    ctx: GlContext,
    target: GLenum,
    handle: Handle,
    min_filter: TextureFilter,
    mag_filter: TextureFilter,
    u_wrap: TextureWrap,
    v_wrap: TextureWrap,
}

impl GlTexture {
    /// Generate a new texture object for `target`
    pub fn new(ctx: &GlContext, target: GLenum) -> Self {
        let handle = ctx.allocate(HandleKind::Texture);
        Self::with_handle(ctx, target, handle)
    }

    /// Adopt an existing texture object
    pub fn with_handle(ctx: &GlContext, target: GLenum, handle: Handle) -> Self {
        Self {
            ctx: ctx.clone(),
            target,
            handle,
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            u_wrap: TextureWrap::ClampToEdge,
            v_wrap: TextureWrap::ClampToEdge,
        }
    }

    // ===== ACCESSORS =====

    pub fn context(&self) -> &GlContext {
        &self.ctx
    }

    pub fn target(&self) -> GLenum {
        self.target
    }

    /// Texture object name (0 once disposed)
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn min_filter(&self) -> TextureFilter {
        self.min_filter
    }

    pub fn mag_filter(&self) -> TextureFilter {
        self.mag_filter
    }

    pub fn u_wrap(&self) -> TextureWrap {
        self.u_wrap
    }

    pub fn v_wrap(&self) -> TextureWrap {
        self.v_wrap
    }

    // ===== BINDING =====

    /// Bind to the currently active texture unit
    pub fn bind(&self) {
        self.ctx.device().bind_texture(self.target, self.handle);
    }

    /// Activate `unit` and bind to it
    pub fn bind_unit(&self, unit: u32) {
        let mut device = self.ctx.device();
        device.active_texture(gl::TEXTURE0 + unit);
        device.bind_texture(self.target, self.handle);
    }

    pub(crate) fn unbind(&self) {
        self.ctx.device().bind_texture(self.target, 0);
    }

    // ===== SAMPLER STATE =====

    /// Bind the texture and send both filters
    pub fn set_filter(&mut self, min: TextureFilter, mag: TextureFilter) {
        self.min_filter = min;
        self.mag_filter = mag;
        let mut device = self.ctx.device();
        device.bind_texture(self.target, self.handle);
        device.tex_parameter_i(self.target, gl::TEXTURE_MIN_FILTER, min.gl_enum() as i32);
        device.tex_parameter_i(self.target, gl::TEXTURE_MAG_FILTER, mag.gl_enum() as i32);
    }

    /// Bind the texture and send both wrap modes
    pub fn set_wrap(&mut self, u: TextureWrap, v: TextureWrap) {
        self.u_wrap = u;
        self.v_wrap = v;
        let mut device = self.ctx.device();
        device.bind_texture(self.target, self.handle);
        device.tex_parameter_i(self.target, gl::TEXTURE_WRAP_S, u.gl_enum() as i32);
        device.tex_parameter_i(self.target, gl::TEXTURE_WRAP_T, v.gl_enum() as i32);
    }

    /// Send filters that differ from the cache (all of them when `force`)
    ///
    /// Assumes the texture is bound on the active unit. `None` leaves a
    /// filter untouched.
    pub fn unsafe_set_filter(&mut self, min: Option<TextureFilter>, mag: Option<TextureFilter>, force: bool) {
        if let Some(min) = min {
            if force || self.min_filter != min {
                self.ctx
                    .device()
                    .tex_parameter_i(self.target, gl::TEXTURE_MIN_FILTER, min.gl_enum() as i32);
                self.min_filter = min;
            }
        }
        if let Some(mag) = mag {
            if force || self.mag_filter != mag {
                self.ctx
                    .device()
                    .tex_parameter_i(self.target, gl::TEXTURE_MAG_FILTER, mag.gl_enum() as i32);
                self.mag_filter = mag;
            }
        }
    }

    /// Send wrap modes that differ from the cache (all of them when `force`)
    ///
    /// Assumes the texture is bound on the active unit.
    pub fn unsafe_set_wrap(&mut self, u: Option<TextureWrap>, v: Option<TextureWrap>, force: bool) {
        if let Some(u) = u {
            if force || self.u_wrap != u {
                self.ctx
                    .device()
                    .tex_parameter_i(self.target, gl::TEXTURE_WRAP_S, u.gl_enum() as i32);
                self.u_wrap = u;
            }
        }
        if let Some(v) = v {
            if force || self.v_wrap != v {
                self.ctx
                    .device()
                    .tex_parameter_i(self.target, gl::TEXTURE_WRAP_T, v.gl_enum() as i32);
                self.v_wrap = v;
            }
        }
    }

    /// Resend the cached sampler state; the texture must be bound
    pub(crate) fn resend_sampler_state(&mut self) {
        self.unsafe_set_filter(Some(self.min_filter), Some(self.mag_filter), true);
        self.unsafe_set_wrap(Some(self.u_wrap), Some(self.v_wrap), true);
    }

    // ===== LIFECYCLE =====

    /// Replace the handle with a freshly generated one (context loss)
    pub(crate) fn regenerate(&mut self) {
        self.handle = self.ctx.allocate(HandleKind::Texture);
    }

    /// Drop a handle made stale by a context loss without deleting it
    pub(crate) fn forget_handle(&mut self) {
        self.handle = 0;
    }

    /// Release the texture object; no-op once disposed
    pub fn dispose(&mut self) {
        if self.handle != 0 {
            self.ctx.release(HandleKind::Texture, self.handle);
            self.handle = 0;
        }
    }
}

impl Drop for GlTexture {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Upload `data` into `target` (a 2D target or a cube face) of the bound texture
///
/// Prepares the data if needed. Custom data issues its own allocation;
/// pixmap data is uploaded with 1-byte row alignment, then the mip chain is
/// generated while the base level is still bound, then the pixmap is
/// released if the data owns it. Cube faces never generate mipmaps here: the
/// cube map is only complete once every face is uploaded, so its owner
/// generates the chain afterwards.
pub fn upload_image_data(ctx: &GlContext, target: GLenum, data: &mut TextureData, mip_level: i32) -> Result<()> {
    if !data.is_prepared() {
        data.prepare()?;
    }

    if data.kind() == TextureDataKind::Custom {
        return data.consume_custom_data(ctx, target);
    }

    let pixmap = data.consume_pixmap()?;
    let dispose = data.disposes_pixmap()?;
    let format = pixmap.format();

    {
        let mut device = ctx.device();
        device.pixel_store_i(gl::UNPACK_ALIGNMENT, 1);
        device.tex_image_2d(
            target,
            mip_level,
            format.gl_format() as i32,
            pixmap.width(),
            pixmap.height(),
            format.gl_format(),
            format.gl_type(),
            Some(pixmap.pixels()),
        );
        if data.use_mipmaps() && !is_cube_face(target) {
            device.generate_mipmap(target);
        }
    }
    ctx.check_error("upload_image_data");

    if dispose {
        data.release_pixmap();
    }
    Ok(())
}

fn is_cube_face(target: GLenum) -> bool {
    (gl::TEXTURE_CUBE_MAP_POSITIVE_X..=gl::TEXTURE_CUBE_MAP_NEGATIVE_Z).contains(&target)
}

#[cfg(test)]
#[path = "gl_texture_tests.rs"]
mod tests;
