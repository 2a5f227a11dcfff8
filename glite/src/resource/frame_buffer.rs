//! Framebuffer objects with texture and renderbuffer attachments
//!
//! A [`FrameBufferBuilder`] collects attachment specs; [`FrameBufferBuilder::build`]
//! creates every GPU object in one pass and validates completeness. On any
//! failure, everything created by that pass is released before the error is
//! returned.

use bitflags::bitflags;

use crate::device::{gl, GlContext, GLenum, GlesVersion, Handle, HandleKind};
use crate::error::{Error, FramebufferStatus, Result};
use crate::managed::Managed;
use crate::texture::{PixelFormat, Texture, TextureData, TextureFilter, TextureWrap};
use crate::{glite_bail, glite_debug, glite_error, glite_warn};

bitflags! {
    /// Role and storage of a texture attachment
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AttachmentFlags: u32 {
        /// Floating-point color target
        const FLOAT    = 1 << 0;
        /// No CPU-side copy is kept for the float target
        const GPU_ONLY = 1 << 1;
        /// Bound to DEPTH_ATTACHMENT
        const DEPTH    = 1 << 2;
        /// Bound to STENCIL_ATTACHMENT
        const STENCIL  = 1 << 3;
    }
}

/// Texture attachment description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAttachmentSpec {
    pub internal_format: i32,
    pub format: GLenum,
    pub data_type: GLenum,
    pub flags: AttachmentFlags,
}

impl TextureAttachmentSpec {
    pub fn is_color(&self) -> bool {
        !self.flags.intersects(AttachmentFlags::DEPTH | AttachmentFlags::STENCIL)
    }

    pub fn is_depth(&self) -> bool {
        self.flags.contains(AttachmentFlags::DEPTH)
    }

    pub fn is_stencil(&self) -> bool {
        self.flags.contains(AttachmentFlags::STENCIL)
    }

    pub fn is_float(&self) -> bool {
        self.flags.contains(AttachmentFlags::FLOAT)
    }
}

/// Renderbuffer attachment description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderBufferSpec {
    pub internal_format: GLenum,
}

/// Collects the attachments of a framebuffer
#[derive(Debug, Clone)]
pub struct FrameBufferBuilder {
    width: u32,
    height: u32,
    texture_attachments: Vec<TextureAttachmentSpec>,
    depth_render_buffer: Option<RenderBufferSpec>,
    stencil_render_buffer: Option<RenderBufferSpec>,
    packed_stencil_depth_render_buffer: Option<RenderBufferSpec>,
}

impl FrameBufferBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texture_attachments: Vec::new(),
            depth_render_buffer: None,
            stencil_render_buffer: None,
            packed_stencil_depth_render_buffer: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texture_attachments(&self) -> &[TextureAttachmentSpec] {
        &self.texture_attachments
    }

    // ===== TEXTURE ATTACHMENTS =====

    pub fn add_color_texture_attachment(mut self, internal_format: i32, format: GLenum, data_type: GLenum) -> Self {
        self.texture_attachments.push(TextureAttachmentSpec {
            internal_format,
            format,
            data_type,
            flags: AttachmentFlags::empty(),
        });
        self
    }

    /// Color attachment in the layout of a pixel format
    pub fn add_basic_color_texture_attachment(self, format: PixelFormat) -> Self {
        let gl_format = format.gl_format();
        self.add_color_texture_attachment(gl_format as i32, gl_format, format.gl_type())
    }

    /// Floating-point color attachment (GLES 3)
    pub fn add_float_attachment(
        mut self,
        internal_format: i32,
        format: GLenum,
        data_type: GLenum,
        gpu_only: bool,
    ) -> Self {
        let mut flags = AttachmentFlags::FLOAT;
        flags.set(AttachmentFlags::GPU_ONLY, gpu_only);
        self.texture_attachments.push(TextureAttachmentSpec {
            internal_format,
            format,
            data_type,
            flags,
        });
        self
    }

    /// Depth texture attachment (GLES 3)
    pub fn add_depth_texture_attachment(mut self, internal_format: i32, data_type: GLenum) -> Self {
        self.texture_attachments.push(TextureAttachmentSpec {
            internal_format,
            format: gl::DEPTH_COMPONENT,
            data_type,
            flags: AttachmentFlags::DEPTH,
        });
        self
    }

    /// Stencil texture attachment (GLES 3)
    pub fn add_stencil_texture_attachment(mut self, internal_format: i32, data_type: GLenum) -> Self {
        self.texture_attachments.push(TextureAttachmentSpec {
            internal_format,
            format: gl::STENCIL_INDEX,
            data_type,
            flags: AttachmentFlags::STENCIL,
        });
        self
    }

    // ===== RENDERBUFFERS =====

    pub fn add_depth_render_buffer(mut self, internal_format: GLenum) -> Self {
        self.depth_render_buffer = Some(RenderBufferSpec { internal_format });
        self
    }

    pub fn add_stencil_render_buffer(mut self, internal_format: GLenum) -> Self {
        self.stencil_render_buffer = Some(RenderBufferSpec { internal_format });
        self
    }

    /// Packed depth-stencil renderbuffer (GLES 3)
    pub fn add_stencil_depth_packed_render_buffer(mut self, internal_format: GLenum) -> Self {
        self.packed_stencil_depth_render_buffer = Some(RenderBufferSpec { internal_format });
        self
    }

    /// 16-bit depth renderbuffer
    pub fn add_basic_depth_render_buffer(self) -> Self {
        self.add_depth_render_buffer(gl::DEPTH_COMPONENT16)
    }

    /// 8-bit stencil renderbuffer
    pub fn add_basic_stencil_render_buffer(self) -> Self {
        self.add_stencil_render_buffer(gl::STENCIL_INDEX8)
    }

    /// 24-bit depth / 8-bit stencil renderbuffer
    pub fn add_basic_stencil_depth_packed_render_buffer(self) -> Self {
        self.add_stencil_depth_packed_render_buffer(gl::DEPTH24_STENCIL8)
    }

    // ===== BUILD =====

    /// Create the framebuffer and all of its attachments
    pub fn build(self, ctx: &GlContext) -> Result<FrameBuffer> {
        let mut frame_buffer = FrameBuffer {
            ctx: ctx.clone(),
            builder: self,
            handle: 0,
            depth_buffer: 0,
            stencil_buffer: 0,
            packed_buffer: 0,
            textures: Vec::new(),
        };
        frame_buffer.build_objects()?;
        Ok(frame_buffer)
    }

    fn validate(&self, ctx: &GlContext) -> Result<()> {
        if ctx.version() >= GlesVersion::Gles3 {
            return Ok(());
        }

        let source = "glite::FrameBuffer";
        if self.packed_stencil_depth_render_buffer.is_some() {
            glite_bail!(source, Error::InvalidState, "Packed depth-stencil renderbuffers require GLES 3");
        }
        if self.texture_attachments.len() > 1 {
            glite_bail!(source, Error::InvalidState, "Multiple render targets require GLES 3");
        }
        for spec in &self.texture_attachments {
            if spec.is_depth() {
                glite_bail!(source, Error::InvalidState, "Depth texture attachments require GLES 3");
            }
            if spec.is_stencil() {
                glite_bail!(source, Error::InvalidState, "Stencil texture attachments require GLES 3");
            }
            if spec.is_float() {
                glite_bail!(source, Error::InvalidState, "Float texture attachments require GLES 3");
            }
        }
        Ok(())
    }
}

/// Framebuffer object with its attachment textures and renderbuffers
#[derive(Debug)]
pub struct FrameBuffer {
    ctx: GlContext,
    builder: FrameBufferBuilder,
    handle: Handle,
    depth_buffer: Handle,
    stencil_buffer: Handle,
    packed_buffer: Handle,
    textures: Vec<Texture>,
}

impl FrameBuffer {
    /// Single color target in a pixel format, with optional depth and stencil
    /// renderbuffers
    pub fn new(
        ctx: &GlContext,
        format: PixelFormat,
        width: u32,
        height: u32,
        has_depth: bool,
        has_stencil: bool,
    ) -> Result<Self> {
        let mut builder = FrameBufferBuilder::new(width, height).add_basic_color_texture_attachment(format);
        if has_depth {
            builder = builder.add_basic_depth_render_buffer();
        }
        if has_stencil {
            builder = builder.add_basic_stencil_render_buffer();
        }
        builder.build(ctx)
    }

    // ===== ACCESSORS =====

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn depth_buffer_handle(&self) -> Handle {
        self.depth_buffer
    }

    pub fn stencil_buffer_handle(&self) -> Handle {
        self.stencil_buffer
    }

    pub fn depth_stencil_packed_buffer_handle(&self) -> Handle {
        self.packed_buffer
    }

    pub fn width(&self) -> u32 {
        self.builder.width
    }

    pub fn height(&self) -> u32 {
        self.builder.height
    }

    /// First attachment texture
    pub fn color_buffer_texture(&self) -> Option<&Texture> {
        self.textures.first()
    }

    /// Attachment textures in declaration order
    pub fn texture_attachments(&self) -> &[Texture] {
        &self.textures
    }

    // ===== BINDING =====

    pub fn bind(&self) {
        self.ctx.device().bind_framebuffer(gl::FRAMEBUFFER, self.handle);
    }

    /// Bind the context's default framebuffer
    pub fn unbind(&self) {
        self.ctx
            .device()
            .bind_framebuffer(gl::FRAMEBUFFER, self.ctx.default_framebuffer());
    }

    /// Bind and set the viewport to the framebuffer size
    pub fn begin(&self) {
        self.bind();
        self.ctx
            .device()
            .viewport(0, 0, self.builder.width as i32, self.builder.height as i32);
    }

    /// Unbind and restore the given viewport
    pub fn end(&self, x: i32, y: i32, width: i32, height: i32) {
        self.unbind();
        self.ctx.device().viewport(x, y, width, height);
    }

    /// Release the framebuffer, its renderbuffers and its textures; idempotent
    pub fn dispose(&mut self) {
        for texture in &mut self.textures {
            texture.dispose();
        }
        self.textures.clear();
        self.release_render_buffers();
        self.ctx.release(HandleKind::Framebuffer, self.handle);
        self.handle = 0;
    }

    // ===== CONSTRUCTION =====

    fn build_objects(&mut self) -> Result<()> {
        self.builder.validate(&self.ctx)?;

        let (width, height) = (self.builder.width, self.builder.height);
        self.handle = self.ctx.allocate(HandleKind::Framebuffer);
        self.ctx.device().bind_framebuffer(gl::FRAMEBUFFER, self.handle);

        if let Some(spec) = self.builder.depth_render_buffer {
            self.depth_buffer = self.create_render_buffer(spec.internal_format);
        }
        if let Some(spec) = self.builder.stencil_render_buffer {
            self.stencil_buffer = self.create_render_buffer(spec.internal_format);
        }
        if let Some(spec) = self.builder.packed_stencil_depth_render_buffer {
            self.packed_buffer = self.create_render_buffer(spec.internal_format);
        }

        let specs = self.builder.texture_attachments.clone();
        let multiple_targets = specs.len() > 1;
        let mut color_targets = Vec::new();
        for spec in &specs {
            let texture = match create_texture(&self.ctx, spec, width, height) {
                Ok(texture) => texture,
                Err(err) => {
                    self.rollback();
                    return Err(err);
                }
            };

            let attachment = if spec.is_depth() {
                gl::DEPTH_ATTACHMENT
            } else if spec.is_stencil() {
                gl::STENCIL_ATTACHMENT
            } else {
                let attachment = gl::COLOR_ATTACHMENT0 + color_targets.len() as GLenum;
                color_targets.push(attachment);
                attachment
            };
            self.ctx
                .device()
                .framebuffer_texture_2d(gl::FRAMEBUFFER, attachment, gl::TEXTURE_2D, texture.handle(), 0);
            self.textures.push(texture);
        }

        {
            let mut device = self.ctx.device();
            if multiple_targets {
                device.draw_buffers(&color_targets);
            }
            device.bind_texture(gl::TEXTURE_2D, 0);

            if self.depth_buffer != 0 {
                device.framebuffer_renderbuffer(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, gl::RENDERBUFFER, self.depth_buffer);
            }
            if self.stencil_buffer != 0 {
                device.framebuffer_renderbuffer(
                    gl::FRAMEBUFFER,
                    gl::STENCIL_ATTACHMENT,
                    gl::RENDERBUFFER,
                    self.stencil_buffer,
                );
            }
            if self.packed_buffer != 0 {
                device.framebuffer_renderbuffer(
                    gl::FRAMEBUFFER,
                    gl::DEPTH_STENCIL_ATTACHMENT,
                    gl::RENDERBUFFER,
                    self.packed_buffer,
                );
            }
            device.bind_renderbuffer(gl::RENDERBUFFER, 0);
        }

        let mut status = self.ctx.device().check_framebuffer_status(gl::FRAMEBUFFER);
        if status == gl::FRAMEBUFFER_UNSUPPORTED && self.can_pack_render_buffers() {
            status = self.retry_with_packed_render_buffer();
        }

        self.ctx
            .device()
            .bind_framebuffer(gl::FRAMEBUFFER, self.ctx.default_framebuffer());

        if status != gl::FRAMEBUFFER_COMPLETE {
            self.rollback();
            let status = status_from_gl(status);
            glite_error!("glite::FrameBuffer", "Frame buffer couldn't be constructed: {}", status);
            return Err(Error::FramebufferIncomplete(status));
        }

        glite_debug!(
            "glite::FrameBuffer",
            "Built frame buffer {} ({}x{}, {} textures)",
            self.handle,
            width,
            height,
            self.textures.len()
        );
        Ok(())
    }

    fn create_render_buffer(&self, internal_format: GLenum) -> Handle {
        let handle = self.ctx.allocate(HandleKind::Renderbuffer);
        let mut device = self.ctx.device();
        device.bind_renderbuffer(gl::RENDERBUFFER, handle);
        device.renderbuffer_storage(gl::RENDERBUFFER, internal_format, self.builder.width, self.builder.height);
        handle
    }

    fn can_pack_render_buffers(&self) -> bool {
        self.ctx.version() >= GlesVersion::Gles3
            && self.depth_buffer != 0
            && self.stencil_buffer != 0
            && self.packed_buffer == 0
    }

    /// Replace separate depth and stencil renderbuffers with one packed buffer
    fn retry_with_packed_render_buffer(&mut self) -> GLenum {
        glite_warn!(
            "glite::FrameBuffer",
            "Separate depth and stencil buffers unsupported, retrying with a packed buffer"
        );
        self.ctx.release(HandleKind::Renderbuffer, self.depth_buffer);
        self.ctx.release(HandleKind::Renderbuffer, self.stencil_buffer);
        self.depth_buffer = 0;
        self.stencil_buffer = 0;

        self.packed_buffer = self.create_render_buffer(gl::DEPTH24_STENCIL8);
        let mut device = self.ctx.device();
        device.bind_renderbuffer(gl::RENDERBUFFER, 0);
        device.framebuffer_renderbuffer(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, gl::RENDERBUFFER, self.packed_buffer);
        device.framebuffer_renderbuffer(gl::FRAMEBUFFER, gl::STENCIL_ATTACHMENT, gl::RENDERBUFFER, self.packed_buffer);
        device.check_framebuffer_status(gl::FRAMEBUFFER)
    }

    fn release_render_buffers(&mut self) {
        for handle in [&mut self.depth_buffer, &mut self.stencil_buffer, &mut self.packed_buffer] {
            self.ctx.release(HandleKind::Renderbuffer, *handle);
            *handle = 0;
        }
    }

    /// Release everything created by a failed build
    fn rollback(&mut self) {
        self.ctx
            .device()
            .bind_framebuffer(gl::FRAMEBUFFER, self.ctx.default_framebuffer());
        self.dispose();
    }
}

impl Managed for FrameBuffer {
    /// Rebuild every object from the retained attachment specs
    ///
    /// Handles made stale by the context loss are forgotten, not deleted.
    fn invalidate(&mut self) -> Result<()> {
        for texture in &mut self.textures {
            texture.base_mut().forget_handle();
        }
        self.textures.clear();
        self.handle = 0;
        self.depth_buffer = 0;
        self.stencil_buffer = 0;
        self.packed_buffer = 0;
        self.build_objects()
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// GPU-only texture for one attachment, linear filtering, clamped
fn create_texture(ctx: &GlContext, spec: &TextureAttachmentSpec, width: u32, height: u32) -> Result<Texture> {
    let data = TextureData::gpu_only(width, height, 0, spec.internal_format, spec.format, spec.data_type);
    let mut texture = Texture::from_data(ctx, data)?;
    texture.set_filter(TextureFilter::Linear, TextureFilter::Linear);
    texture.set_wrap(TextureWrap::ClampToEdge, TextureWrap::ClampToEdge);
    Ok(texture)
}

fn status_from_gl(status: GLenum) -> FramebufferStatus {
    match status {
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        gl::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::MissingAttachment,
        gl::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
        other => FramebufferStatus::Unknown(other),
    }
}

#[cfg(test)]
#[path = "frame_buffer_tests.rs"]
mod tests;
