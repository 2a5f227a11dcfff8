//! Buffer-object vertex backend recording its attribute setup in a vertex
//! array object (GLES 3)

use crate::device::{gl, GlContext, GLenum, GlesVersion, Handle, HandleKind};
use crate::error::{Error, Result};
use crate::glite_bail;
use crate::resource::ShaderProgram;
use super::host_buffer::HostBuffer;
use super::vertex_attribute::VertexAttributes;
use super::vertex_data::{disable_attributes, enable_attributes, resolve_locations, AttributeSource, VertexData};

/// Vertices in an ARRAY_BUFFER with attribute pointers kept in a VAO
///
/// The pointers are declared once per distinct location set; a bind with
/// the same locations as the previous one only binds the VAO.
#[derive(Debug)]
pub struct VertexBufferObjectWithVao {
    ctx: GlContext,
    attributes: VertexAttributes,
    buffer: HostBuffer<f32>,
    handle: Handle,
    vao: Handle,
    usage: GLenum,
    cached_locations: Vec<i32>,
    dirty: bool,
    bound: bool,
}

impl VertexBufferObjectWithVao {
    /// Fails with `InvalidState` on a GLES 2 context
    pub fn new(
        ctx: &GlContext,
        is_static: bool,
        num_vertices: usize,
        attributes: VertexAttributes,
    ) -> Result<Self> {
        if ctx.version() < GlesVersion::Gles3 {
            glite_bail!(
                "glite::VertexBufferObjectWithVao",
                Error::InvalidState,
                "Vertex array objects require GLES 3"
            );
        }

        let buffer = HostBuffer::new(num_vertices * attributes.floats_per_vertex());
        Ok(Self {
            ctx: ctx.clone(),
            attributes,
            buffer,
            handle: ctx.allocate(HandleKind::Buffer),
            vao: ctx.allocate(HandleKind::VertexArray),
            usage: if is_static { gl::STATIC_DRAW } else { gl::DYNAMIC_DRAW },
            cached_locations: Vec::new(),
            dirty: false,
            bound: false,
        })
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn vao_handle(&self) -> Handle {
        self.vao
    }

    fn upload(&mut self) {
        {
            let mut device = self.ctx.device();
            device.bind_buffer(gl::ARRAY_BUFFER, self.handle);
            device.buffer_data(gl::ARRAY_BUFFER, self.buffer.bytes(), self.usage);
        }
        self.ctx.check_error("VertexBufferObjectWithVao upload");
        self.dirty = false;
    }
}

impl VertexData for VertexBufferObjectWithVao {
    fn attributes(&self) -> &VertexAttributes {
        &self.attributes
    }

    fn num_vertices(&self) -> usize {
        self.buffer.len() / self.attributes.floats_per_vertex()
    }

    fn num_max_vertices(&self) -> usize {
        self.buffer.capacity() / self.attributes.floats_per_vertex()
    }

    fn vertices(&self) -> &[f32] {
        self.buffer.as_slice()
    }

    fn set_vertices(&mut self, vertices: &[f32], offset: usize, count: usize) -> Result<()> {
        self.buffer.set(vertices, offset, count)?;
        self.dirty = true;
        if self.bound {
            self.upload();
        }
        Ok(())
    }

    fn update_vertices(
        &mut self,
        target_offset: usize,
        vertices: &[f32],
        source_offset: usize,
        count: usize,
    ) -> Result<()> {
        self.buffer.update(target_offset, vertices, source_offset, count)?;
        self.dirty = true;
        if self.bound {
            self.upload();
        }
        Ok(())
    }

    fn bind(&mut self, mut shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) -> Result<()> {
        if self.handle == 0 || self.vao == 0 {
            glite_bail!(
                "glite::VertexBufferObjectWithVao",
                Error::InvalidResource,
                "Vertex buffer used after dispose"
            );
        }

        self.ctx.device().bind_vertex_array(self.vao);

        let requested = resolve_locations(&self.attributes, shader.as_deref_mut(), locations);
        if self.cached_locations.is_empty() || self.cached_locations != requested {
            self.ctx.device().bind_buffer(gl::ARRAY_BUFFER, self.handle);
            disable_attributes(&self.ctx, None, &self.cached_locations);
            enable_attributes(&self.ctx, shader, &self.attributes, &requested, AttributeSource::Buffer);
            self.cached_locations = requested;
        }

        if self.dirty {
            self.upload();
        }
        self.bound = true;
        Ok(())
    }

    /// Unbinds the VAO; attribute state stays recorded in it
    fn unbind(&mut self, _shader: Option<&mut ShaderProgram>, _locations: Option<&[i32]>) {
        self.ctx.device().bind_vertex_array(0);
        self.bound = false;
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn invalidate(&mut self) {
        self.handle = self.ctx.allocate(HandleKind::Buffer);
        self.vao = self.ctx.allocate(HandleKind::VertexArray);
        self.cached_locations.clear();
        self.dirty = true;
        self.bound = false;
    }

    fn dispose(&mut self) {
        if self.handle != 0 {
            self.ctx.device().bind_buffer(gl::ARRAY_BUFFER, 0);
            self.ctx.release(HandleKind::Buffer, self.handle);
            self.handle = 0;
        }
        if self.vao != 0 {
            self.ctx.device().bind_vertex_array(0);
            self.ctx.release(HandleKind::VertexArray, self.vao);
            self.vao = 0;
        }
        self.cached_locations.clear();
        self.bound = false;
    }
}

impl Drop for VertexBufferObjectWithVao {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "vertex_buffer_object_with_vao_tests.rs"]
mod tests;
