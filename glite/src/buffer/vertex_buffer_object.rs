//! Buffer-object vertex backend with whole-range uploads

use crate::device::{gl, GlContext, GLenum, Handle, HandleKind};
use crate::error::{Error, Result};
use crate::glite_bail;
use crate::resource::ShaderProgram;
use super::host_buffer::HostBuffer;
use super::vertex_attribute::VertexAttributes;
use super::vertex_data::{disable_attributes, enable_attributes, resolve_locations, AttributeSource, VertexData};

/// Vertices in an ARRAY_BUFFER, re-sent whole whenever they changed
#[derive(Debug)]
pub struct VertexBufferObject {
    ctx: GlContext,
    attributes: VertexAttributes,
    buffer: HostBuffer<f32>,
    handle: Handle,
    usage: GLenum,
    dirty: bool,
    bound: bool,
}

impl VertexBufferObject {
    /// Allocate the buffer name; storage is defined on first upload
    pub fn new(ctx: &GlContext, is_static: bool, num_vertices: usize, attributes: VertexAttributes) -> Self {
        let buffer = HostBuffer::new(num_vertices * attributes.floats_per_vertex());
        Self {
            ctx: ctx.clone(),
            attributes,
            buffer,
            handle: ctx.allocate(HandleKind::Buffer),
            usage: if is_static { gl::STATIC_DRAW } else { gl::DYNAMIC_DRAW },
            dirty: false,
            bound: false,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn usage(&self) -> GLenum {
        self.usage
    }

    /// Change the usage hint used by the next upload; not while bound
    pub fn set_usage(&mut self, usage: GLenum) -> Result<()> {
        if self.bound {
            glite_bail!("glite::VertexBufferObject", Error::InvalidState, "Cannot change usage while bound");
        }
        self.usage = usage;
        Ok(())
    }

    /// Replace the vertex layout; not while bound
    ///
    /// The storage is kept, so the vertex capacity follows the new stride.
    pub fn set_attributes(&mut self, attributes: VertexAttributes) -> Result<()> {
        if self.bound {
            glite_bail!("glite::VertexBufferObject", Error::InvalidState, "Cannot change attributes while bound");
        }
        self.attributes = attributes;
        self.dirty = true;
        Ok(())
    }

    /// Send the logical range to the bound buffer
    fn upload(&mut self) {
        self.ctx
            .device()
            .buffer_data(gl::ARRAY_BUFFER, self.buffer.bytes(), self.usage);
        self.ctx.check_error("VertexBufferObject upload");
        self.dirty = false;
    }
}

impl VertexData for VertexBufferObject {
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
        if self.handle == 0 {
            glite_bail!("glite::VertexBufferObject", Error::InvalidResource, "Vertex buffer used after dispose");
        }

        self.ctx.device().bind_buffer(gl::ARRAY_BUFFER, self.handle);
        if self.dirty {
            self.upload();
        }

        let resolved = resolve_locations(&self.attributes, shader.as_deref_mut(), locations);
        enable_attributes(&self.ctx, shader, &self.attributes, &resolved, AttributeSource::Buffer);
        self.bound = true;
        Ok(())
    }

    fn unbind(&mut self, mut shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) {
        let resolved = resolve_locations(&self.attributes, shader.as_deref_mut(), locations);
        disable_attributes(&self.ctx, shader, &resolved);
        self.ctx.device().bind_buffer(gl::ARRAY_BUFFER, 0);
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
        self.dirty = true;
        self.bound = false;
    }

    fn dispose(&mut self) {
        if self.handle == 0 {
            return;
        }
        self.ctx.device().bind_buffer(gl::ARRAY_BUFFER, 0);
        self.ctx.release(HandleKind::Buffer, self.handle);
        self.handle = 0;
        self.bound = false;
    }
}

impl Drop for VertexBufferObject {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "vertex_buffer_object_tests.rs"]
mod tests;
