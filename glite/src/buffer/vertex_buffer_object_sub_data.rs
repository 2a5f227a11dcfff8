//! Buffer-object vertex backend with storage allocated once and sub-range
//! uploads

use crate::device::{gl, GlContext, GLenum, Handle, HandleKind};
use crate::error::{Error, Result};
use crate::glite_bail;
use crate::resource::ShaderProgram;
use super::host_buffer::HostBuffer;
use super::vertex_attribute::VertexAttributes;
use super::vertex_data::{disable_attributes, enable_attributes, resolve_locations, AttributeSource, VertexData};

/// Vertices in an ARRAY_BUFFER sized to full capacity at creation
///
/// Uploads go through `buffer_sub_data`. A patch made while bound and
/// clean sends only the patched range.
#[derive(Debug)]
pub struct VertexBufferObjectSubData {
    ctx: GlContext,
    attributes: VertexAttributes,
    buffer: HostBuffer<f32>,
    handle: Handle,
    usage: GLenum,
    dirty: bool,
    bound: bool,
}

impl VertexBufferObjectSubData {
    pub fn new(ctx: &GlContext, is_static: bool, num_vertices: usize, attributes: VertexAttributes) -> Self {
        let buffer = HostBuffer::new(num_vertices * attributes.floats_per_vertex());
        let usage = if is_static { gl::STATIC_DRAW } else { gl::DYNAMIC_DRAW };
        let handle = create_buffer_object(ctx, buffer.capacity_bytes(), usage);
        Self {
            ctx: ctx.clone(),
            attributes,
            buffer,
            handle,
            usage,
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

    /// Send `count` values starting at `offset` to the bound buffer
    fn upload_range(&self, offset: usize, count: usize) {
        let bytes = self.buffer.range_bytes(offset, count);
        self.ctx
            .device()
            .buffer_sub_data(gl::ARRAY_BUFFER, offset * std::mem::size_of::<f32>(), bytes);
        self.ctx.check_error("VertexBufferObjectSubData upload");
    }

    fn upload_all(&mut self) {
        self.upload_range(0, self.buffer.len());
        self.dirty = false;
    }
}

/// Generate a buffer and allocate its full storage
fn create_buffer_object(ctx: &GlContext, size: usize, usage: GLenum) -> Handle {
    let handle = ctx.allocate(HandleKind::Buffer);
    let mut device = ctx.device();
    device.bind_buffer(gl::ARRAY_BUFFER, handle);
    device.buffer_data_size(gl::ARRAY_BUFFER, size, usage);
    device.bind_buffer(gl::ARRAY_BUFFER, 0);
    handle
}

impl VertexData for VertexBufferObjectSubData {
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
            self.upload_all();
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
        match (self.bound, self.dirty) {
            (true, false) => self.upload_range(target_offset, count),
            (true, true) => self.upload_all(),
            (false, _) => self.dirty = true,
        }
        Ok(())
    }

    fn bind(&mut self, mut shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) -> Result<()> {
        if self.handle == 0 {
            glite_bail!(
                "glite::VertexBufferObjectSubData",
                Error::InvalidResource,
                "Vertex buffer used after dispose"
            );
        }

        self.ctx.device().bind_buffer(gl::ARRAY_BUFFER, self.handle);
        if self.dirty {
            self.upload_all();
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
        self.handle = create_buffer_object(&self.ctx, self.buffer.capacity_bytes(), self.usage);
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

impl Drop for VertexBufferObjectSubData {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "vertex_buffer_object_sub_data_tests.rs"]
mod tests;
