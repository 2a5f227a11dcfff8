//! Client-memory vertex backend

use crate::device::GlContext;
use crate::error::{Error, Result};
use crate::glite_bail;
use crate::resource::ShaderProgram;
use super::host_buffer::HostBuffer;
use super::vertex_attribute::VertexAttributes;
use super::vertex_data::{disable_attributes, enable_attributes, resolve_locations, AttributeSource, VertexData};

/// Vertices kept in client memory and handed to the driver on every bind
///
/// Owns no GPU object, so context loss does not affect it.
#[derive(Debug)]
pub struct VertexArray {
    ctx: GlContext,
    attributes: VertexAttributes,
    buffer: HostBuffer<f32>,
    bound: bool,
}

impl VertexArray {
    pub fn new(ctx: &GlContext, num_vertices: usize, attributes: VertexAttributes) -> Self {
        let buffer = HostBuffer::new(num_vertices * attributes.floats_per_vertex());
        Self {
            ctx: ctx.clone(),
            attributes,
            buffer,
            bound: false,
        }
    }
}

impl VertexData for VertexArray {
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
        self.buffer.set(vertices, offset, count)
    }

    /// Always fails: client arrays are replaced whole
    fn update_vertices(
        &mut self,
        _target_offset: usize,
        _vertices: &[f32],
        _source_offset: usize,
        _count: usize,
    ) -> Result<()> {
        glite_bail!(
            "glite::VertexArray",
            Error::InvalidState,
            "Client vertex arrays cannot be patched in place, use set_vertices"
        );
    }

    fn bind(&mut self, mut shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) -> Result<()> {
        let resolved = resolve_locations(&self.attributes, shader.as_deref_mut(), locations);
        enable_attributes(
            &self.ctx,
            shader,
            &self.attributes,
            &resolved,
            AttributeSource::Client(self.buffer.bytes()),
        );
        self.bound = true;
        Ok(())
    }

    fn unbind(&mut self, mut shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) {
        let resolved = resolve_locations(&self.attributes, shader.as_deref_mut(), locations);
        disable_attributes(&self.ctx, shader, &resolved);
        self.bound = false;
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn is_dirty(&self) -> bool {
        false
    }

    fn invalidate(&mut self) {
        self.bound = false;
    }

    fn dispose(&mut self) {}
}

#[cfg(test)]
#[path = "vertex_array_tests.rs"]
mod tests;
