//! Vertex and index backend interfaces
//!
//! Every backend keeps a CPU mirror and moves between four states:
//!
//! ```text
//!              set / update                     bind (uploads)
//! Unbound+Clean ───────────► Unbound+Dirty ─────────────────► Bound+Clean
//!       ▲                                                         │
//!       └──────────────────────────── unbind ─────────────────────┘
//! ```
//!
//! While bound, `set`/`update` upload at once, so a bound backend is never
//! left dirty.

use std::fmt;

use crate::device::GlContext;
use crate::error::Result;
use crate::resource::ShaderProgram;
use super::vertex_attribute::VertexAttributes;

/// Strategy used to feed vertices to draw calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexDataType {
    /// Client memory, no GPU buffer
    VertexArray,
    /// Buffer object re-sent whole on every dirty bind
    VertexBufferObject,
    /// Buffer object with storage allocated once and patched by sub-range
    VertexBufferObjectSubData,
    /// Buffer object with attribute bindings cached in a vertex array object (GLES 3)
    VertexBufferObjectWithVao,
}

/// Per-vertex data backend
pub trait VertexData: fmt::Debug {
    fn attributes(&self) -> &VertexAttributes;

    /// Vertices currently defined
    fn num_vertices(&self) -> usize;

    /// Vertex capacity
    fn num_max_vertices(&self) -> usize;

    /// Defined vertex data, `vertex_size / 4` slots per vertex
    fn vertices(&self) -> &[f32];

    /// Replace the contents with `vertices[offset..offset + count]`
    fn set_vertices(&mut self, vertices: &[f32], offset: usize, count: usize) -> Result<()>;

    /// Patch `count` values at `target_offset` without changing the length
    fn update_vertices(
        &mut self,
        target_offset: usize,
        vertices: &[f32],
        source_offset: usize,
        count: usize,
    ) -> Result<()>;

    /// Bind for drawing
    ///
    /// Attribute locations come from `locations` (one per attribute, -1 to
    /// skip) or, when absent, from the shader by alias.
    fn bind(&mut self, shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) -> Result<()>;

    fn unbind(&mut self, shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>);

    fn is_bound(&self) -> bool;

    /// CPU mirror ahead of the GPU copy
    fn is_dirty(&self) -> bool;

    /// Regenerate GPU objects after a context loss; the next bind re-uploads
    fn invalidate(&mut self);

    /// Release GPU objects; idempotent
    fn dispose(&mut self);
}

/// 16-bit index backend
pub trait IndexData: fmt::Debug {
    /// Indices currently defined
    fn num_indices(&self) -> usize;

    /// Index capacity
    fn num_max_indices(&self) -> usize;

    fn indices(&self) -> &[u16];

    /// Replace the contents with `indices[offset..offset + count]`
    fn set_indices(&mut self, indices: &[u16], offset: usize, count: usize) -> Result<()>;

    /// Patch `count` indices at `target_offset` without changing the length
    fn update_indices(
        &mut self,
        target_offset: usize,
        indices: &[u16],
        source_offset: usize,
        count: usize,
    ) -> Result<()>;

    fn bind(&mut self) -> Result<()>;

    fn unbind(&mut self);

    fn is_bound(&self) -> bool;

    fn is_dirty(&self) -> bool;

    fn invalidate(&mut self);

    fn dispose(&mut self);
}

// ============================================================================
// ATTRIBUTE BINDING HELPERS
// ============================================================================

/// Where attribute pointers read from
#[derive(Debug, Clone, Copy)]
pub(crate) enum AttributeSource<'a> {
    /// Offsets into the bound ARRAY_BUFFER
    Buffer,
    /// Interleaved vertices in client memory
    Client(&'a [u8]),
}

/// Location of each attribute: explicit list, shader alias lookup, or -1
///
/// An invalidated shader is recompiled before its locations are read.
pub(crate) fn resolve_locations(
    attributes: &VertexAttributes,
    shader: Option<&mut ShaderProgram>,
    locations: Option<&[i32]>,
) -> Vec<i32> {
    let shader: Option<&ShaderProgram> = match shader {
        Some(shader) => {
            shader.ensure_valid();
            Some(&*shader)
        }
        None => None,
    };
    attributes
        .iter()
        .enumerate()
        .map(|(index, attribute)| match (locations, shader) {
            (Some(locations), _) => locations.get(index).copied().unwrap_or(-1),
            (None, Some(shader)) => shader.attribute_location(&attribute.alias),
            (None, None) => -1,
        })
        .collect()
}

/// Enable and point every attribute with a non-negative location
pub(crate) fn enable_attributes(
    ctx: &GlContext,
    mut shader: Option<&mut ShaderProgram>,
    attributes: &VertexAttributes,
    locations: &[i32],
    source: AttributeSource<'_>,
) {
    let stride = attributes.vertex_size() as i32;
    for (attribute, &location) in attributes.iter().zip(locations) {
        if location < 0 {
            continue;
        }
        let (size, data_type, normalized) = (attribute.num_components, attribute.data_type, attribute.normalized);

        match (shader.as_deref_mut(), source) {
            (Some(shader), AttributeSource::Buffer) => {
                shader.enable_vertex_attribute(location);
                shader.set_vertex_attribute(location, size, data_type, normalized, stride, attribute.offset);
            }
            (Some(shader), AttributeSource::Client(bytes)) => {
                let data = bytes.get(attribute.offset..).unwrap_or(&[]);
                shader.enable_vertex_attribute(location);
                shader.set_vertex_attribute_client(location, size, data_type, normalized, stride, data);
            }
            (None, AttributeSource::Buffer) => {
                let mut device = ctx.device();
                device.enable_vertex_attrib_array(location as u32);
                device.vertex_attrib_pointer(location as u32, size, data_type, normalized, stride, attribute.offset);
            }
            (None, AttributeSource::Client(bytes)) => {
                let data = bytes.get(attribute.offset..).unwrap_or(&[]);
                let mut device = ctx.device();
                device.enable_vertex_attrib_array(location as u32);
                device.vertex_attrib_pointer_client(location as u32, size, data_type, normalized, stride, data);
            }
        }
    }
}

/// Disable every non-negative location
pub(crate) fn disable_attributes(ctx: &GlContext, mut shader: Option<&mut ShaderProgram>, locations: &[i32]) {
    for &location in locations.iter().filter(|location| **location >= 0) {
        match shader.as_deref_mut() {
            Some(shader) => shader.disable_vertex_attribute(location),
            None => ctx.device().disable_vertex_attrib_array(location as u32),
        }
    }
}
