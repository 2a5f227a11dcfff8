//! Mesh: one vertex backend paired with one index backend
//!
//! The backend pair is chosen at construction from a [`VertexDataType`].
//! A mesh owns no GPU handle itself; disposal and context-loss recovery are
//! delegated to the two backends.

use crate::buffer::{
    IndexArray, IndexBufferObject, IndexBufferObjectSubData, IndexData, VertexArray, VertexAttribute,
    VertexAttributes, VertexBufferObject, VertexBufferObjectSubData, VertexBufferObjectWithVao, VertexData,
    VertexDataType,
};
use crate::device::{gl, GlContext, GLenum, GlesVersion};
use crate::error::{Error, Result};
use crate::glite_bail;
use crate::managed::Managed;
use super::shader_program::ShaderProgram;

/// Vertices plus optional 16-bit indices, drawable with a shader
#[derive(Debug)]
pub struct Mesh {
    ctx: GlContext,
    data_type: VertexDataType,
    vertices: Box<dyn VertexData>,
    indices: Box<dyn IndexData>,
    auto_bind: bool,
}

impl Mesh {
    /// Buffer-object mesh: VAO-backed vertices on GLES 3, a plain vertex
    /// buffer on GLES 2, indices in a fully re-uploaded index buffer
    pub fn new(
        ctx: &GlContext,
        is_static: bool,
        max_vertices: usize,
        max_indices: usize,
        attributes: VertexAttributes,
    ) -> Result<Self> {
        let (data_type, vertices): (VertexDataType, Box<dyn VertexData>) = match ctx.version() {
            GlesVersion::Gles3 => (
                VertexDataType::VertexBufferObjectWithVao,
                Box::new(VertexBufferObjectWithVao::new(ctx, is_static, max_vertices, attributes)?),
            ),
            GlesVersion::Gles2 => (
                VertexDataType::VertexBufferObject,
                Box::new(VertexBufferObject::new(ctx, is_static, max_vertices, attributes)),
            ),
        };

        Ok(Self {
            ctx: ctx.clone(),
            data_type,
            vertices,
            indices: Box::new(IndexBufferObject::new(ctx, is_static, max_indices)),
            auto_bind: true,
        })
    }

    /// Mesh with an explicit backend strategy
    ///
    /// `VertexBufferObjectWithVao` fails with `InvalidState` on GLES 2.
    pub fn with_type(
        ctx: &GlContext,
        data_type: VertexDataType,
        is_static: bool,
        max_vertices: usize,
        max_indices: usize,
        attributes: VertexAttributes,
    ) -> Result<Self> {
        let (vertices, indices): (Box<dyn VertexData>, Box<dyn IndexData>) = match data_type {
            VertexDataType::VertexArray => (
                Box::new(VertexArray::new(ctx, max_vertices, attributes)),
                Box::new(IndexArray::new(max_indices)),
            ),
            VertexDataType::VertexBufferObject => (
                Box::new(VertexBufferObject::new(ctx, is_static, max_vertices, attributes)),
                Box::new(IndexBufferObject::new(ctx, is_static, max_indices)),
            ),
            VertexDataType::VertexBufferObjectSubData => (
                Box::new(VertexBufferObjectSubData::new(ctx, is_static, max_vertices, attributes)),
                Box::new(IndexBufferObjectSubData::new(ctx, is_static, max_indices)),
            ),
            VertexDataType::VertexBufferObjectWithVao => (
                Box::new(VertexBufferObjectWithVao::new(ctx, is_static, max_vertices, attributes)?),
                Box::new(IndexBufferObjectSubData::new(ctx, is_static, max_indices)),
            ),
        };

        Ok(Self {
            ctx: ctx.clone(),
            data_type,
            vertices,
            indices,
            auto_bind: true,
        })
    }

    // ===== ACCESSORS =====

    pub fn vertex_data_type(&self) -> VertexDataType {
        self.data_type
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.num_vertices()
    }

    pub fn num_max_vertices(&self) -> usize {
        self.vertices.num_max_vertices()
    }

    pub fn num_indices(&self) -> usize {
        self.indices.num_indices()
    }

    pub fn num_max_indices(&self) -> usize {
        self.indices.num_max_indices()
    }

    /// Vertex stride in bytes
    pub fn vertex_size(&self) -> usize {
        self.vertices.attributes().vertex_size()
    }

    pub fn vertex_attributes(&self) -> &VertexAttributes {
        self.vertices.attributes()
    }

    pub fn vertex_attribute(&self, alias: &str) -> Option<&VertexAttribute> {
        self.vertices.attributes().find_by_alias(alias)
    }

    pub fn auto_bind(&self) -> bool {
        self.auto_bind
    }

    /// Whether `render_range` and `render_all` bind and unbind around the draw
    pub fn set_auto_bind(&mut self, auto_bind: bool) {
        self.auto_bind = auto_bind;
    }

    // ===== VERTICES =====

    pub fn set_vertices(&mut self, vertices: &[f32]) -> Result<()> {
        self.vertices.set_vertices(vertices, 0, vertices.len())
    }

    pub fn set_vertices_range(&mut self, vertices: &[f32], offset: usize, count: usize) -> Result<()> {
        self.vertices.set_vertices(vertices, offset, count)
    }

    /// Overwrite defined vertex data starting at float `target_offset`
    pub fn update_vertices(&mut self, target_offset: usize, vertices: &[f32]) -> Result<()> {
        self.vertices.update_vertices(target_offset, vertices, 0, vertices.len())
    }

    pub fn update_vertices_range(
        &mut self,
        target_offset: usize,
        vertices: &[f32],
        source_offset: usize,
        count: usize,
    ) -> Result<()> {
        self.vertices.update_vertices(target_offset, vertices, source_offset, count)
    }

    /// Copy defined vertex data into `dest`, as much as fits
    pub fn get_vertices(&self, dest: &mut [f32]) -> Result<usize> {
        self.get_vertices_range(0, None, dest, 0)
    }

    pub fn get_vertices_from(&self, source_offset: usize, dest: &mut [f32]) -> Result<usize> {
        self.get_vertices_range(source_offset, None, dest, 0)
    }

    /// Copy `count` floats from `source_offset` into `dest` at `dest_offset`
    ///
    /// `None` copies the rest of the defined data, clamped to the room left
    /// in `dest`. An explicit count that does not fit either side fails, and
    /// so does a copy that resolves to zero floats.
    /// Returns the number of floats copied.
    pub fn get_vertices_range(
        &self,
        source_offset: usize,
        count: Option<usize>,
        dest: &mut [f32],
        dest_offset: usize,
    ) -> Result<usize> {
        let copied = copy_out(self.vertices.vertices(), source_offset, count, dest, dest_offset, true)?;
        if copied == 0 {
            glite_bail!(
                "glite::Mesh",
                Error::OutOfRange,
                "No vertices to copy from offset {} into {} floats at {}",
                source_offset,
                dest.len(),
                dest_offset
            );
        }
        Ok(copied)
    }

    // ===== INDICES =====

    pub fn set_indices(&mut self, indices: &[u16]) -> Result<()> {
        self.indices.set_indices(indices, 0, indices.len())
    }

    pub fn set_indices_range(&mut self, indices: &[u16], offset: usize, count: usize) -> Result<()> {
        self.indices.set_indices(indices, offset, count)
    }

    pub fn update_indices(&mut self, target_offset: usize, indices: &[u16]) -> Result<()> {
        self.indices.update_indices(target_offset, indices, 0, indices.len())
    }

    pub fn update_indices_range(
        &mut self,
        target_offset: usize,
        indices: &[u16],
        source_offset: usize,
        count: usize,
    ) -> Result<()> {
        self.indices.update_indices(target_offset, indices, source_offset, count)
    }

    pub fn get_indices(&self, dest: &mut [u16]) -> Result<usize> {
        self.get_indices_range(0, None, dest, 0)
    }

    pub fn get_indices_from(&self, source_offset: usize, dest: &mut [u16]) -> Result<usize> {
        self.get_indices_range(source_offset, None, dest, 0)
    }

    /// Copy `count` indices from `source_offset` into `dest` at `dest_offset`
    ///
    /// `None` copies the rest of the defined indices; `dest` must hold them.
    pub fn get_indices_range(
        &self,
        source_offset: usize,
        count: Option<usize>,
        dest: &mut [u16],
        dest_offset: usize,
    ) -> Result<usize> {
        copy_out(self.indices.indices(), source_offset, count, dest, dest_offset, false)
    }

    // ===== BINDING =====

    /// Bind the vertices, and the indices when any are defined
    pub fn bind(&mut self, shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) -> Result<()> {
        self.vertices.bind(shader, locations)?;
        if self.indices.num_indices() > 0 {
            self.indices.bind()?;
        }
        Ok(())
    }

    pub fn unbind(&mut self, shader: Option<&mut ShaderProgram>, locations: Option<&[i32]>) {
        self.vertices.unbind(shader, locations);
        if self.indices.num_indices() > 0 {
            self.indices.unbind();
        }
    }

    // ===== DRAWING =====

    /// Draw every defined index, or every vertex when there are none
    pub fn render_all(&mut self, shader: Option<&mut ShaderProgram>, primitive: GLenum) -> Result<()> {
        let count = match self.indices.num_indices() {
            0 => self.vertices.num_vertices(),
            indices => indices,
        };
        self.render(shader, primitive, 0, count, self.auto_bind)
    }

    /// Draw a range using the mesh's auto-bind setting
    pub fn render_range(
        &mut self,
        shader: Option<&mut ShaderProgram>,
        primitive: GLenum,
        offset: usize,
        count: usize,
    ) -> Result<()> {
        self.render(shader, primitive, offset, count, self.auto_bind)
    }

    /// Draw `count` elements starting at `offset`
    ///
    /// Indices are used when any are defined, otherwise the range addresses
    /// vertices. An index range past the index capacity fails with
    /// `OutOfRange` before anything is bound. A zero count draws nothing.
    pub fn render(
        &mut self,
        mut shader: Option<&mut ShaderProgram>,
        primitive: GLenum,
        offset: usize,
        count: usize,
        auto_bind: bool,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        let num_indices = self.indices.num_indices();
        let client_memory = self.data_type == VertexDataType::VertexArray;
        if num_indices > 0 {
            // Client indices are read straight from the defined range
            let limit = if client_memory { num_indices } else { self.indices.num_max_indices() };
            if offset.checked_add(count).map_or(true, |end| end > limit) {
                glite_bail!(
                    "glite::Mesh",
                    Error::OutOfRange,
                    "Index range {}+{} exceeds the {} available indices",
                    offset,
                    count,
                    limit
                );
            }
        }

        if auto_bind {
            self.bind(shader.as_deref_mut(), None)?;
        }

        if num_indices > 0 {
            if client_memory {
                let indices: &[u8] = bytemuck::cast_slice(&self.indices.indices()[offset..offset + count]);
                self.ctx
                    .device()
                    .draw_elements_client(primitive, count as i32, gl::UNSIGNED_SHORT, indices);
            } else {
                self.ctx.device().draw_elements(
                    primitive,
                    count as i32,
                    gl::UNSIGNED_SHORT,
                    offset * std::mem::size_of::<u16>(),
                );
            }
        } else {
            self.ctx.device().draw_arrays(primitive, offset as i32, count as i32);
        }
        self.ctx.check_error("Mesh render");

        if auto_bind {
            self.unbind(shader, None);
        }
        Ok(())
    }

    /// Release both backends; idempotent
    pub fn dispose(&mut self) {
        self.vertices.dispose();
        self.indices.dispose();
    }
}

impl Managed for Mesh {
    fn invalidate(&mut self) -> Result<()> {
        self.vertices.invalidate();
        self.indices.invalidate();
        Ok(())
    }
}

/// Bounds-checked copy of `source[source_offset..]` into `dest[dest_offset..]`
fn copy_out<T: Copy>(
    source: &[T],
    source_offset: usize,
    count: Option<usize>,
    dest: &mut [T],
    dest_offset: usize,
    clamp_to_dest: bool,
) -> Result<usize> {
    if source_offset > source.len() || dest_offset > dest.len() {
        glite_bail!(
            "glite::Mesh",
            Error::OutOfRange,
            "Offsets {} (source of {}) / {} (destination of {}) out of range",
            source_offset,
            source.len(),
            dest_offset,
            dest.len()
        );
    }

    let room = dest.len() - dest_offset;
    let count = match count {
        Some(count) => count,
        None if clamp_to_dest => (source.len() - source_offset).min(room),
        None => source.len() - source_offset,
    };

    if source_offset.checked_add(count).map_or(true, |end| end > source.len()) || count > room {
        glite_bail!(
            "glite::Mesh",
            Error::OutOfRange,
            "Copy of {} elements from {} does not fit (source of {}, room for {})",
            count,
            source_offset,
            source.len(),
            room
        );
    }

    dest[dest_offset..dest_offset + count].copy_from_slice(&source[source_offset..source_offset + count]);
    Ok(count)
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
