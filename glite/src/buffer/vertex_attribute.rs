//! Vertex layout: attribute descriptors and the ordered collection that
//! assigns their byte offsets
//!
//! Attributes reach shader inputs by alias name. The aliases below are the
//! ones the built-in constructors use.

use crate::device::{gl, GLenum};
use crate::error::{Error, Result};
use crate::glite_bail;

/// `vec3`/`vec4` position input
pub const POSITION_ATTRIBUTE: &str = "a_position";
pub const NORMAL_ATTRIBUTE: &str = "a_normal";
pub const COLOR_ATTRIBUTE: &str = "a_color";
/// Texture coordinates; the unit index is appended (`a_texCoord0`)
pub const TEXCOORD_ATTRIBUTE: &str = "a_texCoord";
pub const TANGENT_ATTRIBUTE: &str = "a_tangent";
pub const BINORMAL_ATTRIBUTE: &str = "a_binormal";
/// Bone weights; the unit index is appended (`a_boneWeight0`)
pub const BONEWEIGHT_ATTRIBUTE: &str = "a_boneWeight";

// ============================================================================
// VERTEX ATTRIBUTE
// ============================================================================

/// One per-vertex input
#[derive(Debug, Clone)]
pub struct VertexAttribute {
    /// Components per vertex (1-4)
    pub num_components: i32,
    /// Fixed-point values are normalized to [0, 1] / [-1, 1]
    pub normalized: bool,
    /// Component type (FLOAT, UNSIGNED_BYTE, ...)
    pub data_type: GLenum,
    /// Byte offset in the vertex, assigned by [`VertexAttributes`]
    pub offset: usize,
    /// Shader input name
    pub alias: String,
    /// Texture / bone unit
    pub unit: u32,
}

impl VertexAttribute {
    pub fn new(num_components: i32, data_type: GLenum, normalized: bool, alias: impl Into<String>) -> Self {
        Self::with_unit(num_components, data_type, normalized, alias, 0)
    }

    pub fn with_unit(
        num_components: i32,
        data_type: GLenum,
        normalized: bool,
        alias: impl Into<String>,
        unit: u32,
    ) -> Self {
        Self {
            num_components,
            normalized,
            data_type,
            offset: 0,
            alias: alias.into(),
            unit,
        }
    }

    /// 3 floats
    pub fn position() -> Self {
        Self::new(3, gl::FLOAT, false, POSITION_ATTRIBUTE)
    }

    /// 2 floats, alias `a_texCoord{unit}`
    pub fn tex_coords(unit: u32) -> Self {
        Self::with_unit(2, gl::FLOAT, false, format!("{}{}", TEXCOORD_ATTRIBUTE, unit), unit)
    }

    /// 3 floats
    pub fn normal() -> Self {
        Self::new(3, gl::FLOAT, false, NORMAL_ATTRIBUTE)
    }

    /// RGBA packed in 4 normalized unsigned bytes
    pub fn color_packed() -> Self {
        Self::new(4, gl::UNSIGNED_BYTE, true, COLOR_ATTRIBUTE)
    }

    /// RGBA as 4 floats
    pub fn color_unpacked() -> Self {
        Self::new(4, gl::FLOAT, false, COLOR_ATTRIBUTE)
    }

    pub fn tangent() -> Self {
        Self::new(3, gl::FLOAT, false, TANGENT_ATTRIBUTE)
    }

    pub fn binormal() -> Self {
        Self::new(3, gl::FLOAT, false, BINORMAL_ATTRIBUTE)
    }

    /// Bone index + weight as 2 floats, alias `a_boneWeight{unit}`
    pub fn bone_weight(unit: u32) -> Self {
        Self::with_unit(2, gl::FLOAT, false, format!("{}{}", BONEWEIGHT_ATTRIBUTE, unit), unit)
    }

    /// Bytes taken in one vertex; 0 for an unknown component type
    pub fn size_in_bytes(&self) -> usize {
        let components = self.num_components.max(0) as usize;
        match self.data_type {
            gl::FLOAT | gl::FIXED => 4 * components,
            gl::UNSIGNED_BYTE | gl::BYTE => components,
            gl::UNSIGNED_SHORT | gl::SHORT => 2 * components,
            _ => 0,
        }
    }
}

/// Equal when the layout semantics match; the offset is not compared
impl PartialEq for VertexAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.num_components == other.num_components
            && self.data_type == other.data_type
            && self.normalized == other.normalized
            && self.alias == other.alias
            && self.unit == other.unit
    }
}

impl Eq for VertexAttribute {}

// ============================================================================
// VERTEX ATTRIBUTES
// ============================================================================

/// Ordered vertex layout with offsets and stride
///
/// Offsets are assigned once here and never change afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttributes {
    attributes: Vec<VertexAttribute>,
    vertex_size: usize,
}

impl VertexAttributes {
    /// Lay out `attributes` in order
    ///
    /// Fails when the list is empty, when an attribute has an unknown
    /// component type, or when the stride is not a multiple of 4 bytes.
    pub fn new(attributes: Vec<VertexAttribute>) -> Result<Self> {
        if attributes.is_empty() {
            glite_bail!("glite::VertexAttributes", Error::InvalidResource, "Vertex layout has no attributes");
        }

        let mut attributes = attributes;
        let mut offset = 0;
        for attribute in attributes.iter_mut() {
            let size = attribute.size_in_bytes();
            if size == 0 {
                glite_bail!(
                    "glite::VertexAttributes",
                    Error::InvalidResource,
                    "Attribute {} has unsupported type 0x{:04X} or no components",
                    attribute.alias,
                    attribute.data_type
                );
            }
            attribute.offset = offset;
            offset += size;
        }

        if offset % 4 != 0 {
            glite_bail!(
                "glite::VertexAttributes",
                Error::InvalidResource,
                "Vertex size {} is not a multiple of 4 bytes",
                offset
            );
        }

        Ok(Self {
            attributes,
            vertex_size: offset,
        })
    }

    /// Stride in bytes
    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }

    /// Stride in 32-bit slots (the unit of vertex arrays)
    pub fn floats_per_vertex(&self) -> usize {
        self.vertex_size / 4
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VertexAttribute> {
        self.attributes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VertexAttribute> {
        self.attributes.iter()
    }

    /// First attribute with the given alias
    pub fn find_by_alias(&self, alias: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|attribute| attribute.alias == alias)
    }
}

impl<'a> IntoIterator for &'a VertexAttributes {
    type Item = &'a VertexAttribute;
    type IntoIter = std::slice::Iter<'a, VertexAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

#[cfg(test)]
#[path = "vertex_attribute_tests.rs"]
mod tests;
