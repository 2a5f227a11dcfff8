/// Buffer module - vertex layouts and the vertex/index backends that feed draw calls

// Module declarations
mod host_buffer;
pub mod vertex_attribute;
pub mod vertex_data;
pub mod vertex_array;
pub mod vertex_buffer_object;
pub mod vertex_buffer_object_sub_data;
pub mod vertex_buffer_object_with_vao;
pub mod index_array;
pub mod index_buffer_object;
pub mod index_buffer_object_sub_data;

// Re-export buffer types
pub use vertex_attribute::*;
pub use vertex_data::{IndexData, VertexData, VertexDataType};
pub use vertex_array::VertexArray;
pub use vertex_buffer_object::VertexBufferObject;
pub use vertex_buffer_object_sub_data::VertexBufferObjectSubData;
pub use vertex_buffer_object_with_vao::VertexBufferObjectWithVao;
pub use index_array::IndexArray;
pub use index_buffer_object::IndexBufferObject;
pub use index_buffer_object_sub_data::IndexBufferObjectSubData;
