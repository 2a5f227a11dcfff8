/// Texture module - GPU texture base, texture data sources, 2D textures and cube maps

// Module declarations
pub mod pixmap;
pub mod texture_data;
pub mod gl_texture;
pub mod texture;
pub mod cubemap;

// Re-export texture types
pub use pixmap::*;
pub use texture_data::*;
pub use gl_texture::*;
pub use texture::*;
pub use cubemap::*;
