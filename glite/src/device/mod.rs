/// Device module - GL driver boundary, context handle and handle allocator

/// GPU object name (0 = not allocated / released)
pub type Handle = u32;

/// GL enumerant
pub type GLenum = u32;

// Module declarations
pub mod gl;
pub mod gl_device;
pub mod context;

// Re-export driver boundary types
pub use gl_device::*;
pub use context::*;

// Mock GL device for tests (no GPU required)
#[cfg(test)]
pub mod mock_gl_device;
