/// Resource module - shader programs, meshes and offscreen framebuffers

// Module declarations
pub mod shader_program;
pub mod mesh;
pub mod frame_buffer;

// Re-export resource types
pub use shader_program::{ProgramState, ShaderConfig, ShaderProgram, VariableInfo, VariableRef};
pub use mesh::Mesh;
pub use frame_buffer::{
    AttachmentFlags, FrameBuffer, FrameBufferBuilder,
    RenderBufferSpec, TextureAttachmentSpec,
};
