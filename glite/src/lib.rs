/*!
# glite

GPU resource lifecycle layer for OpenGL ES 2.0 / 3.0.

glite owns the GPU objects an application creates (textures, cube maps,
vertex and index buffers, shader programs, framebuffers) and keeps enough
CPU-side state to rebuild every one of them after the GL context is lost.

## Architecture

- **GlDevice**: driver boundary trait, one method per GL entry point used
- **GlContext**: cloneable handle on the active driver and handle allocator
- **Managed**: context-loss recovery capability implemented by every resource
- **Texture / Cubemap**: 2D and cube textures fed by `TextureData` sources
- **VertexData / IndexData**: interchangeable vertex and index backends
- **Mesh**: vertex + index pairing with draw entry points
- **ShaderProgram**: compile, link and variable lookup
- **FrameBuffer**: offscreen render targets with multiple attachments
- **Camera**: perspective and orthographic view/projection math

The platform layer supplies the `GlDevice` implementation and an
`AssetLoader`; glite never calls GL or decodes files on its own.
*/

// Internal modules
mod error;
pub mod log;
pub mod device;
pub mod asset;
pub mod managed;
pub mod texture;
pub mod buffer;
pub mod resource;
pub mod camera;

// Main glite namespace module
pub mod glite {
    // Error types
    pub use crate::error::{Error, FramebufferStatus, Result};

    // Driver boundary
    pub use crate::device::{ContextConfig, GlContext, GlDevice, GlesVersion, Handle, HandleKind};

    // Context-loss recovery
    pub use crate::managed::Managed;

    // Asset collaborator
    pub use crate::asset::{AssetLoader, FileLocation, MemoryAssetLoader};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger, log, log_detailed};
    }

    // Texture sub-module
    pub mod texture {
        pub use crate::texture::*;
    }

    // Buffer sub-module
    pub mod buffer {
        pub use crate::buffer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }
}

// Re-export error types at crate root
pub use error::{Error, FramebufferStatus, Result};

// Re-export math library at crate root
pub use glam;
