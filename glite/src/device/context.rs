//! Shared GL context handle, context configuration and the handle allocator
//!
//! Every GPU resource keeps a [`GlContext`] clone and issues its driver calls
//! through it. Lock guards returned by [`GlContext::device`] must not outlive
//! the statement that takes them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{gl, GlDevice, GLenum, Handle};
use crate::{glite_error, glite_trace, glite_warn};

/// GLES API level of the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GlesVersion {
    /// OpenGL ES 2.0
    Gles2,
    /// OpenGL ES 3.0 (vertex array objects, MRT, depth/stencil textures)
    Gles3,
}

/// Context configuration, supplied once when the context is created
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Framebuffer bound when rendering to the surface (non-zero on some platforms)
    pub default_framebuffer: Handle,
    /// API level
    pub version: GlesVersion,
    /// Drain and log `get_error` after checked operations
    pub check_errors: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_framebuffer: 0,
            version: GlesVersion::Gles3,
            check_errors: cfg!(debug_assertions),
        }
    }
}

/// Kind of GPU object managed by the handle allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Buffer,
    Texture,
    Framebuffer,
    Renderbuffer,
    VertexArray,
}

impl HandleKind {
    fn name(self) -> &'static str {
        match self {
            HandleKind::Buffer => "buffer",
            HandleKind::Texture => "texture",
            HandleKind::Framebuffer => "framebuffer",
            HandleKind::Renderbuffer => "renderbuffer",
            HandleKind::VertexArray => "vertex array",
        }
    }
}

/// Cloneable handle on the active GL context
#[derive(Clone)]
pub struct GlContext {
    device: Arc<Mutex<dyn GlDevice>>,
    config: Arc<ContextConfig>,
}

impl GlContext {
    /// Wrap a driver
    pub fn new<D: GlDevice + 'static>(device: D, config: ContextConfig) -> Self {
        Self {
            device: Arc::new(Mutex::new(device)),
            config: Arc::new(config),
        }
    }

    /// Wrap a driver that is also referenced elsewhere
    pub fn from_shared(device: Arc<Mutex<dyn GlDevice>>, config: ContextConfig) -> Self {
        Self {
            device,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn version(&self) -> GlesVersion {
        self.config.version
    }

    pub fn default_framebuffer(&self) -> Handle {
        self.config.default_framebuffer
    }

    /// Lock the driver for one call sequence
    ///
    /// A poisoned lock is recovered: the driver keeps no invariants a panic
    /// on another call could break.
    pub fn device(&self) -> MutexGuard<'_, dyn GlDevice + 'static> {
        self.device.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate a GPU object name
    ///
    /// A zero result is logged and returned as-is; later calls on the zero
    /// handle fail at the driver.
    pub fn allocate(&self, kind: HandleKind) -> Handle {
        let handle = {
            let mut device = self.device();
            match kind {
                HandleKind::Buffer => device.gen_buffer(),
                HandleKind::Texture => device.gen_texture(),
                HandleKind::Framebuffer => device.gen_framebuffer(),
                HandleKind::Renderbuffer => device.gen_renderbuffer(),
                HandleKind::VertexArray => device.gen_vertex_array(),
            }
        };

        if handle == 0 {
            glite_error!("glite::Device", "Failed to allocate {} handle", kind.name());
        } else {
            glite_trace!("glite::Device", "Allocated {} {}", kind.name(), handle);
        }
        handle
    }

    /// Delete a GPU object name; no-op on zero
    pub fn release(&self, kind: HandleKind, handle: Handle) {
        if handle == 0 {
            return;
        }

        let mut device = self.device();
        match kind {
            HandleKind::Buffer => device.delete_buffer(handle),
            HandleKind::Texture => device.delete_texture(handle),
            HandleKind::Framebuffer => device.delete_framebuffer(handle),
            HandleKind::Renderbuffer => device.delete_renderbuffer(handle),
            HandleKind::VertexArray => device.delete_vertex_array(handle),
        }
    }

    /// Drain pending driver errors and log them; returns the first one
    ///
    /// Does nothing unless `ContextConfig::check_errors` is set.
    pub fn check_error(&self, operation: &str) -> Option<GLenum> {
        if !self.config.check_errors {
            return None;
        }

        let mut first = None;
        loop {
            let code = self.device().get_error();
            if code == gl::NO_ERROR {
                break;
            }
            glite_warn!(
                "glite::Device",
                "{} (0x{:04X}) after {}",
                gl::error_name(code),
                code,
                operation
            );
            first.get_or_insert(code);
        }
        first
    }
}

impl std::fmt::Debug for GlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlContext").field("config", &self.config).finish()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
