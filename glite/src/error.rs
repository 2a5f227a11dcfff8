//! Error types for glite
//!
//! Programmer-contract violations (consuming unprepared texture data, mutating
//! a bound buffer, out-of-range copies) and driver failures that must be
//! surfaced (framebuffer incompleteness) are reported through [`Error`].
//! Allocation failures and GL errors are logged, not returned.

use std::fmt;

/// Result type for glite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Framebuffer completeness status reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// An attachment is not attachment-complete
    IncompleteAttachment,
    /// Attachments do not all have the same width and height
    IncompleteDimensions,
    /// No image is attached to the framebuffer
    MissingAttachment,
    /// The combination of internal formats is not supported
    Unsupported,
    /// Any other status code
    Unknown(u32),
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramebufferStatus::IncompleteAttachment => write!(f, "incomplete attachment"),
            FramebufferStatus::IncompleteDimensions => write!(f, "incomplete dimensions"),
            FramebufferStatus::MissingAttachment => write!(f, "missing attachment"),
            FramebufferStatus::Unsupported => write!(f, "unsupported combination of formats"),
            FramebufferStatus::Unknown(code) => write!(f, "unknown error 0x{:04X}", code),
        }
    }
}

/// glite errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (driver, platform)
    BackendError(String),

    /// Invalid resource (disposed handle, failed shader program, etc.)
    InvalidResource(String),

    /// Initialization failed
    InitializationFailed(String),

    /// Operation not allowed in the current state (programmer contract violation)
    InvalidState(String),

    /// Range does not fit the buffer it addresses
    OutOfRange(String),

    /// Framebuffer could not be constructed
    FramebufferIncomplete(FramebufferStatus),

    /// Asset could not be located by the asset loader
    AssetNotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            Error::FramebufferIncomplete(status) => {
                write!(f, "Frame buffer couldn't be constructed: {}", status)
            }
            Error::AssetNotFound(path) => write!(f, "Asset not found: {}", path),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
