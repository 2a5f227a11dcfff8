//! Context-loss recovery capability
//!
//! A context loss destroys every GPU object at once. The platform layer that
//! detects it calls [`Managed::invalidate`] on each live resource; the
//! resource then rebuilds its GPU copy from retained CPU-side state, either
//! immediately or on next use.

use crate::error::Result;

/// A GPU resource that can reconstruct itself after a context loss
pub trait Managed {
    /// Forget GPU handles made stale by a context loss and rebuild
    fn invalidate(&mut self) -> Result<()>;
}
