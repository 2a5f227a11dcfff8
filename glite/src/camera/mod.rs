//! Camera module - perspective and orthographic cameras.
//!
//! Cameras are plain values owned by the caller and do not touch the GL
//! context.

mod camera;

pub use camera::{Camera, Projection};
