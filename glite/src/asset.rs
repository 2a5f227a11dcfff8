//! Asset loading collaborator
//!
//! glite never decodes files itself. Image decoding and shader text loading
//! are supplied by the platform through [`AssetLoader`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::glite_bail;
use crate::texture::Pixmap;

/// Where a path is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileLocation {
    /// Bundled with the application (assets)
    Internal,
    /// External storage
    External,
}

/// Platform asset loader
pub trait AssetLoader: Send + Sync {
    /// Decode an image; `None` when the file does not exist or cannot be decoded
    fn load_image(&self, path: &str, location: FileLocation) -> Option<Pixmap>;

    /// Load a text asset; `Error::AssetNotFound` when it does not exist
    fn load_text(&self, path: &str, location: FileLocation) -> Result<String>;
}

/// In-memory asset loader
///
/// Serves images and texts registered up front. Useful for embedded assets
/// and for driving the resource types without a file system.
#[derive(Default)]
pub struct MemoryAssetLoader {
    images: RwLock<FxHashMap<(FileLocation, String), Pixmap>>,
    texts: RwLock<FxHashMap<(FileLocation, String), String>>,
    image_loads: AtomicUsize,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_image(&self, path: impl Into<String>, location: FileLocation, pixmap: Pixmap) {
        if let Ok(mut images) = self.images.write() {
            images.insert((location, path.into()), pixmap);
        }
    }

    pub fn insert_text(&self, path: impl Into<String>, location: FileLocation, text: impl Into<String>) {
        if let Ok(mut texts) = self.texts.write() {
            texts.insert((location, path.into()), text.into());
        }
    }

    /// Number of `load_image` calls served so far (hits and misses)
    pub fn image_loads(&self) -> usize {
        self.image_loads.load(Ordering::Relaxed)
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_image(&self, path: &str, location: FileLocation) -> Option<Pixmap> {
        self.image_loads.fetch_add(1, Ordering::Relaxed);
        let images = self.images.read().ok()?;
        images.get(&(location, path.to_string())).cloned()
    }

    fn load_text(&self, path: &str, location: FileLocation) -> Result<String> {
        let found = self
            .texts
            .read()
            .ok()
            .and_then(|texts| texts.get(&(location, path.to_string())).cloned());
        match found {
            Some(text) => Ok(text),
            None => glite_bail!("glite::Asset", Error::AssetNotFound, "{} ({:?})", path, location),
        }
    }
}

#[cfg(test)]
#[path = "asset_tests.rs"]
mod tests;
