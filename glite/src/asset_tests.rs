//! Unit tests for asset.rs

use crate::asset::{AssetLoader, FileLocation, MemoryAssetLoader};
use crate::error::Error;
use crate::texture::{PixelFormat, Pixmap};

#[test]
fn test_memory_loader_images_by_location() {
    let loader = MemoryAssetLoader::new();
    loader.insert_image("sky.png", FileLocation::Internal, Pixmap::blank(2, 2, PixelFormat::Rgb888));

    assert!(loader.load_image("sky.png", FileLocation::Internal).is_some());
    assert!(loader.load_image("sky.png", FileLocation::External).is_none());
    assert!(loader.load_image("sea.png", FileLocation::Internal).is_none());
    assert_eq!(loader.image_loads(), 3);
}

#[test]
fn test_memory_loader_texts() {
    let loader = MemoryAssetLoader::new();
    loader.insert_text("basic.vert", FileLocation::Internal, "void main() {}");

    assert_eq!(loader.load_text("basic.vert", FileLocation::Internal).unwrap(), "void main() {}");
    assert!(matches!(
        loader.load_text("basic.frag", FileLocation::Internal),
        Err(Error::AssetNotFound(msg)) if msg.contains("basic.frag")
    ));
}
