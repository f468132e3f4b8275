//! Compatibility adapter between this crate's buffer types and the `image` crate.
//!
//! Gated behind the `image_compat` feature; the core never depends on `image`
//! for its own pipeline.

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::framebuffer::Framebuffer;
use crate::texture::TextureView;

/// Copies a rendered framebuffer into an owned `image::RgbaImage`.
pub fn framebuffer_to_image(framebuffer: &Framebuffer) -> Option<RgbaImage> {
    ImageBuffer::<Rgba<u8>, _>::from_raw(framebuffer.width(), framebuffer.height(), framebuffer.bytes().to_vec())
}

/// Borrows a decoded `image::RgbaImage` as a [`TextureView`] without copying pixels.
pub fn image_as_texture_view(image: &RgbaImage) -> TextureView<'_> {
    TextureView::new(image.width(), image.height(), image.as_raw())
}
