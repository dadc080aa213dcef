use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::{BacktextError, BacktextResult},
    raster::canvas::Canvas,
};

/// Decode PNG/JPEG/WebP/... bytes into a straight-alpha canvas.
///
/// Sources without an alpha channel are marked `has_alpha = false` and filled opaque.
pub fn decode_image(bytes: &[u8]) -> BacktextResult<Canvas> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| BacktextError::resource(format!("{e:#}")))?;
    let has_alpha = dyn_img.color().has_alpha();
    Canvas::from_image(dyn_img.to_rgba8(), has_alpha)
}

/// Encode a canvas as PNG. RGB-only canvases are written without an alpha channel.
pub fn encode_png(canvas: &Canvas) -> BacktextResult<Vec<u8>> {
    let rgba = canvas.to_image()?;
    let img = if canvas.has_alpha() {
        image::DynamicImage::ImageRgba8(rgba)
    } else {
        image::DynamicImage::ImageRgb8(image::DynamicImage::ImageRgba8(rgba).to_rgb8())
    };
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")
        .map_err(|e| BacktextError::resource(format!("{e:#}")))?;
    Ok(buf)
}

/// Read and decode an image file.
pub async fn load_image(path: &Path) -> BacktextResult<Canvas> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read image {}", path.display()))
        .map_err(|e| BacktextError::io(format!("{e:#}")))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
