use crate::{
    effects::composite::over,
    foundation::core::{PixelRect, Rgba8},
    foundation::error::{BacktextError, BacktextResult},
    foundation::math::{mul_div255_u8, unpremul_channel},
    raster::blur,
};

/// Owned straight-alpha RGBA8 pixel buffer, row-major and tightly packed.
///
/// Dimensions are fixed at allocation. `has_alpha` records whether the pixels came from a
/// source with a meaningful alpha channel; decoded RGB images carry `false` and are filled
/// with opaque alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
    has_alpha: bool,
}

impl Canvas {
    /// Allocate a fully transparent canvas.
    pub fn new(width: u32, height: u32) -> BacktextResult<Self> {
        Self::filled(width, height, Rgba8::TRANSPARENT)
    }

    /// Allocate a canvas where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> BacktextResult<Self> {
        let len = buffer_len(width, height)?;
        let mut data = try_alloc(len)?;
        data.resize(len, 0);
        if color != Rgba8::TRANSPARENT {
            let px = color.to_array();
            for chunk in data.chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
        }
        Ok(Self {
            width,
            height,
            data,
            has_alpha: true,
        })
    }

    /// Wrap an existing straight RGBA8 buffer.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> BacktextResult<Self> {
        let len = buffer_len(width, height)?;
        if data.len() != len {
            return Err(BacktextError::input(format!(
                "rgba buffer has {} bytes, expected {len} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            has_alpha: true,
        })
    }

    /// Wrap an `image` RGBA buffer.
    pub fn from_image(img: image::RgbaImage, has_alpha: bool) -> BacktextResult<Self> {
        let (width, height) = img.dimensions();
        let mut canvas = Self::from_rgba8(width, height, img.into_raw())?;
        canvas.has_alpha = has_alpha;
        Ok(canvas)
    }

    /// Copy into an `image` RGBA buffer.
    pub fn to_image(&self) -> BacktextResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| BacktextError::resource("canvas buffer does not match its dimensions"))
    }

    /// Independent copy whose allocation failure is reported instead of aborting.
    pub fn try_clone(&self) -> BacktextResult<Self> {
        let mut data = try_alloc(self.data.len())?;
        data.extend_from_slice(&self.data);
        Ok(Self { data, ..*self })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the source carried a meaningful alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub(crate) fn set_has_alpha(&mut self, has_alpha: bool) {
        self.has_alpha = has_alpha;
    }

    /// Whole canvas as a rectangle.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Raw bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw bytes.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: i64, y: i64) -> Option<Rgba8> {
        let i = self.index(x, y)?;
        Some(Rgba8::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    /// Overwrite the pixel at `(x, y)`; writes outside the canvas are dropped.
    pub fn put_pixel(&mut self, x: i64, y: i64, color: Rgba8) {
        if let Some(i) = self.index(x, y) {
            self.data[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Alpha-over `color` onto the pixel at `(x, y)`; writes outside the canvas are dropped.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba8) {
        if let Some(i) = self.index(x, y) {
            let d = [
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ];
            let out = over(d, color.to_array());
            self.data[i..i + 4].copy_from_slice(&out);
        }
    }

    /// Pixels of `rect` (clipped to the canvas), row by row.
    pub fn region_pixels(&self, rect: PixelRect) -> impl Iterator<Item = [u8; 4]> + '_ {
        let rect = rect.clip_to(self.width, self.height);
        let stride = self.width as usize * 4;
        let data = self.data.as_slice();
        let (x0, x1) = (rect.x as usize * 4, (rect.x as usize + rect.width as usize) * 4);
        (rect.y as usize..rect.y as usize + rect.height as usize).flat_map(move |y| {
            data[y * stride + x0..y * stride + x1]
                .chunks_exact(4)
                .map(|px| [px[0], px[1], px[2], px[3]])
        })
    }

    /// Copy of `rect` (clipped to the canvas) as a new canvas.
    pub fn region(&self, rect: PixelRect) -> BacktextResult<Self> {
        let rect = rect.clip_to(self.width, self.height);
        if rect.is_empty() {
            return Err(BacktextError::input("region lies outside the canvas"));
        }
        let mut data = try_alloc(buffer_len(rect.width, rect.height)?)?;
        data.extend(self.region_pixels(rect).flatten());
        Ok(Self {
            width: rect.width,
            height: rect.height,
            data,
            has_alpha: self.has_alpha,
        })
    }

    /// Overwrite pixels with `src` placed at `(x, y)`; parts outside the canvas are dropped.
    pub fn put_region(&mut self, src: &Canvas, x: i32, y: i32) {
        self.copy_from(src, x, y, |_, s| s);
    }

    /// Alpha-over `src` placed at `(x, y)`, using `src`'s own alpha as the paste mask.
    pub fn paste_masked(&mut self, src: &Canvas, x: i32, y: i32) {
        self.copy_from(src, x, y, over);
    }

    fn copy_from(
        &mut self,
        src: &Canvas,
        x: i32,
        y: i32,
        op: impl Fn([u8; 4], [u8; 4]) -> [u8; 4],
    ) {
        let target = PixelRect::new(x, y, src.width, src.height).clip_to(self.width, self.height);
        for ty in target.y..target.y + target.height as i32 {
            for tx in target.x..target.x + target.width as i32 {
                let (Some(di), Some(si)) = (
                    self.index(i64::from(tx), i64::from(ty)),
                    src.index(i64::from(tx - x), i64::from(ty - y)),
                ) else {
                    continue;
                };
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                let s = [
                    src.data[si],
                    src.data[si + 1],
                    src.data[si + 2],
                    src.data[si + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&op(d, s));
            }
        }
    }

    /// Gaussian-blur the pixels inside `rect` with standard deviation `sigma`.
    ///
    /// Blurring happens on premultiplied values so transparent pixels do not bleed black into
    /// colored edges. A non-positive `sigma` leaves the canvas untouched.
    pub fn blur_region(&mut self, rect: PixelRect, sigma: f32) -> BacktextResult<()> {
        blur::blur_region(self, rect, sigma)
    }

    /// Gaussian-blur the whole canvas.
    pub fn blur(&mut self, sigma: f32) -> BacktextResult<()> {
        self.blur_region(self.bounds(), sigma)
    }

    /// Multiply the alpha of every pixel inside `rect` by `factor` (clamped to `[0, 1]`).
    pub fn scale_alpha(&mut self, rect: PixelRect, factor: f32) {
        let factor = crate::foundation::core::clamp_unit(factor);
        if factor >= 1.0 {
            return;
        }
        let rect = rect.clip_to(self.width, self.height);
        let stride = self.width as usize * 4;
        for y in rect.y as usize..rect.y as usize + rect.height as usize {
            let start = y * stride + rect.x as usize * 4;
            let end = start + rect.width as usize * 4;
            for px in self.data[start..end].chunks_exact_mut(4) {
                px[3] = (f32::from(px[3]) * factor).round() as u8;
            }
        }
    }

    /// Resample to `width`x`height` with a Lanczos3 filter.
    pub fn resized(&self, width: u32, height: u32) -> BacktextResult<Self> {
        if width == 0 || height == 0 {
            return Err(BacktextError::input("resize target must be non-empty"));
        }
        if (width, height) == self.size() {
            return self.try_clone();
        }

        let mut premul = self.data.clone();
        premultiply_in_place(&mut premul);
        let src = image::RgbaImage::from_raw(self.width, self.height, premul)
            .ok_or_else(|| BacktextError::resource("canvas buffer does not match its dimensions"))?;
        let out = image::imageops::resize(&src, width, height, image::imageops::FilterType::Lanczos3);
        let mut data = out.into_raw();
        unpremultiply_in_place(&mut data);
        Ok(Self {
            width,
            height,
            data,
            has_alpha: self.has_alpha,
        })
    }
}

fn buffer_len(width: u32, height: u32) -> BacktextResult<usize> {
    if width == 0 || height == 0 {
        return Err(BacktextError::input(format!(
            "canvas dimensions must be > 0 (got {width}x{height})"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| BacktextError::resource(format!("canvas {width}x{height} overflows memory")))
}

fn try_alloc(len: usize) -> BacktextResult<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|e| {
        BacktextError::resource(format!("failed to allocate {len} byte pixel buffer: {e}"))
    })?;
    Ok(data)
}

fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        for c in &mut px[..3] {
            *c = unpremul_channel(*c, a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/canvas.rs"]
mod tests;
