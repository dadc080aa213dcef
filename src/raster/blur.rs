//! Separable Gaussian blur applied in place to a rectangle of a [`Canvas`].
//!
//! The rectangle is premultiplied into one working buffer, convolved row by row and then
//! column by column through a single line of scratch, and written back as straight alpha.
//! Samples past the rectangle's edges repeat the nearest edge pixel.

use crate::{
    foundation::core::PixelRect,
    foundation::error::{BacktextError, BacktextResult},
    foundation::math::{mul_div255_u8, unpremul_channel},
    raster::canvas::Canvas,
};

const MAX_KERNEL_RADIUS: u32 = 256;
const ONE_Q16: u32 = 1 << 16;

type Px = [u8; 4];

/// Kernel half-width used for a Gaussian of standard deviation `sigma`.
pub fn kernel_radius(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil().min(MAX_KERNEL_RADIUS as f32) as u32
}

/// Normalized Gaussian taps in Q16, `2 * radius + 1` long. Taps always sum to exactly `1 << 16`.
#[derive(Debug)]
pub(crate) struct Kernel {
    taps: Vec<u32>,
}

impl Kernel {
    /// `None` when `sigma` yields an empty kernel.
    pub(crate) fn gaussian(sigma: f32) -> Option<Self> {
        let radius = kernel_radius(sigma);
        if radius == 0 {
            return None;
        }
        let two_s2 = 2.0 * f64::from(sigma).powi(2);
        let r = radius as i64;
        let raw: Vec<f64> = (-r..=r)
            .map(|d| (-((d * d) as f64) / two_s2).exp())
            .collect();
        let total: f64 = raw.iter().sum();

        let mut taps: Vec<u32> = raw
            .iter()
            .map(|w| (w / total * f64::from(ONE_Q16)).round() as u32)
            .collect();
        let sum: i64 = taps.iter().map(|&t| i64::from(t)).sum();
        let center = radius as usize;
        taps[center] = (i64::from(taps[center]) + i64::from(ONE_Q16) - sum).max(0) as u32;
        Some(Self { taps })
    }

    pub(crate) fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    pub(crate) fn taps(&self) -> &[u32] {
        &self.taps
    }

    /// Convolve `src` into `dst` (same length), clamping reads to the line ends.
    fn apply(&self, src: &[Px], dst: &mut [Px]) {
        let last = src.len() as isize - 1;
        let r = self.radius() as isize;
        for (i, out) in dst.iter_mut().enumerate() {
            let mut acc = [0u64; 4];
            for (k, &w) in self.taps().iter().enumerate() {
                let j = (i as isize + k as isize - r).clamp(0, last) as usize;
                for (a, &c) in acc.iter_mut().zip(&src[j]) {
                    *a += u64::from(w) * u64::from(c);
                }
            }
            *out = acc.map(|a| ((a + u64::from(ONE_Q16 / 2)) >> 16).min(255) as u8);
        }
    }
}

/// Blur the pixels of `canvas` inside `rect` with standard deviation `sigma`.
///
/// Pixels outside `rect` are neither read nor written. A non-positive `sigma` is a no-op.
pub(crate) fn blur_region(canvas: &mut Canvas, rect: PixelRect, sigma: f32) -> BacktextResult<()> {
    let rect = rect.clip_to(canvas.width(), canvas.height());
    let Some(kernel) = Kernel::gaussian(sigma) else {
        return Ok(());
    };
    if rect.is_empty() {
        return Ok(());
    }

    let (w, h) = (rect.width as usize, rect.height as usize);
    let mut work = alloc_px(w * h)?;
    let mut line_in = alloc_px(w.max(h))?;
    let mut line_out = alloc_px(w.max(h))?;

    let stride = canvas.width() as usize * 4;
    let x0 = rect.x as usize * 4;
    {
        let raw = canvas.as_raw();
        for y in 0..h {
            let row = (rect.y as usize + y) * stride + x0;
            work.extend(raw[row..row + w * 4].chunks_exact(4).map(|p| {
                let a = u16::from(p[3]);
                [
                    mul_div255_u8(u16::from(p[0]), a),
                    mul_div255_u8(u16::from(p[1]), a),
                    mul_div255_u8(u16::from(p[2]), a),
                    p[3],
                ]
            }));
        }
    }
    line_in.resize(w.max(h), [0; 4]);
    line_out.resize(w.max(h), [0; 4]);

    for row in work.chunks_exact_mut(w) {
        line_in[..w].copy_from_slice(row);
        kernel.apply(&line_in[..w], row);
    }
    for x in 0..w {
        for y in 0..h {
            line_in[y] = work[y * w + x];
        }
        kernel.apply(&line_in[..h], &mut line_out[..h]);
        for y in 0..h {
            work[y * w + x] = line_out[y];
        }
    }

    let raw = canvas.as_raw_mut();
    for (y, row) in work.chunks_exact(w).enumerate() {
        let start = (rect.y as usize + y) * stride + x0;
        for (dst, p) in raw[start..start + w * 4].chunks_exact_mut(4).zip(row) {
            dst[0] = unpremul_channel(p[0], p[3]);
            dst[1] = unpremul_channel(p[1], p[3]);
            dst[2] = unpremul_channel(p[2], p[3]);
            dst[3] = p[3];
        }
    }
    Ok(())
}

fn alloc_px(len: usize) -> BacktextResult<Vec<Px>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|e| {
        BacktextError::resource(format!("failed to allocate {len} pixel blur buffer: {e}"))
    })?;
    Ok(v)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/blur.rs"]
mod tests;
