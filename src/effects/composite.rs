//! Straight-alpha compositing and blend modes.
//!
//! Every buffer handled here is straight (non-premultiplied) RGBA8. Alpha-over follows
//!
//! ```text
//! a_out   = a_fg + a_bg * (1 - a_fg)
//! rgb_out = (rgb_fg * a_fg + rgb_bg * a_bg * (1 - a_fg)) / max(a_out, eps)
//! ```
//!
//! Non-`normal` blend modes first replace the foreground color with `B(rgb_bg, rgb_fg)` and
//! then run the same alpha-over, so transparency handling is identical across modes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{
    foundation::core::{PixelRect, clamp_unit},
    foundation::error::{BacktextError, BacktextResult},
    foundation::math::mul_div255_u8,
    raster::canvas::Canvas,
};

/// Straight RGBA8 pixel in memory order.
pub type StraightRgba8 = [u8; 4];

const ALPHA_EPS: f32 = 1e-6;

/// How overlapping foreground and background colors combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Plain alpha-over.
    #[default]
    Normal,
    /// `bg * fg / 255`.
    Multiply,
    /// `255 - (255 - bg) * (255 - fg) / 255`.
    Screen,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
}

impl BlendMode {
    /// Resolve a mode by name.
    ///
    /// Unknown names (including `"default"`) resolve to [`BlendMode::Normal`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" => Self::Normal,
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            other => {
                tracing::warn!(mode = other, "unknown blend mode, using normal alpha-over");
                Self::Normal
            }
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
        }
    }

    fn blend_channel(self, cb: u8, cs: u8) -> u8 {
        match self {
            Self::Normal => cs,
            Self::Multiply => mul_div255_u8(u16::from(cb), u16::from(cs)),
            Self::Screen => 255 - mul_div255_u8(255 - u16::from(cb), 255 - u16::from(cs)),
            Self::Darken => cb.min(cs),
            Self::Lighten => cb.max(cs),
        }
    }
}

/// Straight-alpha `src` over `dst`.
pub fn over(dst: StraightRgba8, src: StraightRgba8) -> StraightRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let af = f32::from(src[3]) / 255.0;
    let ab = f32::from(dst[3]) / 255.0;
    let ao = (af + ab * (1.0 - af)).clamp(0.0, 1.0);
    let denom = ao.max(ALPHA_EPS);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (f32::from(src[i]) * af + f32::from(dst[i]) * ab * (1.0 - af)) / denom;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (ao * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

/// Blend `src` into `dst` under `mode`, then alpha-over.
pub fn blend(dst: StraightRgba8, src: StraightRgba8, mode: BlendMode) -> StraightRgba8 {
    if mode == BlendMode::Normal || src[3] == 0 {
        return over(dst, src);
    }
    let mixed = [
        mode.blend_channel(dst[0], src[0]),
        mode.blend_channel(dst[1], src[1]),
        mode.blend_channel(dst[2], src[2]),
        src[3],
    ];
    over(dst, mixed)
}

/// Alpha-over `src` onto `dst` for the pixels inside `rect`. Both canvases must match in size.
pub fn over_region_in_place(dst: &mut Canvas, src: &Canvas, rect: PixelRect) -> BacktextResult<()> {
    if dst.size() != src.size() {
        return Err(BacktextError::input(
            "over_region_in_place expects equally sized canvases",
        ));
    }
    let rect = rect.clip_to(dst.width(), dst.height());
    if rect.is_empty() {
        return Ok(());
    }
    let stride = dst.width() as usize * 4;
    let x0 = rect.x as usize * 4;
    let x1 = x0 + rect.width as usize * 4;
    for y in rect.y as usize..rect.y as usize + rect.height as usize {
        let row = y * stride;
        let d_row = &mut dst.as_raw_mut()[row + x0..row + x1];
        let s_row = &src.as_raw()[row + x0..row + x1];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Merge `foreground` over `background` into a new canvas.
///
/// A foreground of a different size is resampled to the background's size first. `opacity`
/// is clamped to `[0, 1]` and scales the foreground alpha before blending. Inputs are not
/// modified.
pub fn compose_over(
    background: &Canvas,
    foreground: &Canvas,
    mode: BlendMode,
    opacity: f32,
) -> BacktextResult<Canvas> {
    let opacity = clamp_unit(opacity);
    let fg: Cow<'_, Canvas> = if foreground.size() != background.size() {
        tracing::debug!(
            from = ?foreground.size(),
            to = ?background.size(),
            "resampling foreground to background size"
        );
        Cow::Owned(foreground.resized(background.width(), background.height())?)
    } else {
        Cow::Borrowed(foreground)
    };

    let mut out = background.try_clone()?;
    for (d, s) in out
        .as_raw_mut()
        .chunks_exact_mut(4)
        .zip(fg.as_raw().chunks_exact(4))
    {
        let mut src = [s[0], s[1], s[2], s[3]];
        if opacity < 1.0 {
            src[3] = (f32::from(src[3]) * opacity).round() as u8;
        }
        let px = blend([d[0], d[1], d[2], d[3]], src, mode);
        d.copy_from_slice(&px);
    }
    out.set_has_alpha(true);
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
