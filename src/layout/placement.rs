//! Legibility-driven text placement.

use serde::{Deserialize, Serialize};

use crate::{
    foundation::core::{PixelRect, TextSize},
    foundation::math::luma,
    raster::canvas::Canvas,
};

const GRID: u32 = 3;
const EDGE_MARGIN: i64 = 10;
const MAX_SUGGESTIONS: usize = 3;

/// A suggested top-left text position and its legibility score (higher is better).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementCandidate {
    /// Left edge of the text box.
    pub x: i32,
    /// Top edge of the text box.
    pub y: i32,
    /// `255 - mean(alpha or luma)` under the box.
    pub score: f64,
}

/// Up to three positions for a `text_size` box on `background`, best first.
///
/// Each cell of a 3x3 grid proposes the origin that centers the box in the cell, clamped to
/// keep a 10px margin. On canvases with alpha the score is `255 - mean(alpha)` over the box;
/// otherwise it is `255 - mean(luma)`. Ties keep grid order (row-major).
pub fn suggest_positions(background: &Canvas, text_size: TextSize) -> Vec<PlacementCandidate> {
    let (w, h) = (f64::from(background.width()), f64::from(background.height()));
    let (tw, th) = (i64::from(text_size.width), i64::from(text_size.height));

    let mut out = Vec::with_capacity((GRID * GRID) as usize);
    for row in 0..GRID {
        for col in 0..GRID {
            let cx = (w * (f64::from(col) + 0.5) / f64::from(GRID) - tw as f64 / 2.0).trunc();
            let cy = (h * (f64::from(row) + 0.5) / f64::from(GRID) - th as f64 / 2.0).trunc();
            let x = (cx as i64)
                .min(i64::from(background.width()) - tw - EDGE_MARGIN)
                .max(EDGE_MARGIN);
            let y = (cy as i64)
                .min(i64::from(background.height()) - th - EDGE_MARGIN)
                .max(EDGE_MARGIN);
            let (x, y) = (x as i32, y as i32);
            let rect = PixelRect::new(x, y, text_size.width, text_size.height);
            out.push(PlacementCandidate {
                x,
                y,
                score: score_region(background, rect),
            });
        }
    }

    out.sort_by(|a, b| b.score.total_cmp(&a.score));
    out.truncate(MAX_SUGGESTIONS);
    tracing::debug!(candidates = ?out, "placement suggestions");
    out
}

fn score_region(canvas: &Canvas, rect: PixelRect) -> f64 {
    let mut n = 0u64;
    let mut sum = 0.0f64;
    let has_alpha = canvas.has_alpha();
    for px in canvas.region_pixels(rect) {
        sum += if has_alpha {
            f64::from(px[3])
        } else {
            luma(px[0], px[1], px[2])
        };
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    255.0 - sum / n as f64
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placement.rs"]
mod tests;
