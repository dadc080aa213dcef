//! Text painting with layered effects.
//!
//! Passes run back to front so later passes occlude earlier ones:
//! depth copies (farthest first), glow, shadow, outline stamps, then the main text.

use crate::{
    assets::font::{Font, GlyphMask},
    effects::composite::over_region_in_place,
    effects::spec::{EffectPresets, EffectRequest, EffectSpec},
    foundation::core::{PixelRect, Position, Rgba8, TextSize},
    foundation::error::{BacktextError, BacktextResult},
    raster::blur::kernel_radius,
    raster::canvas::Canvas,
};

/// Which effect a draw call belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Extrusion copy `i` (`1..=layers`).
    Depth(u32),
    /// Blurred halo.
    Glow,
    /// Blurred offset copy.
    Shadow,
    /// One stroke stamp.
    Outline,
    /// The text itself.
    Main,
}

/// One placement of the text mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stamp {
    /// Effect the stamp belongs to.
    pub pass: Pass,
    /// Horizontal offset from the layer position.
    pub dx: i32,
    /// Vertical offset from the layer position.
    pub dy: i32,
}

/// Record of the draw calls made by [`TextEffectRenderer::render_text`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderTrace {
    /// Box of the painted text.
    pub text_size: TextSize,
    /// Stamps in paint order.
    pub stamps: Vec<Stamp>,
}

impl RenderTrace {
    /// Stamps belonging to `pass` kinds matching `pred`.
    pub fn count(&self, pred: impl Fn(Pass) -> bool) -> usize {
        self.stamps.iter().filter(|s| pred(s.pass)).count()
    }
}

/// Paints text with effects. Holds the immutable preset table used to resolve requests.
#[derive(Clone, Debug, Default)]
pub struct TextEffectRenderer {
    presets: EffectPresets,
}

impl TextEffectRenderer {
    /// Renderer resolving requests against `presets`.
    pub fn new(presets: EffectPresets) -> Self {
        Self { presets }
    }

    /// Preset table.
    pub fn presets(&self) -> &EffectPresets {
        &self.presets
    }

    /// Merge a partial request over the preset table.
    pub fn resolve(&self, request: &EffectRequest) -> BacktextResult<EffectSpec> {
        self.presets.resolve(request)
    }

    /// Paint `text` with its top-left corner at `position`.
    ///
    /// Without `effects` only the main text is drawn.
    pub fn render_text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        position: Position,
        font: &Font,
        color: Rgba8,
        effects: Option<&EffectSpec>,
    ) -> BacktextResult<RenderTrace> {
        if text.is_empty() {
            return Err(BacktextError::input("text must not be empty"));
        }
        let mask = font.rasterize(text)?;
        let mut trace = RenderTrace {
            text_size: TextSize {
                width: mask.width,
                height: mask.height,
            },
            stamps: Vec::new(),
        };
        if mask.width == 0 || mask.height == 0 {
            return Ok(trace);
        }

        if let Some(fx) = effects {
            if let Some(depth) = fx.depth3d() {
                tracing::debug!(layers = depth.layers, "depth pass");
                for i in (1..=depth.layers).rev() {
                    let (dx, dy) = depth.layer_offset(i);
                    paint_mask(canvas, &mask, position.offset(dx, dy), depth.layer_color(i));
                    trace.stamps.push(Stamp {
                        pass: Pass::Depth(i),
                        dx,
                        dy,
                    });
                }
            }

            if let Some(glow) = fx.glow() {
                tracing::debug!(radius = glow.radius, "glow pass");
                blurred_pass(canvas, &mask, position, glow.color, glow.radius, glow.opacity)?;
                trace.stamps.push(Stamp {
                    pass: Pass::Glow,
                    dx: 0,
                    dy: 0,
                });
            }

            if let Some(shadow) = fx.shadow() {
                let [dx, dy] = shadow.offset;
                tracing::debug!(dx, dy, blur = shadow.blur, "shadow pass");
                blurred_pass(
                    canvas,
                    &mask,
                    position.offset(dx, dy),
                    shadow.color,
                    shadow.blur,
                    shadow.opacity,
                )?;
                trace.stamps.push(Stamp {
                    pass: Pass::Shadow,
                    dx,
                    dy,
                });
            }

            if let Some(outline) = fx.outline() {
                let w = outline.width as i32;
                let color = outline.color.with_opacity(outline.opacity);
                tracing::debug!(width = w, "outline pass");
                for dy in -w..=w {
                    for dx in -w..=w {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        paint_mask(canvas, &mask, position.offset(dx, dy), color);
                        trace.stamps.push(Stamp {
                            pass: Pass::Outline,
                            dx,
                            dy,
                        });
                    }
                }
            }
        }

        paint_mask(canvas, &mask, position, color);
        trace.stamps.push(Stamp {
            pass: Pass::Main,
            dx: 0,
            dy: 0,
        });
        Ok(trace)
    }
}

fn mask_rect(mask: &GlyphMask, at: Position) -> PixelRect {
    PixelRect::new(at.x, at.y, mask.width, mask.height)
}

/// Alpha-over `color` through the coverage mask placed at `at`.
fn paint_mask(canvas: &mut Canvas, mask: &GlyphMask, at: Position, color: Rgba8) {
    if color.a == 0 {
        return;
    }
    let clip = mask_rect(mask, at).clip_to(canvas.width(), canvas.height());
    for y in clip.y..clip.y + clip.height as i32 {
        for x in clip.x..clip.x + clip.width as i32 {
            let c = mask.coverage_at((x - at.x) as u32, (y - at.y) as u32);
            if c == 0 {
                continue;
            }
            let a = (u32::from(color.a) * u32::from(c) + 127) / 255;
            canvas.blend_pixel(i64::from(x), i64::from(y), Rgba8 { a: a as u8, ..color });
        }
    }
}

/// Draw on a transparent scratch canvas, blur, fade, then composite onto `canvas`.
fn blurred_pass(
    canvas: &mut Canvas,
    mask: &GlyphMask,
    at: Position,
    color: Rgba8,
    sigma: f32,
    opacity: f32,
) -> BacktextResult<()> {
    let mut scratch = Canvas::new(canvas.width(), canvas.height())?;
    paint_mask(&mut scratch, mask, at, color);
    let rect = mask_rect(mask, at)
        .inflate(kernel_radius(sigma))
        .clip_to(canvas.width(), canvas.height());
    if rect.is_empty() {
        return Ok(());
    }
    if sigma > 0.0 {
        scratch.blur_region(rect, sigma)?;
    }
    scratch.scale_alpha(rect, opacity);
    over_region_in_place(canvas, &scratch, rect)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
