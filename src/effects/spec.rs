//! Text effect parameters.
//!
//! [`EffectPresets`] is the immutable default table handed to the renderer. Callers send an
//! [`EffectRequest`] in which every field is optional; [`EffectPresets::resolve`] merges it
//! over the presets and validates the result into an [`EffectSpec`].

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Rgba8, Vec2, clamp_unit};
use crate::foundation::error::{BacktextError, BacktextResult};

const MAX_OUTLINE_WIDTH: u32 = 32;
const MAX_DEPTH_LAYERS: u32 = 256;
const MAX_BLUR: f32 = 128.0;

/// Blurred offset copy painted behind the text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShadowSpec {
    /// `[dx, dy]` in pixels.
    pub offset: [i32; 2],
    /// Shadow color.
    pub color: Rgba8,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Gaussian standard deviation; `0` disables blurring.
    pub blur: f32,
}

/// Stroke produced by stamping the text at every offset within `width`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlineSpec {
    /// Stroke width in pixels.
    pub width: u32,
    /// Stroke color.
    pub color: Rgba8,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

/// Soft halo around the text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlowSpec {
    /// Halo color.
    pub color: Rgba8,
    /// Gaussian standard deviation of the halo.
    pub radius: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

/// Color source for the extrusion layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepthColors {
    /// Every layer uses one color.
    Fixed(Rgba8),
    /// Layers sample the stops from nearest to farthest.
    Gradient(Vec<Rgba8>),
}

/// Simulated extrusion made of offset copies receding along `angle_deg`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthSpec {
    /// Number of offset copies.
    pub layers: u32,
    /// Direction the copies recede in, degrees clockwise from +x.
    pub angle_deg: f32,
    /// Offset added per layer, in pixels.
    pub distance: f32,
    /// Layer colors.
    pub colors: DepthColors,
}

impl DepthSpec {
    /// Integer offset of layer `i` (`1..=layers`) from the base position.
    pub fn layer_offset(&self, i: u32) -> (i32, i32) {
        let v = Vec2::from_angle(f64::from(self.angle_deg).to_radians())
            * (f64::from(self.distance) * f64::from(i));
        (v.x.round() as i32, v.y.round() as i32)
    }

    /// Color of layer `i` (`1..=layers`).
    pub fn layer_color(&self, i: u32) -> Rgba8 {
        match &self.colors {
            DepthColors::Fixed(c) => *c,
            DepthColors::Gradient(stops) => {
                let len = stops.len() as u64;
                let idx = (u64::from(i) * len / u64::from(self.layers.max(1))).min(len - 1);
                stops[idx as usize]
            }
        }
    }
}

/// Validated set of effects for one text layer. Absent effects are `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectSpec {
    shadow: Option<ShadowSpec>,
    outline: Option<OutlineSpec>,
    glow: Option<GlowSpec>,
    depth3d: Option<DepthSpec>,
}

impl EffectSpec {
    /// Spec with no effects; only the main text is painted.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a shadow.
    pub fn with_shadow(mut self, mut shadow: ShadowSpec) -> BacktextResult<Self> {
        shadow.opacity = clamp_unit(shadow.opacity);
        shadow.blur = check_radius("shadow.blur", shadow.blur)?;
        self.shadow = Some(shadow);
        Ok(self)
    }

    /// Add an outline.
    pub fn with_outline(mut self, mut outline: OutlineSpec) -> BacktextResult<Self> {
        if outline.width > MAX_OUTLINE_WIDTH {
            return Err(BacktextError::input(format!(
                "outline.width must be <= {MAX_OUTLINE_WIDTH} (got {})",
                outline.width
            )));
        }
        outline.opacity = clamp_unit(outline.opacity);
        self.outline = Some(outline);
        Ok(self)
    }

    /// Add a glow.
    pub fn with_glow(mut self, mut glow: GlowSpec) -> BacktextResult<Self> {
        glow.opacity = clamp_unit(glow.opacity);
        glow.radius = check_radius("glow.radius", glow.radius)?;
        self.glow = Some(glow);
        Ok(self)
    }

    /// Add a 3D depth extrusion.
    pub fn with_depth3d(mut self, depth: DepthSpec) -> BacktextResult<Self> {
        if depth.layers == 0 || depth.layers > MAX_DEPTH_LAYERS {
            return Err(BacktextError::input(format!(
                "depth3d.layers must be in 1..={MAX_DEPTH_LAYERS} (got {})",
                depth.layers
            )));
        }
        if !depth.angle_deg.is_finite() {
            return Err(BacktextError::input("depth3d.angle must be finite"));
        }
        if !depth.distance.is_finite() || depth.distance < 0.0 {
            return Err(BacktextError::input(
                "depth3d.distance must be finite and >= 0",
            ));
        }
        if let DepthColors::Gradient(stops) = &depth.colors
            && stops.is_empty()
        {
            return Err(BacktextError::input(
                "depth3d.color_gradient must not be empty",
            ));
        }
        self.depth3d = Some(depth);
        Ok(self)
    }

    /// Shadow parameters, if any.
    pub fn shadow(&self) -> Option<&ShadowSpec> {
        self.shadow.as_ref()
    }

    /// Outline parameters, if any.
    pub fn outline(&self) -> Option<&OutlineSpec> {
        self.outline.as_ref()
    }

    /// Glow parameters, if any.
    pub fn glow(&self) -> Option<&GlowSpec> {
        self.glow.as_ref()
    }

    /// Depth parameters, if any.
    pub fn depth3d(&self) -> Option<&DepthSpec> {
        self.depth3d.as_ref()
    }

    /// `true` when no effect is present.
    pub fn is_empty(&self) -> bool {
        self.shadow.is_none()
            && self.outline.is_none()
            && self.glow.is_none()
            && self.depth3d.is_none()
    }
}

fn check_radius(what: &str, v: f32) -> BacktextResult<f32> {
    if !v.is_finite() {
        return Err(BacktextError::input(format!("{what} must be finite")));
    }
    Ok(v.clamp(0.0, MAX_BLUR))
}

/// Default parameters for every effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectPresets {
    /// Shadow defaults.
    pub shadow: ShadowSpec,
    /// Outline defaults.
    pub outline: OutlineSpec,
    /// Glow defaults.
    pub glow: GlowSpec,
    /// Depth defaults.
    pub depth3d: DepthSpec,
}

impl Default for EffectPresets {
    fn default() -> Self {
        Self {
            shadow: ShadowSpec {
                offset: [5, 5],
                color: Rgba8::BLACK,
                opacity: 0.5,
                blur: 3.0,
            },
            outline: OutlineSpec {
                width: 2,
                color: Rgba8::BLACK,
                opacity: 1.0,
            },
            glow: GlowSpec {
                color: Rgba8::WHITE,
                radius: 10.0,
                opacity: 0.7,
            },
            depth3d: DepthSpec {
                layers: 10,
                angle_deg: 45.0,
                distance: 2.0,
                colors: DepthColors::Gradient(vec![
                    Rgba8::rgb(0x33, 0x33, 0x33),
                    Rgba8::rgb(0x66, 0x66, 0x66),
                    Rgba8::rgb(0x99, 0x99, 0x99),
                ]),
            },
        }
    }
}

impl EffectPresets {
    /// Merge `request` over the presets and validate the result.
    pub fn resolve(&self, request: &EffectRequest) -> BacktextResult<EffectSpec> {
        let mut spec = EffectSpec::none();
        if let Some(p) = &request.shadow {
            let base = &self.shadow;
            spec = spec.with_shadow(ShadowSpec {
                offset: p.offset.unwrap_or(base.offset),
                color: p.color.unwrap_or(base.color),
                opacity: p.opacity.unwrap_or(base.opacity),
                blur: p.blur.unwrap_or(base.blur),
            })?;
        }
        if let Some(p) = &request.outline {
            let base = &self.outline;
            spec = spec.with_outline(OutlineSpec {
                width: p.width.unwrap_or(base.width),
                color: p.color.unwrap_or(base.color),
                opacity: p.opacity.unwrap_or(base.opacity),
            })?;
        }
        if let Some(p) = &request.glow {
            let base = &self.glow;
            spec = spec.with_glow(GlowSpec {
                color: p.color.unwrap_or(base.color),
                radius: p.radius.unwrap_or(base.radius),
                opacity: p.opacity.unwrap_or(base.opacity),
            })?;
        }
        if let Some(p) = &request.depth3d {
            let base = &self.depth3d;
            let colors = match (&p.color, &p.color_gradient) {
                (Some(_), Some(_)) => {
                    return Err(BacktextError::input(
                        "depth3d takes either color or color_gradient, not both",
                    ));
                }
                (Some(c), None) => DepthColors::Fixed(*c),
                (None, Some(g)) => DepthColors::Gradient(g.clone()),
                (None, None) => base.colors.clone(),
            };
            spec = spec.with_depth3d(DepthSpec {
                layers: p.layers.unwrap_or(base.layers),
                angle_deg: p.angle.unwrap_or(base.angle_deg),
                distance: p.distance.unwrap_or(base.distance),
                colors,
            })?;
        }
        Ok(spec)
    }
}

/// Partial shadow parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShadowPatch {
    /// `[dx, dy]` in pixels.
    pub offset: Option<[i32; 2]>,
    /// Shadow color.
    pub color: Option<Rgba8>,
    /// Opacity in `[0, 1]`.
    pub opacity: Option<f32>,
    /// Blur sigma.
    pub blur: Option<f32>,
}

/// Partial outline parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlinePatch {
    /// Stroke width in pixels.
    pub width: Option<u32>,
    /// Stroke color.
    pub color: Option<Rgba8>,
    /// Opacity in `[0, 1]`.
    pub opacity: Option<f32>,
}

/// Partial glow parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlowPatch {
    /// Halo color.
    pub color: Option<Rgba8>,
    /// Blur sigma.
    pub radius: Option<f32>,
    /// Opacity in `[0, 1]`.
    pub opacity: Option<f32>,
}

/// Partial depth parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepthPatch {
    /// Number of copies.
    pub layers: Option<u32>,
    /// Degrees.
    pub angle: Option<f32>,
    /// Pixels per layer.
    pub distance: Option<f32>,
    /// Single layer color.
    pub color: Option<Rgba8>,
    /// Colors sampled across layers.
    pub color_gradient: Option<Vec<Rgba8>>,
}

/// Caller-side effect request; each present entry is merged over [`EffectPresets`].
///
/// Deserializes from either the keyed form
/// `{"shadow": {..}, "outline": {..}, "glow": {..}, "depth3d": {..}}`
/// or a single tagged effect `{"type": "shadow", "settings": {..}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EffectRequest {
    /// Shadow overrides.
    pub shadow: Option<ShadowPatch>,
    /// Outline overrides.
    pub outline: Option<OutlinePatch>,
    /// Glow overrides.
    pub glow: Option<GlowPatch>,
    /// Depth overrides.
    pub depth3d: Option<DepthPatch>,
}

impl EffectRequest {
    /// Shadow plus outline, both at preset values.
    pub fn dramatic() -> Self {
        Self {
            shadow: Some(ShadowPatch::default()),
            outline: Some(OutlinePatch::default()),
            ..Self::default()
        }
    }

    /// `true` when no effect is requested.
    pub fn is_empty(&self) -> bool {
        self.shadow.is_none()
            && self.outline.is_none()
            && self.glow.is_none()
            && self.depth3d.is_none()
    }
}

impl<'de> Deserialize<'de> for EffectRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Keyed {
            #[serde(default)]
            shadow: Option<ShadowPatch>,
            #[serde(default)]
            outline: Option<OutlinePatch>,
            #[serde(default)]
            glow: Option<GlowPatch>,
            #[serde(default, alias = "3d_depth")]
            depth3d: Option<DepthPatch>,
        }

        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Tagged {
            #[serde(rename = "type")]
            kind: String,
            #[serde(default)]
            settings: Option<serde_json::Value>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Tagged(Tagged),
            Keyed(Keyed),
        }

        fn settings<T, E>(v: Option<serde_json::Value>) -> Result<T, E>
        where
            T: serde::de::DeserializeOwned + Default,
            E: serde::de::Error,
        {
            match v {
                None => Ok(T::default()),
                Some(v) => serde_json::from_value(v).map_err(E::custom),
            }
        }

        match Repr::deserialize(deserializer)? {
            Repr::Keyed(k) => Ok(Self {
                shadow: k.shadow,
                outline: k.outline,
                glow: k.glow,
                depth3d: k.depth3d,
            }),
            Repr::Tagged(t) => {
                let mut out = Self::default();
                match t.kind.trim().to_ascii_lowercase().as_str() {
                    "shadow" => out.shadow = Some(settings::<_, D::Error>(t.settings)?),
                    "outline" => out.outline = Some(settings::<_, D::Error>(t.settings)?),
                    "glow" => out.glow = Some(settings::<_, D::Error>(t.settings)?),
                    "3d_depth" | "depth3d" => out.depth3d = Some(settings::<_, D::Error>(t.settings)?),
                    other => {
                        return Err(serde::de::Error::custom(format!(
                            "unknown effect type '{other}'"
                        )));
                    }
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/spec.rs"]
mod tests;
