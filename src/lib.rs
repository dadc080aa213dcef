#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Stylized text over photographs: layered text effects, straight-alpha compositing,
//! placement suggestions and social-media templates.

pub mod config;

mod assets;
mod effects;
mod foundation;
mod layout;
mod pipeline;
mod raster;
mod render;

pub use assets::decode::{decode_image, encode_png, load_image};
pub use assets::font::{Font, FontProvider, FontSources, GlyphMask};
pub use config::{EngineConfig, TextDefaults};
pub use effects::composite::{BlendMode, blend, compose_over, over};
pub use effects::spec::{
    DepthColors, DepthPatch, DepthSpec, EffectPresets, EffectRequest, EffectSpec, GlowPatch,
    GlowSpec, OutlinePatch, OutlineSpec, ShadowPatch, ShadowSpec,
};
pub use foundation::core::{PixelRect, Position, Rgba8, TextSize, Vec2};
pub use foundation::error::{BacktextError, BacktextResult, ErrorClass};
pub use layout::placement::{PlacementCandidate, suggest_positions};
pub use layout::template::{SubjectPlacement, TemplatePreset, layout_template};
pub use pipeline::io::{HttpFetcher, ImageFetcher, LocalPublicStore, ObjectStore};
pub use pipeline::layer::{DramaticText, TextLayer, TextStyle};
pub use pipeline::orchestrator::{
    Artifact, FontPreview, ImageSize, Orchestrator, PREVIEW_SIZES, TemplateRender, TextRender,
};
pub use raster::canvas::Canvas;
pub use render::text::{Pass, RenderTrace, Stamp, TextEffectRenderer};
