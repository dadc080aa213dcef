//! Engine configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::font::FontSources,
    effects::spec::EffectPresets,
    foundation::core::Rgba8,
    foundation::error::{BacktextError, BacktextResult},
};

/// Defaults applied when a request omits text styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    /// Logical font name.
    pub font_name: String,
    /// Pixel size.
    pub font_size: f32,
    /// Fill color.
    pub color: Rgba8,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font_name: "anton".to_owned(),
            font_size: 120.0,
            color: Rgba8::WHITE,
        }
    }
}

/// Everything the orchestrator needs to know about its environment.
///
/// Relative paths resolve against `base_dir`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Font search paths and aliases, flattened into the top-level object.
    #[serde(flatten)]
    pub fonts: FontSources,
    /// Root for relative paths and `/uploads/...` references.
    pub base_dir: PathBuf,
    /// Where rendered artifacts are written before upload.
    pub output_dir: PathBuf,
    /// Root served by the local object store.
    pub public_dir: PathBuf,
    /// URL prefix under which `public_dir` is served.
    pub public_url_prefix: String,
    /// Preset table merged under every effect request.
    pub effect_presets: EffectPresets,
    /// Text defaults for the CLI and previews.
    pub defaults: TextDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fonts: FontSources::default(),
            base_dir: PathBuf::from("."),
            output_dir: PathBuf::from("uploads/processed"),
            public_dir: PathBuf::from("uploads/public"),
            public_url_prefix: "/uploads/public".to_owned(),
            effect_presets: EffectPresets::default(),
            defaults: TextDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> BacktextResult<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))
            .map_err(|e| BacktextError::io(format!("{e:#}")))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Config rooted at `base_dir` with every other field defaulted.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// `p` if absolute, otherwise `base_dir/p`.
    pub fn resolve_path(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Resolved `output_dir`.
    pub fn output_path(&self) -> PathBuf {
        self.resolve_path(&self.output_dir)
    }

    /// Resolved `public_dir`.
    pub fn public_path(&self) -> PathBuf {
        self.resolve_path(&self.public_dir)
    }

    /// Font sources with `fonts_dir` rebased onto `base_dir`.
    pub fn font_sources(&self) -> FontSources {
        FontSources {
            fonts_dir: self.resolve_path(&self.fonts.fonts_dir),
            ..self.fonts.clone()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
