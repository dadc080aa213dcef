use serde::{Deserialize, Serialize};

use crate::{
    effects::spec::EffectRequest,
    foundation::core::{Position, Rgba8},
    foundation::error::{BacktextError, BacktextResult},
};

const MAX_FONT_SIZE: f32 = 2000.0;

/// Font and color for one text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Logical font name.
    pub font_name: String,
    /// Pixel size in `(0, 2000]`.
    pub font_size: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Optional effects merged over the presets.
    pub effects: Option<EffectRequest>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_name: "anton".to_owned(),
            font_size: 120.0,
            color: Rgba8::WHITE,
            effects: None,
        }
    }
}

impl TextStyle {
    fn validate(&self) -> BacktextResult<()> {
        validate_font_size(self.font_size)
    }
}

/// Reject sizes outside `(0, 2000]`, including NaN and infinities.
pub(crate) fn validate_font_size(size: f32) -> BacktextResult<()> {
    if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
        return Err(BacktextError::input(format!(
            "font_size must be in (0, {MAX_FONT_SIZE}] (got {size})"
        )));
    }
    Ok(())
}

#[derive(Deserialize)]
struct RawTextLayer {
    text: String,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    style: TextStyle,
}

/// A validated piece of text to paint. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTextLayer")]
pub struct TextLayer {
    text: String,
    position: Position,
    style: TextStyle,
}

impl TryFrom<RawTextLayer> for TextLayer {
    type Error = BacktextError;

    fn try_from(raw: RawTextLayer) -> Result<Self, Self::Error> {
        Self::new(raw.text, raw.position, raw.style)
    }
}

impl TextLayer {
    /// Validated layer; empty or multi-line text and bad sizes are input errors.
    pub fn new(text: impl Into<String>, position: Position, style: TextStyle) -> BacktextResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(BacktextError::input("text must not be empty"));
        }
        if text.contains(['\n', '\r']) {
            return Err(BacktextError::input("text must be a single line"));
        }
        style.validate()?;
        Ok(Self {
            text,
            position,
            style,
        })
    }

    /// Text to paint.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Top-left corner of the text box.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Font, color and effects.
    pub fn style(&self) -> &TextStyle {
        &self.style
    }
}

/// Poster-style headline request.
///
/// The text is uppercased and gets a trailing period unless it already ends with one; when
/// no effects are given, a shadow plus outline is used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DramaticText {
    /// Headline text before case and period rules.
    pub text: String,
    /// Top-left corner of the text box.
    pub position: Position,
    /// Logical font name.
    pub font_name: String,
    /// Pixel size.
    pub font_size: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Effects; shadow plus outline when absent or empty.
    pub effects: Option<EffectRequest>,
    /// Uppercase the text.
    pub uppercase: bool,
    /// Append a period when missing.
    pub with_period: bool,
}

impl Default for DramaticText {
    fn default() -> Self {
        Self {
            text: String::new(),
            position: Position::new(10, 10),
            font_name: "anton".to_owned(),
            font_size: 150.0,
            color: Rgba8::WHITE,
            effects: None,
            uppercase: true,
            with_period: true,
        }
    }
}

impl DramaticText {
    /// Request with default styling.
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        Self {
            text: text.into(),
            position,
            ..Self::default()
        }
    }

    /// The styled text after case and punctuation rules.
    pub fn headline(&self) -> String {
        let mut text = self.text.trim().to_owned();
        if self.uppercase {
            text = text.to_uppercase();
        }
        if self.with_period && !text.is_empty() && !text.ends_with('.') {
            text.push('.');
        }
        text
    }

    /// Apply the headline rules and build the layer.
    pub fn into_layer(self) -> BacktextResult<TextLayer> {
        let text = self.headline();
        let effects = match self.effects {
            Some(req) if !req.is_empty() => req,
            _ => EffectRequest::dramatic(),
        };
        TextLayer::new(
            text,
            self.position,
            TextStyle {
                font_name: self.font_name,
                font_size: self.font_size,
                color: self.color,
                effects: Some(effects),
            },
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/layer.rs"]
mod tests;
