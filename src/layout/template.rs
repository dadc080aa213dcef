//! Fixed-size social canvases with a centered subject.

use serde::{Deserialize, Serialize};

use crate::{
    foundation::core::Rgba8,
    foundation::error::{BacktextError, BacktextResult},
    raster::canvas::Canvas,
};

/// Named canvas sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplatePreset {
    /// 1080x1080.
    InstagramPost,
    /// 1080x1920.
    InstagramStory,
    /// 1200x630.
    FacebookPost,
    /// 1600x900.
    TwitterPost,
    /// 1200x627.
    LinkedinPost,
    /// 1280x720.
    YoutubeThumbnail,
    /// 1080x1920.
    TiktokVideo,
}

impl TemplatePreset {
    /// Every preset in declaration order.
    pub const ALL: [Self; 7] = [
        Self::InstagramPost,
        Self::InstagramStory,
        Self::FacebookPost,
        Self::TwitterPost,
        Self::LinkedinPost,
        Self::YoutubeThumbnail,
        Self::TiktokVideo,
    ];

    /// Look up a preset by its snake_case name.
    pub fn from_name(name: &str) -> BacktextResult<Self> {
        let key = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == key)
            .ok_or_else(|| BacktextError::input(format!("unknown template '{name}'")))
    }

    /// Snake-case name, as accepted by [`TemplatePreset::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            Self::InstagramPost => "instagram_post",
            Self::InstagramStory => "instagram_story",
            Self::FacebookPost => "facebook_post",
            Self::TwitterPost => "twitter_post",
            Self::LinkedinPost => "linkedin_post",
            Self::YoutubeThumbnail => "youtube_thumbnail",
            Self::TiktokVideo => "tiktok_video",
        }
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::InstagramPost => (1080, 1080),
            Self::InstagramStory | Self::TiktokVideo => (1080, 1920),
            Self::FacebookPost => (1200, 630),
            Self::TwitterPost => (1600, 900),
            Self::LinkedinPost => (1200, 627),
            Self::YoutubeThumbnail => (1280, 720),
        }
    }
}

impl std::str::FromStr for TemplatePreset {
    type Err = BacktextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Where the subject landed on the template canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPlacement {
    /// Left edge of the subject on the template.
    pub x: i32,
    /// Top edge of the subject on the template.
    pub y: i32,
    /// Scaled subject width.
    pub width: u32,
    /// Scaled subject height.
    pub height: u32,
}

/// Fit `subject` inside `template` with `padding_percent` of the shorter side on every edge,
/// center it over a solid `background`, and paste it through its own alpha.
pub fn layout_template(
    subject: &Canvas,
    template: TemplatePreset,
    background: Rgba8,
    padding_percent: u32,
) -> BacktextResult<(Canvas, SubjectPlacement)> {
    let (w, h) = template.dimensions();
    let padding = u64::from(w.min(h)) * u64::from(padding_percent) / 100;
    let avail_w = i64::from(w) - 2 * padding as i64;
    let avail_h = i64::from(h) - 2 * padding as i64;
    if avail_w <= 0 || avail_h <= 0 {
        return Err(BacktextError::input(format!(
            "padding of {padding_percent}% leaves no room on a {w}x{h} template"
        )));
    }

    let aspect = f64::from(subject.width()) / f64::from(subject.height());
    let (new_w, new_h) = if avail_w as f64 / avail_h as f64 > aspect {
        (((avail_h as f64) * aspect) as i64, avail_h)
    } else {
        (avail_w, ((avail_w as f64) / aspect) as i64)
    };
    let (new_w, new_h) = (new_w.max(1) as u32, new_h.max(1) as u32);

    let resized = subject.resized(new_w, new_h)?;
    let placement = SubjectPlacement {
        x: ((w - new_w) / 2) as i32,
        y: ((h - new_h) / 2) as i32,
        width: new_w,
        height: new_h,
    };
    tracing::debug!(template = template.name(), ?placement, "template layout");

    let mut canvas = Canvas::filled(w, h, background)?;
    canvas.paste_masked(&resized, placement.x, placement.y);
    Ok((canvas, placement))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/template.rs"]
mod tests;
