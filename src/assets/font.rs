use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::bitmap_font,
    foundation::core::TextSize,
    foundation::error::{BacktextError, BacktextResult},
};

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];
const SYSTEM_SEARCH_DEPTH: usize = 4;

/// Where fonts are looked up, in resolution order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSources {
    /// Directory searched first for font files.
    pub fonts_dir: PathBuf,
    /// Directories searched recursively after `fonts_dir`.
    pub system_font_dirs: Vec<PathBuf>,
    /// Files tried when the requested font cannot be found; relative paths resolve against
    /// `fonts_dir`.
    pub fallback_font_files: Vec<PathBuf>,
    /// Logical name (lowercase) to file name or family name.
    pub font_aliases: BTreeMap<String, String>,
}

impl Default for FontSources {
    fn default() -> Self {
        let font_aliases = [
            ("anton", "Anton-Regular.ttf"),
            ("sixcaps", "SixCaps.ttf"),
            ("impact", "Impact"),
            ("arial_bold", "Arial Bold"),
            ("helvetica_bold", "Helvetica Bold"),
            ("boldonse", "Boldonse.ttf"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        Self {
            fonts_dir: PathBuf::from("assets/fonts"),
            system_font_dirs: vec![
                PathBuf::from("/usr/share/fonts"),
                PathBuf::from("/usr/local/share/fonts"),
                PathBuf::from("/Library/Fonts"),
                PathBuf::from("/System/Library/Fonts"),
                PathBuf::from("C:\\Windows\\Fonts"),
            ],
            fallback_font_files: vec![PathBuf::from("Arial.ttf"), PathBuf::from("DejaVuSans.ttf")],
            font_aliases,
        }
    }
}

/// 8-bit coverage mask of one line of text, `width * height` bytes, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    /// Mask width in pixels.
    pub width: u32,
    /// Mask height in pixels.
    pub height: u32,
    /// Coverage bytes, `0` empty to `255` fully covered.
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    /// Coverage at `(x, y)`; `0` outside the mask.
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[y as usize * self.width as usize + x as usize]
    }

    fn blank(width: u32, height: u32) -> BacktextResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| BacktextError::resource("glyph mask size overflows memory"))?;
        let mut coverage = Vec::new();
        coverage.try_reserve_exact(len).map_err(|e| {
            BacktextError::resource(format!("failed to allocate {len} byte glyph mask: {e}"))
        })?;
        coverage.resize(len, 0);
        Ok(Self {
            width,
            height,
            coverage,
        })
    }

    fn stamp(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        self.coverage[i] = self.coverage[i].max(value);
    }
}

#[derive(Clone)]
enum Face {
    Outline(Arc<fontdue::Font>),
    Bitmap { scale: u32 },
}

/// A font at a fixed pixel size.
///
/// The text box of a string starts at the ascent line and spans the advance extent, so
/// [`Font::measure`] and [`Font::rasterize`] always agree on dimensions.
#[derive(Clone)]
pub struct Font {
    name: String,
    size: f32,
    face: Face,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("bitmap", &self.is_bitmap())
            .finish()
    }
}

struct PlacedGlyph {
    ch: char,
    x: i32,
    y: i32,
}

struct OutlineLine {
    width: u32,
    height: u32,
    glyphs: Vec<PlacedGlyph>,
}

impl Font {
    /// The built-in bitmap font.
    pub fn bitmap(size: f32) -> Self {
        Self {
            name: "builtin-5x7".to_owned(),
            size,
            face: Face::Bitmap {
                scale: bitmap_font::scale_for(size),
            },
        }
    }

    /// Parse an outline font from TrueType/OpenType bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8], size: f32) -> BacktextResult<Self> {
        let name = name.into();
        let face = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| BacktextError::resource(format!("failed to parse font {name}: {e}")))?;
        Ok(Self {
            name,
            size,
            face: Face::Outline(Arc::new(face)),
        })
    }

    fn with_face(name: String, face: Arc<fontdue::Font>, size: f32) -> Self {
        Self {
            name,
            size,
            face: Face::Outline(face),
        }
    }

    /// Logical name the font was resolved for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel size.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// `true` for the built-in bitmap font.
    pub fn is_bitmap(&self) -> bool {
        matches!(self.face, Face::Bitmap { .. })
    }

    /// Rendered box of `text` laid out on one line.
    pub fn measure(&self, text: &str) -> TextSize {
        match &self.face {
            Face::Bitmap { scale } => bitmap_size(text, *scale),
            Face::Outline(face) => {
                let line = self.layout_outline(face, text);
                TextSize {
                    width: line.width,
                    height: line.height,
                }
            }
        }
    }

    /// Coverage mask of `text`, sized exactly as [`Font::measure`] reports.
    pub fn rasterize(&self, text: &str) -> BacktextResult<GlyphMask> {
        match &self.face {
            Face::Bitmap { scale } => rasterize_bitmap(text, *scale),
            Face::Outline(face) => {
                let line = self.layout_outline(face, text);
                let mut mask = GlyphMask::blank(line.width, line.height)?;
                for g in &line.glyphs {
                    let (m, bitmap) = face.rasterize(g.ch, self.size);
                    for gy in 0..m.height {
                        for gx in 0..m.width {
                            mask.stamp(
                                i64::from(g.x) + gx as i64,
                                i64::from(g.y) + gy as i64,
                                bitmap[gy * m.width + gx],
                            );
                        }
                    }
                }
                Ok(mask)
            }
        }
    }

    fn layout_outline(&self, face: &fontdue::Font, text: &str) -> OutlineLine {
        let px = self.size;
        let (ascent, descent) = face
            .horizontal_line_metrics(px)
            .map(|m| (m.ascent, m.descent))
            .unwrap_or((px, 0.0));
        let baseline = ascent.ceil() as i32;
        let height = (ascent - descent).ceil().max(1.0) as u32;

        let mut cursor = 0.0f32;
        let mut max_x = 0i32;
        let mut prev: Option<char> = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            if let Some(p) = prev {
                cursor += face.horizontal_kern(p, ch, px).unwrap_or(0.0);
            }
            let m = face.metrics(ch, px);
            let x = cursor.round() as i32 + m.xmin;
            let y = baseline - (m.ymin + m.height as i32);
            if m.width > 0 && m.height > 0 {
                max_x = max_x.max(x + m.width as i32);
            }
            glyphs.push(PlacedGlyph { ch, x, y });
            cursor += m.advance_width;
            prev = Some(ch);
        }

        OutlineLine {
            width: (cursor.ceil() as i32).max(max_x).max(0) as u32,
            height,
            glyphs,
        }
    }
}

fn bitmap_size(text: &str, scale: u32) -> TextSize {
    let n = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    let width = if n == 0 {
        0
    } else {
        n.saturating_mul(bitmap_font::ADVANCE.saturating_mul(scale))
            .saturating_sub(scale)
    };
    TextSize {
        width,
        height: bitmap_font::CELL_H * scale,
    }
}

fn rasterize_bitmap(text: &str, scale: u32) -> BacktextResult<GlyphMask> {
    let size = bitmap_size(text, scale);
    let mut mask = GlyphMask::blank(size.width, size.height)?;
    let s = i64::from(scale);
    for (i, ch) in text.chars().enumerate() {
        let rows = bitmap_font::glyph_rows(ch);
        let origin = i as i64 * i64::from(bitmap_font::ADVANCE) * s;
        for row in 0..bitmap_font::CELL_H {
            for col in 0..bitmap_font::CELL_W {
                if !bitmap_font::is_set(&rows, col, row) {
                    continue;
                }
                for dy in 0..s {
                    for dx in 0..s {
                        mask.stamp(
                            origin + i64::from(col) * s + dx,
                            i64::from(row) * s + dy,
                            255,
                        );
                    }
                }
            }
        }
    }
    Ok(mask)
}

/// Resolves logical font names to renderable fonts.
///
/// Resolution never fails: after the alias table, `fonts_dir`, system directories and the
/// configured fallback files, it settles on the built-in bitmap font.
#[derive(Default)]
pub struct FontProvider {
    sources: FontSources,
    faces: Mutex<HashMap<PathBuf, Arc<fontdue::Font>>>,
    /// Candidates already searched for without a match.
    misses: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for FontProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontProvider")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

impl FontProvider {
    /// Provider searching `sources`.
    pub fn new(sources: FontSources) -> Self {
        Self {
            sources,
            faces: Mutex::new(HashMap::new()),
            misses: Mutex::new(HashSet::new()),
        }
    }

    /// Search configuration in use.
    pub fn sources(&self) -> &FontSources {
        &self.sources
    }

    /// Font for `name` at `size` pixels.
    pub fn resolve(&self, name: &str, size: f32) -> Font {
        let size = if size.is_finite() { size.max(1.0) } else { 1.0 };

        for candidate in self.candidates(name) {
            if let Some(path) = self.locate(&candidate) {
                match self.load(&path) {
                    Ok(face) => {
                        tracing::debug!(font = name, path = %path.display(), "resolved font");
                        return Font::with_face(name.to_owned(), face, size);
                    }
                    Err(err) => tracing::warn!(font = name, error = %err, "failed to load font"),
                }
            }
        }

        for file in &self.sources.fallback_font_files {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                self.sources.fonts_dir.join(file)
            };
            let found = if path.is_file() {
                Some(path)
            } else {
                file.to_str().and_then(|f| self.locate(f))
            };
            let Some(path) = found else { continue };
            if let Ok(face) = self.load(&path) {
                tracing::warn!(font = name, fallback = %path.display(), "font not found, using fallback");
                return Font::with_face(name.to_owned(), face, size);
            }
        }

        tracing::warn!(font = name, "font not found, using built-in bitmap font");
        Font::bitmap(size)
    }

    /// Search `fonts_dir` then the system directories, remembering candidates with no match.
    fn locate(&self, candidate: &str) -> Option<PathBuf> {
        if self.is_known_miss(candidate) {
            return None;
        }
        let found = find_font_file(&self.sources.fonts_dir, candidate, 0).or_else(|| {
            self.sources
                .system_font_dirs
                .iter()
                .find_map(|dir| find_font_file(dir, candidate, SYSTEM_SEARCH_DEPTH))
        });
        if found.is_none()
            && let Ok(mut misses) = self.misses.lock()
        {
            misses.insert(candidate.to_owned());
        }
        found
    }

    pub(crate) fn is_known_miss(&self, candidate: &str) -> bool {
        self.misses
            .lock()
            .map(|m| m.contains(candidate))
            .unwrap_or(false)
    }

    fn candidates(&self, name: &str) -> Vec<String> {
        let name = name.trim();
        let mut out = Vec::with_capacity(2);
        if let Some(alias) = self.sources.font_aliases.get(&name.to_ascii_lowercase()) {
            out.push(alias.clone());
        }
        if !name.is_empty() && !out.iter().any(|c| c == name) {
            out.push(name.to_owned());
        }
        out
    }

    fn load(&self, path: &Path) -> BacktextResult<Arc<fontdue::Font>> {
        if let Ok(faces) = self.faces.lock()
            && let Some(face) = faces.get(path)
        {
            return Ok(Arc::clone(face));
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file {}", path.display()))
            .map_err(|e| BacktextError::resource(format!("{e:#}")))?;
        let face = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(
            |e| BacktextError::resource(format!("failed to parse font {}: {e}", path.display())),
        )?;
        let face = Arc::new(face);
        if let Ok(mut faces) = self.faces.lock() {
            faces.insert(path.to_path_buf(), Arc::clone(&face));
        }
        Ok(face)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn matches_candidate(path: &Path, candidate: &str) -> bool {
    if !is_font_file(path) {
        return false;
    }
    if is_font_file(Path::new(candidate)) {
        return path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(candidate));
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| normalize(s) == normalize(candidate))
}

fn find_font_file(dir: &Path, candidate: &str, depth: usize) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    if let Some(hit) = entries
        .iter()
        .find(|p| p.is_file() && matches_candidate(p, candidate))
    {
        return Some(hit.clone());
    }
    if depth == 0 {
        return None;
    }
    entries
        .iter()
        .filter(|p| p.is_dir())
        .find_map(|p| find_font_file(p, candidate, depth - 1))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
