//! Request-level sequencing: fetch, paint, composite, persist.
//!
//! Pixel work runs synchronously between the fetch and persist awaits. Every request owns its
//! canvas and scratch buffers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::decode::encode_png,
    assets::font::FontProvider,
    config::EngineConfig,
    effects::composite::{BlendMode, compose_over},
    effects::spec::EffectSpec,
    foundation::core::{Position, Rgba8, TextSize},
    foundation::error::{BacktextError, BacktextResult},
    layout::placement::{PlacementCandidate, suggest_positions},
    layout::template::{SubjectPlacement, TemplatePreset, layout_template},
    pipeline::io::{HttpFetcher, ImageFetcher, LocalPublicStore, ObjectStore},
    pipeline::layer::{DramaticText, TextLayer, TextStyle, validate_font_size},
    raster::canvas::Canvas,
    render::text::{RenderTrace, TextEffectRenderer},
};

/// Font sizes rendered by [`Orchestrator::font_size_previews`].
pub const PREVIEW_SIZES: [u32; 6] = [80, 100, 120, 150, 180, 220];

/// A persisted image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Where the PNG was written.
    pub local_path: PathBuf,
    /// URL returned by the object store.
    pub public_url: String,
}

/// Pixel dimensions of a source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Result of a single-layer text render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRender {
    /// Persisted image.
    pub artifact: Artifact,
    /// Box of the rendered text.
    pub text_size: TextSize,
    /// Position as requested.
    pub position: Position,
    /// Size of the background.
    pub image_size: ImageSize,
}

/// Result of [`Orchestrator::create_template`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRender {
    /// Persisted image.
    pub artifact: Artifact,
    /// Template used.
    pub template: TemplatePreset,
    /// Where the subject landed.
    pub subject: SubjectPlacement,
}

/// One rendered preview of [`Orchestrator::font_size_previews`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontPreview {
    /// Pixel size used.
    pub font_size: u32,
    /// URL of the preview image.
    pub public_url: String,
}

/// Owns the collaborators and runs whole requests.
pub struct Orchestrator {
    config: EngineConfig,
    fonts: FontProvider,
    renderer: TextEffectRenderer,
    fetcher: Arc<dyn ImageFetcher>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator with the HTTP/disk fetcher and the local public store.
    pub fn new(config: EngineConfig) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(config.base_dir.clone()));
        let store = Arc::new(LocalPublicStore::new(
            config.public_path(),
            config.public_url_prefix.clone(),
        ));
        Self::with_collaborators(config, fetcher, store)
    }

    /// Orchestrator with custom fetch and storage collaborators.
    pub fn with_collaborators(
        config: EngineConfig,
        fetcher: Arc<dyn ImageFetcher>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            fonts: FontProvider::new(config.font_sources()),
            renderer: TextEffectRenderer::new(config.effect_presets.clone()),
            config,
            fetcher,
            store,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Font provider shared by all requests.
    pub fn fonts(&self) -> &FontProvider {
        &self.fonts
    }

    /// Effect renderer holding the presets.
    pub fn renderer(&self) -> &TextEffectRenderer {
        &self.renderer
    }

    /// Paint `layers` in order onto `canvas`.
    ///
    /// Every layer's effects are resolved before the first pixel is touched, so invalid input
    /// never leaves a half-painted canvas.
    pub fn render_layers(
        &self,
        canvas: &mut Canvas,
        layers: &[TextLayer],
    ) -> BacktextResult<Vec<RenderTrace>> {
        let specs = self.prepare(layers)?;
        self.paint(canvas, layers, &specs)
    }

    fn prepare(&self, layers: &[TextLayer]) -> BacktextResult<Vec<Option<EffectSpec>>> {
        layers
            .iter()
            .map(|l| self.resolve_effects(l.style()))
            .collect()
    }

    fn paint(
        &self,
        canvas: &mut Canvas,
        layers: &[TextLayer],
        specs: &[Option<EffectSpec>],
    ) -> BacktextResult<Vec<RenderTrace>> {
        let mut traces = Vec::with_capacity(layers.len());
        for (i, (layer, fx)) in layers.iter().zip(specs).enumerate() {
            let style = layer.style();
            let font = self.fonts.resolve(&style.font_name, style.font_size);
            tracing::debug!(
                layer = i,
                text = layer.text(),
                font = font.name(),
                size = style.font_size,
                "painting text layer"
            );
            traces.push(self.renderer.render_text(
                canvas,
                layer.text(),
                layer.position(),
                &font,
                style.color,
                fx.as_ref(),
            )?);
        }
        Ok(traces)
    }

    fn resolve_effects(&self, style: &TextStyle) -> BacktextResult<Option<EffectSpec>> {
        match &style.effects {
            Some(req) if !req.is_empty() => self.renderer.resolve(req).map(Some),
            _ => Ok(None),
        }
    }

    /// Render one text layer over `background` and persist the result.
    #[tracing::instrument(skip(self, layer), fields(text = layer.text()))]
    pub async fn add_text(&self, background: &str, layer: &TextLayer) -> BacktextResult<TextRender> {
        let layers = std::slice::from_ref(layer);
        let specs = self.prepare(layers)?;
        let mut canvas = self.fetcher.fetch(background).await?;
        let image_size = ImageSize {
            width: canvas.width(),
            height: canvas.height(),
        };
        let traces = self.paint(&mut canvas, layers, &specs)?;
        let text_size = traces.first().map(|t| t.text_size).unwrap_or_default();

        let artifact = self
            .persist(&canvas, &format!("{}_text", source_stem(background)))
            .await?;
        Ok(TextRender {
            artifact,
            text_size,
            position: layer.position(),
            image_size,
        })
    }

    /// Headline convenience mode; see [`DramaticText`].
    #[tracing::instrument(skip(self, request), fields(text = %request.text))]
    pub async fn add_dramatic_text(
        &self,
        background: &str,
        request: DramaticText,
    ) -> BacktextResult<TextRender> {
        let layer = request.into_layer()?;
        self.add_text(background, &layer).await
    }

    /// Render several layers in paint order and persist once.
    #[tracing::instrument(skip(self, layers), fields(layers = layers.len()))]
    pub async fn add_text_layers(
        &self,
        background: &str,
        layers: &[TextLayer],
    ) -> BacktextResult<Artifact> {
        if layers.is_empty() {
            return Err(BacktextError::input("at least one text layer is required"));
        }
        let specs = self.prepare(layers)?;
        let mut canvas = self.fetcher.fetch(background).await?;
        self.paint(&mut canvas, layers, &specs)?;
        self.persist(&canvas, "multilayer").await
    }

    /// Merge `foreground` over `background`.
    #[tracing::instrument(skip(self))]
    pub async fn compose_final(
        &self,
        background: &str,
        foreground: &str,
        mode: BlendMode,
        opacity: f32,
    ) -> BacktextResult<Artifact> {
        let bg = self.fetcher.fetch(background).await?;
        let fg = self.fetcher.fetch(foreground).await?;
        let out = compose_over(&bg, &fg, mode, opacity)?;
        self.persist(&out, "composed").await
    }

    /// Center `foreground` on a fixed-size social canvas.
    #[tracing::instrument(skip(self))]
    pub async fn create_template(
        &self,
        foreground: &str,
        template: TemplatePreset,
        background_color: Rgba8,
        padding_percent: u32,
    ) -> BacktextResult<TemplateRender> {
        let subject = self.fetcher.fetch(foreground).await?;
        let (canvas, placement) =
            layout_template(&subject, template, background_color, padding_percent)?;
        let artifact = self
            .persist(&canvas, &format!("template_{}", template.name()))
            .await?;
        Ok(TemplateRender {
            artifact,
            template,
            subject: placement,
        })
    }

    /// Best positions for `text` on `background`.
    #[tracing::instrument(skip(self))]
    pub async fn suggest_text_positions(
        &self,
        background: &str,
        text: &str,
        font_name: &str,
        font_size: f32,
    ) -> BacktextResult<Vec<PlacementCandidate>> {
        if text.trim().is_empty() {
            return Err(BacktextError::input("text must not be empty"));
        }
        validate_font_size(font_size)?;
        let canvas = self.fetcher.fetch(background).await?;
        let font = self.fonts.resolve(font_name, font_size);
        Ok(suggest_positions(&canvas, font.measure(text)))
    }

    /// Render `text` at each of [`PREVIEW_SIZES`] with no effects.
    #[tracing::instrument(skip(self))]
    pub async fn font_size_previews(
        &self,
        background: &str,
        text: &str,
        position: Position,
        font_name: &str,
    ) -> BacktextResult<Vec<FontPreview>> {
        let layers = PREVIEW_SIZES
            .iter()
            .map(|&size| {
                TextLayer::new(
                    text,
                    position,
                    TextStyle {
                        font_name: font_name.to_owned(),
                        font_size: size as f32,
                        color: self.config.defaults.color,
                        effects: None,
                    },
                )
            })
            .collect::<BacktextResult<Vec<_>>>()?;

        let base = self.fetcher.fetch(background).await?;
        let stem = format!("{}_preview", source_stem(background));
        let mut out = Vec::with_capacity(layers.len());
        for (size, layer) in PREVIEW_SIZES.iter().zip(&layers) {
            let mut canvas = base.try_clone()?;
            self.paint(&mut canvas, std::slice::from_ref(layer), &[None])?;
            let artifact = self.persist(&canvas, &format!("{stem}{size}")).await?;
            out.push(FontPreview {
                font_size: *size,
                public_url: artifact.public_url,
            });
        }
        Ok(out)
    }

    /// Write `canvas` as `<output_dir>/<stem>_<unix millis>.png` and upload it.
    ///
    /// The local file is removed if the write or the upload fails, or if the returned future
    /// is dropped before the upload completes.
    #[tracing::instrument(skip(self, canvas), fields(width = canvas.width(), height = canvas.height()))]
    pub async fn persist(&self, canvas: &Canvas, stem: &str) -> BacktextResult<Artifact> {
        let png = encode_png(canvas)?;
        let dir = self.config.output_path();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create output dir {}", dir.display()))
            .map_err(|e| BacktextError::io(format!("{e:#}")))?;

        let millis = chrono::Utc::now().timestamp_millis();
        let pending = PendingFile::new(dir.join(format!("{stem}_{millis}.png")));
        tokio::fs::write(pending.path(), &png)
            .await
            .with_context(|| format!("write {}", pending.path().display()))
            .map_err(|e| BacktextError::io(format!("{e:#}")))?;

        let public_url = self.store.upload(pending.path()).await?;
        let local_path = pending.keep();
        tracing::info!(path = %local_path.display(), url = %public_url, "persisted");
        Ok(Artifact {
            local_path,
            public_url,
        })
    }
}

/// A local artifact that is deleted on drop unless [`PendingFile::keep`] is called.
#[derive(Debug)]
struct PendingFile {
    path: PathBuf,
    armed: bool,
}

impl PendingFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let path = &self.path;
        match std::fs::remove_file(path) {
            Ok(()) => tracing::warn!(path = %path.display(), "discarded unpublished artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to discard unpublished artifact")
            }
        }
    }
}

/// File stem of a path or URL, used to name derived artifacts.
pub fn source_stem(source: &str) -> String {
    let last = source
        .split(['?', '#'])
        .next()
        .unwrap_or(source)
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("");
    let stem = last.rsplit_once('.').map_or(last, |(s, _)| s);
    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "image".to_owned()
    } else {
        stem
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
