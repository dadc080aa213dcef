use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "backtext", version)]
struct Cli {
    /// Engine configuration JSON; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint one text layer onto a background.
    Text(TextArgs),
    /// Paint an uppercased headline with shadow and outline.
    Dramatic(DramaticArgs),
    /// Paint every layer from a JSON array onto a background.
    Layers(LayersArgs),
    /// Composite a foreground subject over a background.
    Compose(ComposeArgs),
    /// Center a subject on a social-media canvas.
    Template(TemplateArgs),
    /// Suggest text positions for a background.
    Suggest(SuggestArgs),
    /// Render the text at several font sizes.
    Previews(PreviewArgs),
}

#[derive(Parser, Debug)]
struct PlacementArgs {
    /// Background image path or URL.
    #[arg(long)]
    background: String,

    #[arg(long)]
    text: String,

    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    x: i32,

    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    y: i32,

    /// Logical font name; defaults to the configured font.
    #[arg(long)]
    font: Option<String>,
}

#[derive(Parser, Debug)]
struct TextArgs {
    #[command(flatten)]
    at: PlacementArgs,

    #[arg(long)]
    size: Option<f32>,

    /// Fill color as hex.
    #[arg(long)]
    color: Option<String>,

    /// Effect request JSON, inline or `@path`.
    #[arg(long)]
    effects: Option<String>,
}

#[derive(Parser, Debug)]
struct DramaticArgs {
    #[command(flatten)]
    at: PlacementArgs,

    #[arg(long, default_value_t = 150.0)]
    size: f32,

    #[arg(long)]
    color: Option<String>,

    #[arg(long)]
    effects: Option<String>,

    /// Keep the original letter case.
    #[arg(long)]
    keep_case: bool,

    /// Do not append a trailing period.
    #[arg(long)]
    no_period: bool,
}

#[derive(Parser, Debug)]
struct LayersArgs {
    #[arg(long)]
    background: String,

    /// JSON array of text layers.
    #[arg(long)]
    layers: PathBuf,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    #[arg(long)]
    background: String,

    #[arg(long)]
    foreground: String,

    /// normal, multiply, screen, darken or lighten.
    #[arg(long, default_value = "normal")]
    mode: String,

    #[arg(long, default_value_t = 1.0)]
    opacity: f32,
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    #[arg(long)]
    foreground: String,

    #[arg(long, default_value = "instagram_post")]
    template: String,

    #[arg(long, default_value = "#000000")]
    background_color: String,

    #[arg(long, default_value_t = 10)]
    padding: u32,
}

#[derive(Parser, Debug)]
struct SuggestArgs {
    #[arg(long)]
    background: String,

    #[arg(long)]
    text: String,

    #[arg(long)]
    font: Option<String>,

    #[arg(long)]
    size: Option<f32>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    at: PlacementArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => backtext::EngineConfig::from_json_file(path)?,
        None => backtext::EngineConfig::default(),
    };
    let orch = backtext::Orchestrator::new(config);

    match cli.cmd {
        Command::Text(args) => cmd_text(&orch, args).await,
        Command::Dramatic(args) => cmd_dramatic(&orch, args).await,
        Command::Layers(args) => cmd_layers(&orch, args).await,
        Command::Compose(args) => cmd_compose(&orch, args).await,
        Command::Template(args) => cmd_template(&orch, args).await,
        Command::Suggest(args) => cmd_suggest(&orch, args).await,
        Command::Previews(args) => cmd_previews(&orch, args).await,
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_color(hex: Option<&str>, default: backtext::Rgba8) -> anyhow::Result<backtext::Rgba8> {
    Ok(match hex {
        Some(s) => s.parse()?,
        None => default,
    })
}

fn parse_effects(arg: Option<&str>) -> anyhow::Result<Option<backtext::EffectRequest>> {
    let Some(raw) = arg else {
        return Ok(None);
    };
    let req = match raw.strip_prefix('@') {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("open effects '{path}'"))?;
            serde_json::from_reader(BufReader::new(f)).with_context(|| "parse effects JSON")?
        }
        None => serde_json::from_str(raw).with_context(|| "parse effects JSON")?,
    };
    Ok(Some(req))
}

fn read_layers_json(path: &Path) -> anyhow::Result<Vec<backtext::TextLayer>> {
    let f = File::open(path).with_context(|| format!("open layers '{}'", path.display()))?;
    let layers = serde_json::from_reader(BufReader::new(f)).with_context(|| "parse layers JSON")?;
    Ok(layers)
}

async fn cmd_text(orch: &backtext::Orchestrator, args: TextArgs) -> anyhow::Result<()> {
    let defaults = &orch.config().defaults;
    let style = backtext::TextStyle {
        font_name: args.at.font.unwrap_or_else(|| defaults.font_name.clone()),
        font_size: args.size.unwrap_or(defaults.font_size),
        color: parse_color(args.color.as_deref(), defaults.color)?,
        effects: parse_effects(args.effects.as_deref())?,
    };
    let layer = backtext::TextLayer::new(
        args.at.text,
        backtext::Position::new(args.at.x, args.at.y),
        style,
    )?;
    print_json(&orch.add_text(&args.at.background, &layer).await?)
}

async fn cmd_dramatic(orch: &backtext::Orchestrator, args: DramaticArgs) -> anyhow::Result<()> {
    let defaults = &orch.config().defaults;
    let request = backtext::DramaticText {
        text: args.at.text,
        position: backtext::Position::new(args.at.x, args.at.y),
        font_name: args.at.font.unwrap_or_else(|| defaults.font_name.clone()),
        font_size: args.size,
        color: parse_color(args.color.as_deref(), defaults.color)?,
        effects: parse_effects(args.effects.as_deref())?,
        uppercase: !args.keep_case,
        with_period: !args.no_period,
    };
    print_json(&orch.add_dramatic_text(&args.at.background, request).await?)
}

async fn cmd_layers(orch: &backtext::Orchestrator, args: LayersArgs) -> anyhow::Result<()> {
    let layers = read_layers_json(&args.layers)?;
    print_json(&orch.add_text_layers(&args.background, &layers).await?)
}

async fn cmd_compose(orch: &backtext::Orchestrator, args: ComposeArgs) -> anyhow::Result<()> {
    let mode = backtext::BlendMode::from_name(&args.mode);
    print_json(
        &orch
            .compose_final(&args.background, &args.foreground, mode, args.opacity)
            .await?,
    )
}

async fn cmd_template(orch: &backtext::Orchestrator, args: TemplateArgs) -> anyhow::Result<()> {
    let template: backtext::TemplatePreset = args.template.parse()?;
    let color: backtext::Rgba8 = args.background_color.parse()?;
    print_json(
        &orch
            .create_template(&args.foreground, template, color, args.padding)
            .await?,
    )
}

async fn cmd_suggest(orch: &backtext::Orchestrator, args: SuggestArgs) -> anyhow::Result<()> {
    let defaults = &orch.config().defaults;
    let font = args.font.unwrap_or_else(|| defaults.font_name.clone());
    let size = args.size.unwrap_or(defaults.font_size);
    print_json(
        &orch
            .suggest_text_positions(&args.background, &args.text, &font, size)
            .await?,
    )
}

async fn cmd_previews(orch: &backtext::Orchestrator, args: PreviewArgs) -> anyhow::Result<()> {
    let font = args
        .at
        .font
        .unwrap_or_else(|| orch.config().defaults.font_name.clone());
    print_json(
        &orch
            .font_size_previews(
                &args.at.background,
                &args.at.text,
                backtext::Position::new(args.at.x, args.at.y),
                &font,
            )
            .await?,
    )
}
