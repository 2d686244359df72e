//! # Slide Canvas CLI
//!
//! Headless host for the slide canvas engine.
//!
//! Loads a slide document, mounts a canvas for the requested container and
//! display, optionally replays recorded input events, then writes the
//! device-scaled backing store and a thumbnail to disk.
//!
//! ## Usage
//!
//! ```bash
//! slide-canvas --input deck/slide-1.json --pixel-ratio 2 --output slide.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Everything a run needs, derived from `CliArgs`
//! - `run` - Mounts the engine, drives it and writes outputs

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use slide_core::{
    DisplayCapabilities, DisplaySignals, FileGuidanceStore, InputEvent, MemorySlideStore,
    PlannerConfig, QualityMode, Slide, SlideId,
};
use slide_engine::{EngineConfig, SlideCanvas};
use slide_renderer::{parse_color, ExportFormat, FrameStats, RendererConfig};

/// Quality mode flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    /// Full device scale up to the tier ceiling.
    Standard,
    /// Device scale capped at 2.
    Performance,
}

impl From<QualityArg> for QualityMode {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Standard => Self::Standard,
            QualityArg::Performance => Self::Performance,
        }
    }
}

/// Thumbnail format flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG document.
    Svg,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => Self::Png,
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Svg => Self::Svg,
        }
    }
}

/// Command-line arguments for slide-canvas.
#[derive(Debug, Clone, Parser)]
#[command(name = "slide-canvas")]
#[command(about = "Render a slide canvas headlessly")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
pub struct CliArgs {
    /// Slide document (JSON). Without it the slide starts empty.
    #[arg(long, env = "SLIDE_INPUT")]
    pub input: Option<PathBuf>,

    /// Directory of persisted `slide-<id>.json` files, used instead of --input
    #[arg(long, env = "SLIDE_DATA_DIR", conflicts_with = "input")]
    pub data_dir: Option<PathBuf>,

    /// Slide to mount when no document sets one
    #[arg(long, env = "SLIDE_ID", default_value = "1")]
    pub slide_id: SlideId,

    /// Recorded input events (JSON array) replayed after mounting
    #[arg(long, env = "SLIDE_EVENTS")]
    pub events: Option<PathBuf>,

    /// Container width in CSS pixels
    #[arg(long, env = "SLIDE_WIDTH", default_value = "1280")]
    pub width: f64,

    /// Container height in CSS pixels
    #[arg(long, env = "SLIDE_HEIGHT", default_value = "720")]
    pub height: f64,

    /// Device pixel ratio of the display
    #[arg(long, env = "SLIDE_PIXEL_RATIO")]
    pub pixel_ratio: Option<f64>,

    /// Screen width in CSS pixels, used for 4K/8K detection
    #[arg(long, env = "SLIDE_SCREEN_WIDTH")]
    pub screen_width: Option<u32>,

    /// Screen height in CSS pixels
    #[arg(long, env = "SLIDE_SCREEN_HEIGHT")]
    pub screen_height: Option<u32>,

    /// Quality mode
    #[arg(long, env = "SLIDE_QUALITY", value_enum, default_value = "standard")]
    pub quality: QualityArg,

    /// Mount the canvas read-only
    #[arg(long, env = "SLIDE_READ_ONLY")]
    pub read_only: bool,

    /// Background color
    #[arg(long, env = "SLIDE_BACKGROUND", default_value = "#ffffff")]
    pub background: String,

    /// Disable anti-aliasing
    #[arg(long)]
    pub no_anti_aliasing: bool,

    /// Skip loading system fonts (text is not drawn)
    #[arg(long, env = "SLIDE_NO_SYSTEM_FONTS")]
    pub no_system_fonts: bool,

    /// Output file for the backing store (PNG)
    #[arg(long, short, env = "SLIDE_OUTPUT", default_value = "slide.png")]
    pub output: PathBuf,

    /// Output file for a thumbnail
    #[arg(long, env = "SLIDE_THUMBNAIL")]
    pub thumbnail: Option<PathBuf>,

    /// Thumbnail width in pixels
    #[arg(long, default_value = "320")]
    pub thumbnail_width: u32,

    /// Thumbnail format
    #[arg(long, value_enum, default_value = "png")]
    pub thumbnail_format: FormatArg,

    /// First-use guidance flag file
    #[arg(long, env = "SLIDE_GUIDANCE_FILE")]
    pub guidance_file: Option<PathBuf>,

    /// Print the keyboard shortcuts and exit
    #[arg(long)]
    pub list_shortcuts: bool,
}

/// Where the slide comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideSource {
    /// A single slide document.
    File(PathBuf),
    /// A persisted store directory.
    DataDir(PathBuf),
    /// An empty slide.
    Empty,
}

/// Thumbnail output settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailConfig {
    /// Output path.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Encoding.
    pub format: ExportFormat,
}

/// Host configuration for one run.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Slide source.
    pub source: SlideSource,
    /// Slide to mount.
    pub slide_id: SlideId,
    /// Recorded input events.
    pub events: Option<PathBuf>,
    /// Container size in CSS pixels.
    pub container: (f64, f64),
    /// Raw display signals.
    pub signals: DisplaySignals,
    /// Engine configuration.
    pub engine: EngineConfig,
    /// Backing store output path.
    pub output: PathBuf,
    /// Thumbnail output, if requested.
    pub thumbnail: Option<ThumbnailConfig>,
    /// First-use guidance flag file.
    pub guidance_file: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            source: SlideSource::Empty,
            slide_id: 1,
            events: None,
            container: (1280.0, 720.0),
            signals: DisplaySignals::default(),
            engine: EngineConfig::default(),
            output: PathBuf::from("slide.png"),
            thumbnail: None,
            guidance_file: None,
        }
    }
}

impl From<CliArgs> for HostConfig {
    fn from(args: CliArgs) -> Self {
        let background = parse_color(&args.background).map_or_else(
            || {
                tracing::warn!("Unknown background '{}', using white", args.background);
                RendererConfig::default().background
            },
            |c| c.0,
        );
        let source = match (args.input, args.data_dir) {
            (Some(path), _) => SlideSource::File(path),
            (None, Some(dir)) => SlideSource::DataDir(dir),
            (None, None) => SlideSource::Empty,
        };

        Self {
            source,
            slide_id: args.slide_id,
            events: args.events,
            container: (args.width, args.height),
            signals: DisplaySignals {
                device_pixel_ratio: args.pixel_ratio,
                screen_width: args.screen_width,
                screen_height: args.screen_height,
            },
            engine: EngineConfig {
                editable: !args.read_only,
                planner: PlannerConfig {
                    quality: args.quality.into(),
                    ..PlannerConfig::default()
                },
                renderer: RendererConfig {
                    background,
                    anti_aliasing: !args.no_anti_aliasing,
                    load_system_fonts: !args.no_system_fonts,
                },
                ..EngineConfig::default()
            },
            output: args.output,
            thumbnail: args.thumbnail.map(|path| ThumbnailConfig {
                path,
                width: args.thumbnail_width,
                format: args.thumbnail_format.into(),
            }),
            guidance_file: args.guidance_file,
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Slide that was rendered.
    pub slide_id: SlideId,
    /// Elements on the slide after replaying events.
    pub elements: usize,
    /// Backing store size in pixels.
    pub backing_size: (u32, u32),
    /// Display size in CSS pixels.
    pub display_size: (u32, u32),
    /// Stats of the final frame.
    pub frame: FrameStats,
}

/// Mount a canvas, drive it and write the outputs.
///
/// # Errors
///
/// Returns an error if inputs cannot be read, the container is unusable,
/// the frame fails to render, or outputs cannot be written.
pub fn run(config: &HostConfig) -> anyhow::Result<RunSummary> {
    let (store, slide_id) = open_store(config)?;
    let capabilities = DisplayCapabilities::probe(&config.signals);

    let mut canvas = SlideCanvas::new(
        Arc::clone(&store),
        slide_id,
        config.engine.clone(),
        capabilities,
    );
    if let Some(path) = &config.guidance_file {
        canvas = canvas.with_guidance_store(Box::new(FileGuidanceStore::open(path)));
    }

    let (width, height) = config.container;
    anyhow::ensure!(
        canvas.resize(width, height),
        "cannot lay out a slide in a {width}x{height} container"
    );

    if canvas.should_show_guidance() {
        tracing::info!("First use: press Ctrl+T, Ctrl+R or Ctrl+O to add content");
        canvas.mark_guidance_shown();
    }

    if let Some(path) = &config.events {
        let events = read_events(path)?;
        tracing::info!("Replaying {} input events", events.len());
        canvas.set_focus(true);
        for event in &events {
            if let Some(action) = canvas.handle_input(event) {
                tracing::debug!("Event resolved to {action:?}");
            }
        }
    }

    let frame = canvas.render();
    if let Some(reason) = canvas.error() {
        anyhow::bail!("render failed: {reason}");
    }
    let frame = frame.context("canvas never became ready")?;

    let surface = canvas.surface().context("no surface")?;
    let png = surface.encode_png()?;
    write_output(&config.output, &png)?;
    tracing::info!(
        "Wrote {}x{} backing store to {}",
        surface.backing_size().0,
        surface.backing_size().1,
        config.output.display()
    );

    let summary = RunSummary {
        slide_id,
        elements: canvas.elements().len(),
        backing_size: surface.backing_size(),
        display_size: surface.display_size(),
        frame,
    };

    if let Some(thumb) = &config.thumbnail {
        let bytes = canvas
            .export(thumb.format, thumb.width)
            .context("thumbnail export failed")?;
        write_output(&thumb.path, &bytes)?;
        tracing::info!("Wrote thumbnail to {}", thumb.path.display());
    }

    if let SlideSource::DataDir(_) = config.source {
        if let Some(uri) = canvas.thumbnail_data_uri(160) {
            store.set_thumbnail(slide_id, Some(uri))?;
        }
    }

    Ok(summary)
}

fn open_store(config: &HostConfig) -> anyhow::Result<(Arc<MemorySlideStore>, SlideId)> {
    match &config.source {
        SlideSource::File(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let slide = Slide::from_json(&json)
                .with_context(|| format!("parsing {}", path.display()))?;
            let slide_id = slide.id;
            let store = MemorySlideStore::new();
            store.insert_slide(slide);
            tracing::info!("Loaded slide {slide_id} from {}", path.display());
            Ok((Arc::new(store), slide_id))
        }
        SlideSource::DataDir(dir) => {
            let store = MemorySlideStore::with_data_dir(dir)?;
            let loaded = store.load_all_slides()?;
            tracing::info!("Loaded {} slides from {}", loaded.len(), dir.display());
            if !loaded.contains(&config.slide_id) {
                tracing::warn!("Slide {} not found, starting empty", config.slide_id);
            }
            Ok((Arc::new(store), config.slide_id))
        }
        SlideSource::Empty => Ok((Arc::new(MemorySlideStore::new()), config.slide_id)),
    }
}

fn read_events(path: &Path) -> anyhow::Result<Vec<InputEvent>> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

/// Keyboard shortcut listing, one per line.
#[must_use]
pub fn shortcut_help() -> String {
    slide_core::ShortcutDispatcher::shortcuts()
        .iter()
        .map(|s| format!("{:<12} {}", s.format(), s.description))
        .collect::<Vec<_>>()
        .join("\n")
}
