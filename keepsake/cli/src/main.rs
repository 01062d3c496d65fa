//! Keepsake - mint journal entries into styled artifacts
//!
//! # Usage
//!
//! ```bash
//! # List styles
//! keepsake styles
//!
//! # Render one entry to a PNG
//! keepsake render --style polaroid --content "First snow" --photo snow.jpg --out snow.png
//!
//! # Full mint: ritual, render, archive
//! keepsake mint --style wax-envelope --content "Dear future me" --out-dir ~/keepsakes
//!
//! # Verbose logging
//! RUST_LOG=debug keepsake mint ...
//! ```

mod archive;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use keepsake_core::config::{load_config, load_config_from_path};
use keepsake_core::{
    ArtifactRenderer, ArtifactStyle, ConfigOverrides, Draft, DraftPatch, KeepsakeConfig,
    MintDependencies, MintEvent, MintFlowController, MintSettings, Mood, Photo, RasterRenderer,
    RecordId, Weather,
};

use archive::{DirectoryArchive, LogFeedback};

/// Keepsake - turn journal entries into keepsakes
#[derive(Parser, Debug)]
#[command(name = "keepsake")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, env = "KEEPSAKE_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "KEEPSAKE_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List styles with family, canvas and photo cap
    Styles,

    /// Render one entry to a PNG
    Render {
        #[command(flatten)]
        entry: EntryArgs,

        /// Output PNG path
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Draft, commit, play the ritual and archive the result
    Mint {
        #[command(flatten)]
        entry: EntryArgs,

        /// Directory receiving `<id>.png` and `<id>.json`
        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,

        /// Fixed decoration seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct EntryArgs {
    /// Artifact style id (see `keepsake styles`)
    #[arg(short, long, default_value = "simple")]
    style: String,

    /// Entry text
    #[arg(long, default_value = "")]
    content: String,

    /// Mood label
    #[arg(long)]
    mood: Option<String>,

    /// Entry date (YYYY-MM-DD), today if omitted
    #[arg(long)]
    date: Option<String>,

    /// Weather label
    #[arg(long)]
    weather: Option<String>,

    /// Photo file, repeatable
    #[arg(long = "photo", value_name = "PATH")]
    photos: Vec<PathBuf>,

    /// Export width in logical points; width x scale is capped at 8192 pixels
    #[arg(long)]
    width: Option<u32>,

    /// Pixels per logical point
    #[arg(long)]
    scale: Option<f32>,
}

impl EntryArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            export_width: self.width,
            export_scale: self.scale,
            decoration_seed: None,
        }
    }

    /// Unknown styles fall back to the plain card with a warning
    fn style(&self) -> ArtifactStyle {
        self.style.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to the simple style");
            ArtifactStyle::Simple
        })
    }

    async fn patch(&self) -> Result<DraftPatch> {
        let mut patch = DraftPatch::new().style(self.style()).content(&self.content);

        if let Some(mood) = &self.mood {
            let mood: Mood = mood.parse().map_err(anyhow::Error::msg)?;
            patch = patch.mood(mood);
        }
        if let Some(date) = &self.date {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date: {date}"))?;
            patch = patch.date(date);
        }
        if let Some(weather) = &self.weather {
            let weather: Weather = weather.parse().map_err(anyhow::Error::msg)?;
            patch = patch.weather(Some(weather));
        }
        for path in &self.photos {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read photo: {}", path.display()))?;
            patch = patch.add_photo(Photo::new(bytes));
        }
        Ok(patch)
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("keepsake={level},keepsake_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load(path: Option<&PathBuf>, overrides: &ConfigOverrides) -> Result<KeepsakeConfig> {
    let mut config = match path {
        Some(path) => load_config_from_path(Some(path.clone())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;
    overrides
        .apply(&mut config)
        .context("Invalid command-line override")?;
    info!(source = %config.source(), "Configuration ready");
    Ok(config)
}

fn list_styles() {
    println!("{:<16} {:<14} {:>7} {:>6}", "STYLE", "FAMILY", "ASPECT", "PHOTOS");
    for style in ArtifactStyle::ALL {
        let canvas = style.canvas();
        println!(
            "{:<16} {:<14} {:>7.2} {:>6}",
            style.id(),
            style.family().label(),
            canvas.aspect_ratio,
            style.max_photos()
        );
    }
}

async fn render(config: &KeepsakeConfig, entry: &EntryArgs, out: &PathBuf) -> Result<()> {
    let mut draft = Draft::new();
    draft.apply(entry.patch().await?);
    let id = RecordId::new();
    let decoration = config.decoration_roller().roll(id, draft.style, draft.date);
    let record = Arc::new(draft.finalize(id, decoration));

    let renderer = RasterRenderer::default().with_min_canvas(config.render.min_canvas);
    let image = renderer
        .render(record, config.render.export_width, config.render.export_scale)
        .await;
    let png = image.encode_png().context("Failed to encode PNG")?;
    tokio::fs::write(out, png)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;

    info!(path = %out.display(), width = image.width(), height = image.height(), "Rendered");
    Ok(())
}

async fn mint(config: &KeepsakeConfig, entry: &EntryArgs, out_dir: PathBuf) -> Result<()> {
    let archive = Arc::new(DirectoryArchive::new(out_dir));
    let deps = MintDependencies::from_config(config, archive.clone())
        .with_feedback(Arc::new(LogFeedback));
    let mut flow = MintFlowController::new(deps, MintSettings::from_config(config));
    let mut events = flow.subscribe(64);

    flow.update_draft(entry.patch().await?);
    let record = flow.commit()?;

    while let Some(event) = events.recv().await {
        flow.poll_render();
        let done = matches!(event, MintEvent::RitualCompleted(_));
        log_event(&event);
        if done {
            break;
        }
    }

    flow.save().await.context("Failed to save artifact")?;
    while let Ok(event) = events.try_recv() {
        log_event(&event);
    }

    println!("{}", archive.image_path(&record).display());
    Ok(())
}

fn log_event(event: &MintEvent) {
    match event {
        MintEvent::PhaseFired { label, index, total } => {
            info!(phase = %label, step = index + 1, total, "Ritual phase");
        }
        MintEvent::RitualCompleted(summary) => {
            info!(
                ritual = %summary.name,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                forced = summary.forced,
                "Ritual complete"
            );
        }
        other => tracing::debug!(event = ?other, "Mint event"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match &cli.command {
        Command::Styles => list_styles(),
        Command::Render { entry, out } => {
            let config = load(cli.config.as_ref(), &entry.overrides())?;
            render(&config, entry, out).await?;
        }
        Command::Mint {
            entry,
            out_dir,
            seed,
        } => {
            let mut overrides = entry.overrides();
            overrides.decoration_seed = *seed;
            let config = load(cli.config.as_ref(), &overrides)?;
            mint(&config, entry, out_dir.clone()).await?;
        }
    }

    Ok(())
}
