//! Hotspots CLI Tool
//!
//! Command-line interface for inspecting hotspot feeds and simulating playback.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hotspots_core::{
    feed, ChangeKind, EngineConfig, FitMode, Hotspot, LayoutStrategy, RelativeLayout,
    ScaleTransform, Size, StageLayout, StageTransform, TimelineIndex, VisibilityEngine,
    VisibilityUpdate,
};
use hotspots_overlay::Overlay;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "hotspots")]
#[command(about = "Video hotspots - time-bounded annotations over video")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of an annotation feed
    Info {
        /// Annotation list response (JSON)
        input: PathBuf,
    },

    /// Simulate playback over an annotation feed
    Play {
        /// Annotation list response (JSON)
        input: PathBuf,

        /// Native video size, e.g. 1280x720
        #[arg(long)]
        video: Size,

        /// Player viewport size, e.g. 640x480
        #[arg(long)]
        player: Size,

        /// Authoring stage size; switches to stage-pixel layout
        #[arg(long)]
        stage: Option<Size>,

        /// Crop to cover the player instead of letterboxing (relative layout only)
        #[arg(long, conflicts_with = "stage")]
        cover: bool,

        /// Playback start in milliseconds
        #[arg(long, default_value = "0")]
        from: i64,

        /// Playback end in milliseconds (defaults to just past the last event)
        #[arg(long)]
        to: Option<i64>,

        /// Tick interval in milliseconds
        #[arg(long, default_value = "250")]
        step: u32,

        /// Explicit comma-separated tick times, allowing seeks
        #[arg(long, value_delimiter = ',')]
        at: Vec<i64>,

        /// Forward jump past the next boundary treated as a seek
        #[arg(long, default_value = "2000")]
        seek_threshold: i64,
    },

    /// Print the fit transform for a video inside a player
    Fit {
        /// Native video size, e.g. 1280x720
        #[arg(long)]
        video: Size,

        /// Player viewport size, e.g. 640x480
        #[arg(long)]
        player: Size,

        /// Authoring stage size, prints the CSS stage transform as well
        #[arg(long)]
        stage: Option<Size>,

        /// Crop to cover the player instead of letterboxing
        #[arg(long)]
        cover: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Info { input } => show_info(&input)?,

        Commands::Play {
            input,
            video,
            player,
            stage,
            cover,
            from,
            to,
            step,
            at,
            seek_threshold,
        } => {
            let hotspots = load_feed(&input)?;
            let config = EngineConfig {
                seek_threshold_ms: seek_threshold,
            };

            let last_event = TimelineIndex::build(&hotspots).last_time().unwrap_or(0);
            let times: Vec<i64> = if at.is_empty() {
                let step = step.max(1) as usize;
                let to = to.unwrap_or(last_event + step as i64);
                (from..=to).step_by(step).collect()
            } else {
                at
            };

            match stage {
                Some(stage) => {
                    let engine = VisibilityEngine::with_strategy(
                        hotspots,
                        StageLayout::new(stage),
                        config,
                    );
                    play(Overlay::with_engine(engine), video, player, &times);
                }
                None => {
                    let engine = VisibilityEngine::with_strategy(
                        hotspots,
                        RelativeLayout::new(fit_mode(cover)),
                        config,
                    );
                    play(Overlay::with_engine(engine), video, player, &times);
                }
            }
        }

        Commands::Fit {
            video,
            player,
            stage,
            cover,
        } => show_fit(video, player, stage, cover),
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn fit_mode(cover: bool) -> FitMode {
    if cover {
        FitMode::Cover
    } else {
        FitMode::Contain
    }
}

fn load_feed(path: &Path) -> Result<Vec<Hotspot>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open feed {}", path.display()))?;
    let hotspots = feed::read_response(BufReader::new(file)).context("Failed to parse feed")?;
    tracing::info!(count = hotspots.len(), "loaded hotspots");
    Ok(hotspots)
}

fn show_info(input: &Path) -> Result<()> {
    let hotspots = load_feed(input)?;
    let timeline = TimelineIndex::build(&hotspots);
    let schedulable = hotspots.iter().filter(|h| h.is_schedulable()).count();

    println!("\n=== Hotspot Feed Information ===");
    println!("Hotspots: {}", hotspots.len());
    println!("Schedulable: {}", schedulable);
    println!("Timeline events: {}", timeline.len());
    if let (Some(first), Some(last)) = (timeline.first_time(), timeline.last_time()) {
        println!("Active span: {}ms to {}ms", first, last);
    }

    println!("\n=== Hotspots ===");
    for hotspot in &hotspots {
        let end = hotspot
            .end_time_ms
            .map_or_else(|| "end".to_string(), |t| format!("{}ms", t));
        let start = hotspot
            .start_time_ms
            .map_or_else(|| "-".to_string(), |t| format!("{}ms", t));
        println!(
            "  {} [{} to {}] label={:?} click={:?}",
            hotspot.id, start, end, hotspot.label, hotspot.on_click
        );
    }

    println!("\n=== Timeline (first 10 events) ===");
    for (i, event) in timeline.events().iter().take(10).enumerate() {
        let kind = match event.kind {
            ChangeKind::Show => "show",
            ChangeKind::Hide => "hide",
        };
        println!(
            "  [{}] {}ms {} {}",
            i,
            event.time_ms,
            kind,
            hotspots[event.hotspot.index()].id
        );
    }
    if timeline.len() > 10 {
        println!("  ... and {} more events", timeline.len() - 10);
    }

    Ok(())
}

fn play<L: LayoutStrategy>(mut overlay: Overlay<L>, video: Size, player: Size, times: &[i64]) {
    overlay.resize(video, player);
    println!("Simulating {} ticks at {} in {}", times.len(), video, player);

    let mut previous: Option<Vec<String>> = None;
    for &time in times {
        let update = overlay.tick(time);
        let visible: Vec<String> = overlay.visible().iter().map(|r| r.id.clone()).collect();

        let label = match &update {
            VisibilityUpdate::Snapshot(_) if previous.as_ref() == Some(&visible) => None,
            VisibilityUpdate::Snapshot(_) => Some(format!("snapshot [{}]", visible.join(", "))),
            VisibilityUpdate::Delta(delta) if delta.is_empty() => None,
            VisibilityUpdate::Delta(delta) => {
                let engine = overlay.engine();
                let names = |set: &[hotspots_core::HotspotIdx]| {
                    set.iter()
                        .filter_map(|idx| engine.hotspot(*idx))
                        .map(|h| h.id.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                Some(format!("delta +[{}] -[{}]", names(&delta.show), names(&delta.hide)))
            }
        };

        if let Some(label) = label {
            println!("[{:>8}ms] {}", time, label);
            for rendered in overlay.visible() {
                let b = rendered.bounds;
                println!(
                    "    {} at ({:.1}, {:.1}) {:.1}x{:.1}",
                    rendered.id, b.x, b.y, b.width, b.height
                );
            }
        }
        previous = Some(visible);
    }
}

fn show_fit(video: Size, player: Size, stage: Option<Size>, cover: bool) {
    let t = ScaleTransform::fit(video, player, fit_mode(cover));
    println!("Video {} in player {} ({:?})", video, player, fit_mode(cover));
    if t.is_degenerate() {
        println!("  Sizes are not usable, nothing would be rendered");
        return;
    }
    println!("  Fitted size: {:.2}x{:.2}", t.width, t.height);
    println!("  Offset: left {:.2}, top {:.2}", t.left, t.top);
    println!(
        "  Scaled to target {}",
        if t.scale_to_target_width { "width" } else { "height" }
    );

    if let Some(stage) = stage {
        match StageTransform::compute(player, video, stage) {
            Some(stage_transform) => println!("  Stage {}: {}", stage, stage_transform),
            None => println!("  Stage {}: not usable", stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_rejects_cover_with_stage() {
        let args = [
            "hotspots", "play", "feed.json", "--video", "1280x720", "--player", "640x480",
        ];
        assert!(Cli::try_parse_from(args).is_ok());

        let with_cover = args.iter().copied().chain(["--cover"]);
        assert!(Cli::try_parse_from(with_cover).is_ok());

        let both = args.iter().copied().chain(["--stage", "1920x1080", "--cover"]);
        let err = match Cli::try_parse_from(both) {
            Ok(_) => panic!("cover and stage were accepted together"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn fit_accepts_cover_with_stage() {
        let args = [
            "hotspots", "fit", "--video", "1280x720", "--player", "640x480", "--stage",
            "1920x1080", "--cover",
        ];
        assert!(Cli::try_parse_from(args).is_ok());
    }
}
