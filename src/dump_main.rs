// src/dump_main.rs

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use beatmap_markers::render::{self, MarkerPosition};
use beatmap_markers::{Marker, MarkerConfig, MarkerFrequency, SnapFallback, TrackInfo, compute_markers};

#[derive(Parser)]
#[command(name = "marker_dump")]
#[command(about = "Print the bar/beat markers of a track beatmap as JSON")]
struct Args {
    /// Track file: { "name", "duration", "beatmap": [{ "time", "beatNumber" }] }
    track: PathBuf,

    /// Treat TRACK as raw detector output: a JSON array of beat times in seconds
    #[arg(long)]
    beat_times: bool,

    /// Bar offset in bars (e.g. 0.25 = one beat in 4/4)
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    offset: f64,

    /// bar8, bar4, bar2, bar, halfbar or beat
    #[arg(short, long, default_value = "bar")]
    frequency: MarkerFrequency,

    /// Optional marker config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snap this time (seconds) to the nearest marker at or before it
    #[arg(long, allow_negative_numbers = true)]
    snap: Option<f64>,

    /// Use the query time instead of 0 when nothing is at or before it
    #[arg(long)]
    no_snap_fallback: bool,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

#[derive(Serialize)]
struct Output<'a> {
    track: &'a str,
    offset: f64,
    frequency: MarkerFrequency,
    times: Vec<f64>,
    markers: &'a [Marker],
    positions: Vec<MarkerPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapped: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    simple_logger::SimpleLogger::new().with_level(args.log_level).init()?;

    let mut config = match &args.config {
        Some(path) => MarkerConfig::load_from_disk(path)?,
        None => MarkerConfig::default(),
    };
    if args.no_snap_fallback {
        config.snap_fallback = SnapFallback::QueryTime;
    }

    let track = if args.beat_times {
        TrackInfo::load_beat_times(&args.track, config.beats_per_bar)?
    } else {
        TrackInfo::load_from_disk(&args.track)?
    };
    if let Err(e) = track.beatmap.validate_beats(config.beats_per_bar) {
        log::warn!("{}: {}", args.track.display(), e);
    }

    let set = compute_markers(&track.beatmap, args.offset, args.frequency, &config.marker_options());
    log::info!(
        "{}: {} beats -> {} markers at {}",
        track.name,
        track.beatmap.len(),
        set.len(),
        args.frequency
    );

    let output = Output {
        track: &track.name,
        offset: args.offset,
        frequency: args.frequency,
        times: set.times(),
        markers: set.markers(),
        positions: render::marker_positions(&set, track.duration),
        snapped: args.snap.map(|t| set.snap(t, config.snap_fallback)),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("serializing markers")?;
    println!("{json}");
    Ok(())
}
