// src/main.rs

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::path::PathBuf;
use std::time::Duration;

use beatmap_markers::marker_controller::MarkerController;
use beatmap_markers::{MarkerConfig, MarkerSession, PlayerId, TempoGrid, TrackInfo};
use clap::Parser;

#[derive(Parser)]
#[command(name = "marker_player")]
#[command(about = "Interactive bar/beat marker view for a track and its stems")]
struct Args {
    /// Track file for the parent player; a 120 BPM demo track when omitted
    track: Option<PathBuf>,

    /// Stem track as NAME=PATH (repeatable)
    #[arg(short, long = "stem", value_parser = parse_stem)]
    stems: Vec<(String, PathBuf)>,

    /// Optional marker config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where Ctrl+S writes the session
    #[arg(long, default_value = "markers_session.json")]
    session: PathBuf,

    /// log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

fn parse_stem(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{arg}'")),
    }
}

fn build_session(args: &Args) -> anyhow::Result<MarkerSession> {
    let config = match &args.config {
        Some(path) => MarkerConfig::load_from_disk(path)?,
        None => MarkerConfig::default(),
    };

    let mut session = MarkerSession::new(config);

    let parent_track = match &args.track {
        Some(path) => TrackInfo::load_from_disk(path)?,
        None => {
            // No file: a 32s demo track at 120 BPM
            let grid = TempoGrid { beats_per_bar: config.beats_per_bar, ..TempoGrid::default() };
            TrackInfo::new("demo (120 BPM)", Some(32.0), grid.beatmap(32.0))
        }
    };
    session.load_track(&PlayerId::Parent, parent_track)?;

    for (name, path) in &args.stems {
        let track = TrackInfo::load_from_disk(path)?;
        session.players.add_stem(name.clone())?;
        session.load_track(&PlayerId::stem(name.clone()), track)?;
    }

    Ok(session)
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    // Raw mode mangles interleaved log lines; keep the default at warnings.
    simple_logger::SimpleLogger::new()
        .with_level(args.log_level)
        .init()?;

    let session = build_session(&args)?;
    let mut controller = MarkerController::new(session, args.session.clone());

    enable_raw_mode()?;
    let result = run_loop(&mut controller);
    disable_raw_mode()?;
    println!("\n🛑 Exiting marker player.");
    result
}

fn run_loop(controller: &mut MarkerController) -> anyhow::Result<()> {
    // Initial draw
    controller.run_tick()?;

    loop {
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        if let Event::Key(ev) = event::read()? {
            if ev.kind != KeyEventKind::Press {
                continue;
            }
            if ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            if controller.should_quit(ev.code) {
                break;
            }

            controller.handle_key(ev.code, ev.modifiers);
            controller.run_tick()?;
        }
    }
    Ok(())
}
