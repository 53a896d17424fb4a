use std::fs;

use beatmap_markers::{
    BeatMap, MarkerConfig, MarkerFrequency, MarkerPlayer, MarkerSession, PlayerId, ShiftDirection,
    SnapFallback, TempoGrid, TrackInfo,
};
use tempfile::tempdir;

fn grid_track(name: &str, seconds: f64) -> TrackInfo {
    TrackInfo::new(name, Some(seconds), TempoGrid::default().beatmap(seconds))
}

#[test]
fn track_file_loads_camel_case_beatmap() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("track.json");
    fs::write(
        &path,
        r#"{
            "name": "upbeat",
            "duration": 4.0,
            "beatmap": [
                { "time": 0.0, "beatNumber": 2 },
                { "time": 0.5, "beatNumber": 3 },
                { "time": 1.0, "beatNumber": 4 },
                { "time": 1.5, "beatNumber": 1 }
            ]
        }"#,
    )
    .unwrap();

    let track = TrackInfo::load_from_disk(&path).unwrap();
    assert_eq!(track.name, "upbeat");
    assert_eq!(track.beatmap.len(), 4);

    let mut player = MarkerPlayer::new("parent", MarkerConfig::default());
    player.load_track(track);
    assert_eq!(player.markers().times(), vec![0.0, 1.5]);
}

#[test]
fn detector_beat_times_load_as_track() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("detected.json");
    fs::write(&path, "[1.5, 0.0, 0.5, 1.0, 2.0, 2.5, 3.0]").unwrap();

    let track = TrackInfo::load_beat_times(&path, 3).unwrap();
    assert_eq!(track.name, "detected");
    assert_eq!(track.duration, None);

    let config = MarkerConfig { beats_per_bar: 3, ..Default::default() };
    let mut player = MarkerPlayer::new("parent", config);
    player.load_track(track);
    assert_eq!(player.markers().times(), vec![0.0, 1.5, 3.0]);
    assert!(player.marker_positions().is_empty());
}

#[test]
fn out_of_order_track_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{ "name": "bad", "beatmap": [
            { "time": 1.0, "beatNumber": 1 },
            { "time": 0.5, "beatNumber": 2 }
        ] }"#,
    )
    .unwrap();

    assert!(TrackInfo::load_from_disk(&path).is_err());
}

#[test]
fn track_round_trip_keeps_beatmap() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("grid.json");
    let track = grid_track("grid", 6.0);
    track.save_to_disk(&path).unwrap();

    let loaded = TrackInfo::load_from_disk(&path).unwrap();
    assert_eq!(loaded.beatmap, track.beatmap);
    assert_eq!(loaded.duration, Some(6.0));
}

#[test]
fn config_file_drives_new_players() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "default_frequency": "halfbar", "snap_fallback": "query_time" }"#).unwrap();

    let config = MarkerConfig::load_from_disk(&path).unwrap();
    let mut session = MarkerSession::new(config);
    session.load_track(&PlayerId::Parent, grid_track("mix", 4.0)).unwrap();

    let parent = session.players.parent();
    assert_eq!(parent.state().frequency, MarkerFrequency::HalfBar);
    assert_eq!(parent.markers().times(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(parent.config().snap_fallback, SnapFallback::QueryTime);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "beats_per_bar": 0 }"#).unwrap();
    assert!(MarkerConfig::load_from_disk(&path).is_err());
}

#[test]
fn session_round_trip_restores_every_player() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut session = MarkerSession::new(MarkerConfig::default());
    session.players.add_stem("drums").unwrap();
    session.players.add_stem("bass").unwrap();
    let drums = PlayerId::stem("drums");
    let bass = PlayerId::stem("bass");

    session.load_track(&PlayerId::Parent, grid_track("mix", 16.0)).unwrap();
    session.load_track(&drums, grid_track("drums", 16.0)).unwrap();
    session.load_track(&bass, grid_track("bass", 16.0)).unwrap();

    session.set_frequency(&drums, MarkerFrequency::Beat).unwrap();
    session.shift(&drums, ShiftDirection::Right).unwrap();
    session.set_frequency(&bass, MarkerFrequency::Bar2).unwrap();
    session.shift(&bass, ShiftDirection::Left).unwrap();
    session.toggle_markers(&PlayerId::Parent).unwrap();

    session.save_to_disk(&path).unwrap();
    let restored = MarkerSession::load_from_disk(&path).unwrap();

    assert_eq!(restored.players.ids(), session.players.ids());
    for id in session.players.ids() {
        let before = session.players.player(&id).unwrap();
        let after = restored.players.player(&id).unwrap();
        assert_eq!(after.state(), before.state(), "{id}");
        assert_eq!(after.markers(), before.markers(), "{id}");
    }

    assert!(restored.players.parent().markers().is_empty());
    assert_eq!(restored.players.player(&drums).unwrap().state().bar_offset, 0.25);
    assert_eq!(restored.players.player(&bass).unwrap().state().bar_offset, -2.0);
    assert!(!restored.command_manager().can_undo());
}

#[test]
fn newer_session_version_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.json");
    fs::write(&path, r#"{ "version": 99, "config": {}, "players": [] }"#).unwrap();
    assert!(MarkerSession::load_from_disk(&path).is_err());
}

#[test]
fn players_recompute_independently_across_threads() {
    let config = MarkerConfig::default();
    let beatmap: BeatMap = TempoGrid::default().beatmap(60.0);

    let mut players: Vec<MarkerPlayer> = (0..4)
        .map(|i| {
            let mut p = MarkerPlayer::new(format!("stem{i}"), config);
            p.load_track(TrackInfo::new(format!("stem{i}"), Some(60.0), beatmap.clone()));
            p
        })
        .collect();

    std::thread::scope(|s| {
        for (i, player) in players.iter_mut().enumerate() {
            s.spawn(move || {
                player.set_frequency(MarkerFrequency::Beat);
                for _ in 0..i {
                    player.shift_right();
                }
                player.set_frequency(MarkerFrequency::Bar);
            });
        }
    });

    for (i, player) in players.iter().enumerate() {
        assert_eq!(player.state().bar_offset, i as f64 * 0.25);
        // at 120 BPM each beat of offset moves the first downbeat 0.5s later
        assert_eq!(player.markers().times()[0], i as f64 * 0.5, "stem{i}");
    }
}
