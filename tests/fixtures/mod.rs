#![allow(dead_code)]

use replay_analyzer::command::{Command, CommandKind, LeaveReason, Unit};
use replay_analyzer::replay::{Frame, Header, MapData, MatchRecord, Player, Point, Race, StartLocation};
use time::macros::datetime;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Logs to the test output, ignoring failures when a subscriber is already installed.
pub fn init_test_logger() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn player(id: u8, team: u8, name: &str, race: Race) -> Player {
    Player {
        slot_id: u16::from(id),
        id,
        team,
        name: name.to_owned(),
        race,
    }
}

pub fn train(frame: u32, player_id: u8, unit: &str) -> Command {
    Command::new(
        frame,
        player_id,
        CommandKind::Train {
            unit: Unit::new(0, unit),
        },
    )
}

pub fn build(frame: u32, player_id: u8, unit: &str) -> Command {
    Command::new(
        frame,
        player_id,
        CommandKind::Build {
            pos: Point { x: 100, y: 100 },
            unit: Unit::new(0, unit),
        },
    )
}

pub fn chat(frame: u32, player_id: u8, message: &str) -> Command {
    Command::new(
        frame,
        player_id,
        CommandKind::Chat {
            target_player_id: None,
            message: message.to_owned(),
        },
    )
}

pub fn leave(frame: u32, player_id: u8) -> Command {
    Command::new(
        frame,
        player_id,
        CommandKind::LeaveGame {
            reason: LeaveReason::Quit,
        },
    )
}

pub fn select(frame: u32, player_id: u8) -> Command {
    Command::new(frame, player_id, CommandKind::Select { units: vec![1, 2, 3] })
}

/// 2v2 on a 128x128 map, one player per side of the map. Jaedong leaves, so team 1 wins.
///
/// | player  | team | race    | start  |
/// |---------|------|---------|--------|
/// | Flash   | 1    | Terran  | top    |
/// | Bisu    | 1    | Protoss | right  |
/// | Jaedong | 2    | Zerg    | bottom |
/// | Stork   | 2    | Protoss | left   |
pub fn team_game() -> MatchRecord {
    let header = Header {
        frames: Frame(14_286), // 10 minutes
        start_time: datetime!(2011-03-12 18:30:00 UTC),
        title: "proleague".to_owned(),
        host: "Bisu".to_owned(),
        map_name: "Fighting Spirit".to_owned(),
        map_width: 128,
        map_height: 128,
        players: vec![
            player(0, 1, "Flash", Race::Terran),
            player(1, 1, "Bisu", Race::Protoss),
            player(2, 2, "Jaedong", Race::Zerg),
            player(3, 2, "Stork", Race::Protoss),
        ],
    };
    let commands = vec![
        train(10, 0, "SCV"),
        train(12, 1, "Probe"),
        train(14, 2, "Drone"),
        train(16, 3, "Probe"),
        chat(50, 0, "gl hf"),
        build(1_500, 0, "Barracks"),
        select(1_600, 2),
        build(1_700, 1, "Gateway"),
        train(2_400, 2, "Zergling"),
        train(4_800, 0, "Vulture"),
        train(5_000, 3, "Zealot"),
        select(7_000, 0),
        chat(11_990, 2, "gg"),
        leave(12_000, 2),
        select(13_000, 1),
        train(14_000, 0, "Vulture"),
    ];
    let start = |slot_id, x, y| StartLocation {
        slot_id,
        point: Point { x, y },
    };
    let map_data = MapData {
        start_locations: vec![
            start(0, 2048, 200),
            start(1, 3900, 2048),
            start(2, 2048, 3900),
            start(3, 200, 2048),
        ],
    };
    MatchRecord::new(header, commands)
        .with_map_data(map_data)
        .with_path("replays/proleague/flash-bisu-vs-jaedong-stork.rep")
}

/// 1v1 between Flash and Jaedong without leave events, so without winner.
pub fn one_on_one(zerg_name: &str) -> MatchRecord {
    let header = Header {
        frames: Frame(7_143),
        start_time: datetime!(2011-03-13 20:00:00 UTC),
        title: String::new(),
        host: String::new(),
        map_name: "Python".to_owned(),
        map_width: 128,
        map_height: 96,
        players: vec![
            player(0, 1, "Flash", Race::Terran),
            player(1, 2, zerg_name, Race::Zerg),
        ],
    };
    let commands = vec![
        train(20, 0, "SCV"),
        train(25, 1, "Drone"),
        build(3_000, 1, "Hatchery"),
        train(6_000, 0, "Vulture"),
    ];
    MatchRecord::new(header, commands).with_path("replays/python.rep")
}
