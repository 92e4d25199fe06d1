//! In-memory model of a decoded match record.
//!
//! A [`MatchRecord`] is produced by an external decoder and handed to this crate already
//! parsed: a [`Header`] with the static game metadata, the ordered command log and, when the
//! decoder could read it, the [`MapData`] with the start locations of every slot.
//!
//! The record is immutable once built. The only thing it carries beyond the decoded data is a
//! memoization slot for its [`MatchSummary`], filled the first time [`MatchRecord::summary`] is
//! called.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::Duration,
};

use time::OffsetDateTime;

use crate::command::Command;
use crate::summary::{derive_summary, DeriveError, MatchSummary};

/// Real time covered by a single frame at the fastest game speed, in milliseconds.
pub const FRAME_MILLIS: u64 = 42;

/// Time unit of the command log.
///
/// Frames are monotonically non-decreasing across the log. One frame lasts exactly
/// [`FRAME_MILLIS`] of real time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Frame(pub u32);

impl Frame {
    /// Real time elapsed from the start of the match up to this frame.
    pub fn duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0) * FRAME_MILLIS)
    }

    /// Elapsed time in whole seconds, rounded down.
    pub fn seconds(self) -> u64 {
        self.duration().as_secs()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Race played by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Race {
    Zerg,
    Terran,
    Protoss,
    /// Race id the decoder did not recognize.
    Unknown(u8),
}

impl Race {
    /// Display name of the race (`"Zerg"`, `"Terran"`, `"Protoss"`, `"Unknown 0x.."`).
    pub fn name(&self) -> String {
        match self {
            Race::Zerg => "Zerg".to_owned(),
            Race::Terran => "Terran".to_owned(),
            Race::Protoss => "Protoss".to_owned(),
            Race::Unknown(id) => format!("Unknown 0x{id:x}"),
        }
    }

    /// Parses a race name, case-insensitive. Unknown races are not accepted.
    pub fn from_name(name: &str) -> Option<Race> {
        [Race::Zerg, Race::Terran, Race::Protoss]
            .into_iter()
            .find(|race| race.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A player slot of the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Slot the player occupies in the lobby, used to look up the start location.
    pub slot_id: u16,
    /// Player id referenced by commands.
    pub id: u8,
    /// Team of the player. Several players may share a team.
    pub team: u8,
    /// Display name.
    pub name: String,
    pub race: Race,
}

/// A point on the map, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

/// Static metadata of a match.
#[derive(Debug, Clone)]
pub struct Header {
    /// Number of frames of the whole match.
    pub frames: Frame,
    /// When the match started.
    pub start_time: OffsetDateTime,
    /// Game name as shown in the lobby.
    pub title: String,
    /// Creator of the game.
    pub host: String,
    /// Name of the map.
    pub map_name: String,
    /// Map width in tiles.
    pub map_width: u16,
    /// Map height in tiles.
    pub map_height: u16,
    /// Actual players, in team order.
    pub players: Vec<Player>,
}

impl Header {
    /// Duration of the whole match.
    pub fn duration(&self) -> Duration {
        self.frames.duration()
    }

    /// Looks up a player by the id used in commands.
    pub fn player_by_id(&self, id: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Matchup in race letters with `v` between teams, e.g. `"PvT"` or `"ZTvPP"`.
    pub fn matchup(&self) -> String {
        let mut matchup = String::new();
        let mut prev_team = None;
        for player in &self.players {
            if prev_team.is_some_and(|team| team != player.team) {
                matchup.push('v');
            }
            matchup.push(player.race.name().chars().next().unwrap_or('U'));
            prev_team = Some(player.team);
        }
        matchup
    }
}

/// Start location of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartLocation {
    /// Slot this start location belongs to.
    pub slot_id: u16,
    /// Position of the start location, in pixels.
    pub point: Point,
}

/// Map information decoded from the match record.
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub start_locations: Vec<StartLocation>,
}

/// A complete, decoded match.
///
/// Fields are public to let decoders and tests build records directly; the record must not be
/// mutated after [`MatchRecord::summary`] has been called.
#[derive(Debug)]
pub struct MatchRecord {
    pub header: Header,
    /// Ordered command log of all players.
    pub commands: Vec<Command>,
    pub map_data: Option<MapData>,
    /// File the record was decoded from, if any.
    pub path: Option<PathBuf>,
    summary: OnceLock<Result<MatchSummary, DeriveError>>,
}

impl MatchRecord {
    /// Creates a record without map data or origin path.
    pub fn new(header: Header, commands: Vec<Command>) -> Self {
        Self {
            header,
            commands,
            map_data: None,
            path: None,
            summary: OnceLock::new(),
        }
    }

    /// Attaches decoded map data.
    pub fn with_map_data(mut self, map_data: MapData) -> Self {
        self.map_data = Some(map_data);
        self
    }

    /// Attaches the path the record was decoded from.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Origin path of the record, if known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Derived statistics of this match.
    ///
    /// Computed on the first call and memoized: later calls return the very same summary (or
    /// the same error) without walking the command log again.
    ///
    /// # Errors
    /// Returns the [`DeriveError`] raised by the first derivation.
    pub fn summary(&self) -> Result<&MatchSummary, &DeriveError> {
        self.summary.get_or_init(|| derive_summary(self)).as_ref()
    }

    /// True once the summary has been derived (successfully or not).
    pub fn is_summarized(&self) -> bool {
        self.summary.get().is_some()
    }
}
