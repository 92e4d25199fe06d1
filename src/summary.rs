//! Derived statistics of a match.
//!
//! [`derive_summary`] walks the command log of a [`MatchRecord`] and computes a
//! [`MatchSummary`]: per-player command counts, last action frame and APM, the winning team when
//! it can be told apart, the start location and facing of each player, and the chat and leave
//! events of the match.
//!
//! Callers usually go through [`MatchRecord::summary`], which memoizes the result on the record.
//!
//! # Winner detection
//!
//! Every leave-game command removes its issuer from their team. Once the whole log has been
//! read, the team with the most remaining players wins, but only if no other team has as many
//! remaining players and at least one player remains. A tie leaves the winner undetermined; no
//! draw is inferred.

use std::{collections::HashMap, f64::consts::PI};

use thiserror::Error;

use crate::command::{CommandKind, LeaveReason};
use crate::replay::{Frame, MatchRecord, Point};

/// Fault raised while deriving a summary from a malformed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeriveError {
    /// A command references a player id that is not in the header.
    #[error("command #{index} at frame {frame} was issued by unknown player {player_id}")]
    UnknownPlayer {
        /// Position of the command in the log.
        index: usize,
        /// Frame of the command.
        frame: Frame,
        /// The unknown player id.
        player_id: u8,
    },
}

/// Derived statistics of a single player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    /// Player id, as used in commands.
    pub player_id: u8,
    /// Number of commands issued by the player.
    pub command_count: u32,
    /// Frame of the last command of the player, `None` if they issued no command.
    pub last_action_frame: Option<Frame>,
    /// Actions per minute up to the last action, `None` when it cannot be computed.
    pub apm: Option<u32>,
    /// Start location, when the map data has one for the player's slot.
    pub start_location: Option<Point>,
    /// Direction of the start location from the map center, as a 1 to 12 clock value.
    pub start_direction: Option<u8>,
}

impl PlayerSummary {
    fn new(player_id: u8) -> Self {
        Self {
            player_id,
            command_count: 0,
            last_action_frame: None,
            apm: None,
            start_location: None,
            start_direction: None,
        }
    }
}

/// A chat message of the command log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub frame: Frame,
    pub player_id: u8,
    pub target_player_id: Option<u8>,
    pub message: String,
}

/// A leave-game command of the command log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveEvent {
    pub frame: Frame,
    pub player_id: u8,
    pub reason: LeaveReason,
}

/// Aggregate statistics of a match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    /// One entry per player, in header order.
    pub players: Vec<PlayerSummary>,
    /// Team with the strictly largest number of remaining players, if any.
    pub winning_team: Option<u8>,
    /// Chat messages, in log order.
    pub chat_events: Vec<ChatEvent>,
    /// Leave-game commands, in log order.
    pub leave_events: Vec<LeaveEvent>,
}

impl MatchSummary {
    /// Summary of the player with the given id.
    pub fn player(&self, player_id: u8) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}

/// Computes the summary of `record` from scratch.
///
/// Prefer [`MatchRecord::summary`], which only calls this once per record.
///
/// # Errors
/// Returns [`DeriveError::UnknownPlayer`] if a command was issued by a player id missing from
/// the header.
pub fn derive_summary(record: &MatchRecord) -> Result<MatchSummary, DeriveError> {
    let header = &record.header;
    let commands = &record.commands;

    let mut players: Vec<PlayerSummary> = header
        .players
        .iter()
        .map(|p| PlayerSummary::new(p.id))
        .collect();
    let index_by_id: HashMap<u8, usize> = header
        .players
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();

    // Remaining players per team, decremented by every leave-game command
    let mut team_sizes: HashMap<u8, i32> = HashMap::new();
    for player in &header.players {
        *team_sizes.entry(player.team).or_default() += 1;
    }

    let mut chat_events = vec![];
    let mut leave_events = vec![];

    for (index, cmd) in commands.iter().enumerate() {
        let Some(&i) = index_by_id.get(&cmd.player_id) else {
            return Err(DeriveError::UnknownPlayer {
                index,
                frame: cmd.frame,
                player_id: cmd.player_id,
            });
        };
        players[i].command_count += 1;

        match &cmd.kind {
            CommandKind::LeaveGame { reason } => {
                *team_sizes.entry(header.players[i].team).or_default() -= 1;
                leave_events.push(LeaveEvent {
                    frame: cmd.frame,
                    player_id: cmd.player_id,
                    reason: *reason,
                });
            }
            CommandKind::Chat {
                target_player_id,
                message,
            } => chat_events.push(ChatEvent {
                frame: cmd.frame,
                player_id: cmd.player_id,
                target_player_id: *target_player_id,
                message: message.clone(),
            }),
            _ => {}
        }
    }

    // Last command per player: the first one met walking backwards.
    let mut unresolved = players.iter().filter(|p| p.command_count > 0).count();
    for cmd in commands.iter().rev() {
        if unresolved == 0 {
            break;
        }
        let summary = &mut players[index_by_id[&cmd.player_id]];
        if summary.last_action_frame.is_none() {
            summary.last_action_frame = Some(cmd.frame);
            unresolved -= 1;
        }
    }

    let winning_team = unique_largest_team(&team_sizes);

    for summary in &mut players {
        summary.apm = summary
            .last_action_frame
            .and_then(|frame| actions_per_minute(summary.command_count, frame));
    }

    if let Some(map_data) = &record.map_data {
        // 1 tile is 32 pixels
        let cx = f64::from(header.map_width) * 16.0;
        let cy = f64::from(header.map_height) * 16.0;
        for (summary, player) in players.iter_mut().zip(&header.players) {
            let Some(location) = map_data
                .start_locations
                .iter()
                .find(|loc| loc.slot_id == player.slot_id)
            else {
                continue;
            };
            let pt = location.point;
            summary.start_location = Some(pt);
            // Map Y grows from top to bottom
            summary.start_direction = Some(angle_to_clock(f64::atan2(
                cy - f64::from(pt.y),
                f64::from(pt.x) - cx,
            )));
        }
    }

    Ok(MatchSummary {
        players,
        winning_team,
        chat_events,
        leave_events,
    })
}

fn unique_largest_team(team_sizes: &HashMap<u8, i32>) -> Option<u8> {
    let (&team, &max_size) = team_sizes.iter().max_by_key(|&(_, &size)| size)?;
    if max_size <= 0 {
        return None;
    }
    let count = team_sizes.values().filter(|&&size| size == max_size).count();
    (count == 1).then_some(team)
}

/// `round(command_count / minutes)`, `None` when `last_action` is at zero minutes.
fn actions_per_minute(command_count: u32, last_action: Frame) -> Option<u32> {
    let minutes = last_action.duration().as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return None;
    }
    Some((f64::from(command_count) / minutes).round() as u32)
}

/// Converts an angle in radians (0 pointing right, counter-clockwise) to a clock value in
/// `1..=12`.
///
/// - `PI/2` => 12
/// - `0` => 3
/// - `PI` => 9
/// - `-PI/2` => 6
pub fn angle_to_clock(angle: f64) -> u8 {
    const ONE_HOUR: f64 = PI / 6.0;

    // Clockwise, and 12 o'clock starts at 11:30
    let mut angle = -angle + ONE_HOUR * 3.5;
    while angle < 0.0 {
        angle += ONE_HOUR * 12.0;
    }
    while angle >= ONE_HOUR * 12.0 {
        angle -= ONE_HOUR * 12.0;
    }

    match (angle / ONE_HOUR) as u8 {
        0 => 12,
        hour => hour,
    }
}
