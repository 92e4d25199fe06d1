//! Player commands of the command log.
//!
//! Every [`Command`] carries the same header (frame, issuing player) and a [`CommandKind`]
//! payload. The statistics deriver only interprets [`CommandKind::LeaveGame`] and
//! [`CommandKind::Chat`]; the remaining kinds are there for analyzers that care about them.

use std::fmt;

use crate::replay::{Frame, Point};

/// Why a player left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    Quit,
    Defeat,
    Finished,
    Draw,
    Dropped,
    /// Reason id the decoder did not recognize.
    Unknown(u8),
}

/// A unit type referenced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// In-game unit type id.
    pub id: u16,
    /// Unit name, e.g. `"Zergling"`.
    pub name: String,
}

impl Unit {
    pub fn new(id: u16, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Hotkey operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Assign,
    Select,
    Add,
}

/// Kind-specific payload of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// The player left the game.
    LeaveGame {
        reason: LeaveReason,
    },
    /// In-game chat message.
    Chat {
        /// Recipient, `None` when sent to everyone.
        target_player_id: Option<u8>,
        message: String,
    },
    /// A building was placed.
    Build {
        pos: Point,
        unit: Unit,
    },
    /// A unit was queued for training.
    Train {
        unit: Unit,
    },
    /// A unit was morphed (e.g. larva to zergling).
    UnitMorph {
        unit: Unit,
    },
    /// A building was morphed (e.g. hatchery to lair).
    BuildingMorph {
        unit: Unit,
    },
    /// A research was started.
    Tech {
        /// Name of the tech.
        name: String,
    },
    /// An upgrade was started.
    Upgrade {
        /// Name of the upgrade.
        name: String,
    },
    /// Unit selection change; `units` holds the unit tags involved.
    Select {
        units: Vec<u16>,
    },
    /// Control group hotkey.
    Hotkey {
        action: HotkeyAction,
        /// Group number, 0 to 9.
        group: u8,
    },
    RightClick {
        pos: Point,
        queued: bool,
    },
    /// An order given at a target point or unit.
    TargetedOrder {
        pos: Point,
        /// Name of the order.
        order: String,
        queued: bool,
    },
    MinimapPing {
        pos: Point,
    },
    /// Game speed change, with the new speed id.
    GameSpeed {
        speed: u8,
    },
    /// Any other command; the raw parameters are kept uninterpreted.
    General {
        /// Command type id.
        type_id: u8,
        data: Vec<u8>,
    },
}

impl CommandKind {
    /// Unit produced by this command, for build, train and morph commands.
    pub fn produced_unit(&self) -> Option<&Unit> {
        match self {
            CommandKind::Build { unit, .. }
            | CommandKind::Train { unit }
            | CommandKind::UnitMorph { unit }
            | CommandKind::BuildingMorph { unit } => Some(unit),
            _ => None,
        }
    }

    /// Short name of the command kind.
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::LeaveGame { .. } => "Leave Game",
            CommandKind::Chat { .. } => "Chat",
            CommandKind::Build { .. } => "Build",
            CommandKind::Train { .. } => "Train",
            CommandKind::UnitMorph { .. } => "Unit Morph",
            CommandKind::BuildingMorph { .. } => "Building Morph",
            CommandKind::Tech { .. } => "Tech",
            CommandKind::Upgrade { .. } => "Upgrade",
            CommandKind::Select { .. } => "Select",
            CommandKind::Hotkey { .. } => "Hotkey",
            CommandKind::RightClick { .. } => "Right Click",
            CommandKind::TargetedOrder { .. } => "Targeted Order",
            CommandKind::MinimapPing { .. } => "Minimap Ping",
            CommandKind::GameSpeed { .. } => "Game Speed",
            CommandKind::General { .. } => "General",
        }
    }
}

/// A single command issued by a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Frame at which the command was issued.
    pub frame: Frame,
    /// Player who issued the command.
    pub player_id: u8,
    pub kind: CommandKind,
}

impl Command {
    pub fn new(frame: u32, player_id: u8, kind: CommandKind) -> Self {
        Self {
            frame: Frame(frame),
            player_id,
            kind,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] player {}: {}",
            self.frame,
            self.player_id,
            self.kind.name()
        )
    }
}
