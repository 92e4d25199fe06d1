use super::{Analyzer, AnalyzerError, Progress, StartContext};
use crate::command::{Command, CommandKind};

/// Seconds at which the primary player first built, trained or morphed one of the given units.
///
/// Absent if there is no primary player or none of the units was ever produced.
#[derive(Debug, Clone)]
pub struct FirstUnitSeconds {
    units: Vec<String>,
    me: Option<u8>,
    result: Option<String>,
}

impl FirstUnitSeconds {
    /// Watches for any of `units`, compared case-insensitively.
    pub fn new(units: Vec<String>) -> Self {
        Self {
            units,
            me: None,
            result: None,
        }
    }

    fn is_watched(&self, name: &str) -> bool {
        self.units.iter().any(|unit| unit.eq_ignore_ascii_case(name))
    }
}

impl Analyzer for FirstUnitSeconds {
    fn start(&mut self, ctx: &StartContext<'_>) -> Result<Progress, AnalyzerError> {
        let Some(me) = ctx.me else {
            return Ok(Progress::Done);
        };
        self.me = Some(me.id);
        Ok(Progress::Continue)
    }

    fn process_command(&mut self, cmd: &Command) -> Result<Progress, AnalyzerError> {
        if self.me != Some(cmd.player_id) {
            return Ok(Progress::Continue);
        }
        match cmd.kind.produced_unit() {
            Some(unit) if self.is_watched(&unit.name) => {
                self.result = Some(cmd.frame.seconds().to_string());
                Ok(Progress::Done)
            }
            _ => Ok(Progress::Continue),
        }
    }

    fn result(&self) -> Option<String> {
        self.result.clone()
    }
}

/// Seconds at which the primary player sent their first chat message.
#[derive(Debug, Clone, Default)]
pub struct FirstChatSeconds {
    me: Option<u8>,
    result: Option<String>,
}

impl Analyzer for FirstChatSeconds {
    fn start(&mut self, ctx: &StartContext<'_>) -> Result<Progress, AnalyzerError> {
        let Some(me) = ctx.me else {
            return Ok(Progress::Done);
        };
        self.me = Some(me.id);
        Ok(Progress::Continue)
    }

    fn process_command(&mut self, cmd: &Command) -> Result<Progress, AnalyzerError> {
        if self.me == Some(cmd.player_id) && matches!(cmd.kind, CommandKind::Chat { .. }) {
            self.result = Some(cmd.frame.seconds().to_string());
            return Ok(Progress::Done);
        }
        Ok(Progress::Continue)
    }

    fn result(&self) -> Option<String> {
        self.result.clone()
    }
}
