use time::format_description;

use super::{bool_result, Analyzer, AnalyzerError, Progress, StartContext};
use crate::command::Command;
use crate::replay::Race;

/// A fact that can be answered before the command pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderFact {
    /// Name of the primary player.
    MyName,
    /// Race name of the primary player.
    MyRace,
    /// Whether the primary player plays the given race.
    MyRaceIs(Race),
    /// Whether the primary player plays in the match at all.
    MyGame,
    /// APM of the primary player.
    MyApm,
    /// Whether the primary player's team won.
    MyWin,
    /// Whether any player plays one of the races.
    IsThereARace(Vec<Race>),
    /// Start time of the match.
    DateTime,
    /// Duration of the match in whole minutes.
    DurationMinutes,
    MapName,
    /// File name of the origin path.
    ReplayName,
    /// Full origin path.
    ReplayPath,
}

impl HeaderFact {
    fn evaluate(&self, ctx: &StartContext<'_>) -> Result<Option<String>, AnalyzerError> {
        let header = &ctx.record.header;
        let result = match self {
            HeaderFact::MyName => ctx.me.map(|me| me.name.clone()),
            HeaderFact::MyRace => ctx.me.map(|me| me.race.name()),
            HeaderFact::MyRaceIs(race) => ctx.me.map(|me| bool_result(me.race == *race)),
            HeaderFact::MyGame => Some(bool_result(ctx.me.is_some())),
            HeaderFact::MyApm => {
                let (Some(me), Some(summary)) = (ctx.me, ctx.summary) else {
                    return Ok(None);
                };
                summary
                    .player(me.id)
                    .and_then(|p| p.apm)
                    .map(|apm| apm.to_string())
            }
            HeaderFact::MyWin => {
                let (Some(me), Some(summary)) = (ctx.me, ctx.summary) else {
                    return Ok(None);
                };
                summary
                    .winning_team
                    .map(|team| bool_result(team == me.team))
            }
            HeaderFact::IsThereARace(races) => Some(bool_result(
                header.players.iter().any(|p| races.contains(&p.race)),
            )),
            HeaderFact::DateTime => {
                let format =
                    format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")?;
                Some(header.start_time.format(&format)?)
            }
            HeaderFact::DurationMinutes => Some((header.duration().as_secs() / 60).to_string()),
            HeaderFact::MapName => Some(header.map_name.clone()),
            HeaderFact::ReplayName => {
                let path = ctx.record.path().ok_or(AnalyzerError::MissingPath)?;
                let name = path
                    .file_name()
                    .ok_or_else(|| AnalyzerError::NoFileName(path.display().to_string()))?;
                Some(name.to_string_lossy().into_owned())
            }
            HeaderFact::ReplayPath => {
                let path = ctx.record.path().ok_or(AnalyzerError::MissingPath)?;
                Some(path.display().to_string())
            }
        };
        Ok(result)
    }
}

/// Analyzer answering a [`HeaderFact`]. Always done after [`Analyzer::start`].
#[derive(Debug, Clone)]
pub struct HeaderAnalyzer {
    fact: HeaderFact,
    result: Option<String>,
}

impl HeaderAnalyzer {
    /// Creates a fresh analyzer for `fact`.
    pub fn new(fact: HeaderFact) -> Self {
        Self { fact, result: None }
    }

    /// The fact this analyzer answers.
    pub fn fact(&self) -> &HeaderFact {
        &self.fact
    }
}

impl Analyzer for HeaderAnalyzer {
    fn start(&mut self, ctx: &StartContext<'_>) -> Result<Progress, AnalyzerError> {
        self.result = self.fact.evaluate(ctx)?;
        Ok(Progress::Done)
    }

    fn process_command(&mut self, _cmd: &Command) -> Result<Progress, AnalyzerError> {
        Ok(Progress::Done)
    }

    fn result(&self) -> Option<String> {
        self.result.clone()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::replay::{Frame, Header, MatchRecord, Player};
    use crate::summary::MatchSummary;

    fn record() -> MatchRecord {
        let player = |id: u8, team, name: &str, race| Player {
            slot_id: u16::from(id),
            id,
            team,
            name: name.to_owned(),
            race,
        };
        let header = Header {
            frames: Frame(30_000), // 21 minutes
            start_time: datetime!(2020-05-17 21:04:09 UTC),
            title: "title".to_owned(),
            host: "host".to_owned(),
            map_name: "Circuit Breaker".to_owned(),
            map_width: 128,
            map_height: 128,
            players: vec![
                player(0, 1, "Flash", Race::Terran),
                player(1, 2, "Jaedong", Race::Zerg),
            ],
        };
        MatchRecord::new(header, vec![]).with_path("replays/finals/game1.rep")
    }

    fn evaluate(
        fact: HeaderFact,
        record: &MatchRecord,
        me: Option<usize>,
        summary: Option<&MatchSummary>,
    ) -> Option<String> {
        let ctx = StartContext {
            record,
            summary,
            me: me.map(|i| &record.header.players[i]),
        };
        let mut analyzer = HeaderAnalyzer::new(fact);
        assert_eq!(analyzer.start(&ctx).unwrap(), Progress::Done);
        analyzer.result()
    }

    #[test]
    fn primary_player_facts() {
        let record = record();
        assert_eq!(
            evaluate(HeaderFact::MyName, &record, Some(1), None).as_deref(),
            Some("Jaedong")
        );
        assert_eq!(
            evaluate(HeaderFact::MyRace, &record, Some(0), None).as_deref(),
            Some("Terran")
        );
        assert_eq!(
            evaluate(HeaderFact::MyRaceIs(Race::Zerg), &record, Some(1), None).as_deref(),
            Some("true")
        );
        assert_eq!(
            evaluate(HeaderFact::MyRaceIs(Race::Zerg), &record, Some(0), None).as_deref(),
            Some("false")
        );
        assert_eq!(evaluate(HeaderFact::MyName, &record, None, None), None);
        assert_eq!(
            evaluate(HeaderFact::MyGame, &record, None, None).as_deref(),
            Some("false")
        );
    }

    #[test]
    fn summary_facts_need_a_summary() {
        let record = record();
        assert_eq!(evaluate(HeaderFact::MyWin, &record, Some(0), None), None);
        assert_eq!(evaluate(HeaderFact::MyApm, &record, Some(0), None), None);

        let mut summary = record.summary().unwrap().clone();
        // 1v1 without leaves is a tie
        assert_eq!(
            evaluate(HeaderFact::MyWin, &record, Some(0), Some(&summary)),
            None
        );
        summary.winning_team = Some(2);
        assert_eq!(
            evaluate(HeaderFact::MyWin, &record, Some(0), Some(&summary)).as_deref(),
            Some("false")
        );
        assert_eq!(
            evaluate(HeaderFact::MyWin, &record, Some(1), Some(&summary)).as_deref(),
            Some("true")
        );
        summary.players[1].apm = Some(312);
        assert_eq!(
            evaluate(HeaderFact::MyApm, &record, Some(1), Some(&summary)).as_deref(),
            Some("312")
        );
    }

    #[test]
    fn match_facts() {
        let record = record();
        let races = HeaderFact::IsThereARace(vec![Race::Protoss, Race::Zerg]);
        assert_eq!(evaluate(races, &record, None, None).as_deref(), Some("true"));
        let races = HeaderFact::IsThereARace(vec![Race::Protoss]);
        assert_eq!(evaluate(races, &record, None, None).as_deref(), Some("false"));
        assert_eq!(
            evaluate(HeaderFact::DateTime, &record, None, None).as_deref(),
            Some("2020-05-17 21:04:09")
        );
        assert_eq!(
            evaluate(HeaderFact::DurationMinutes, &record, None, None).as_deref(),
            Some("21")
        );
        assert_eq!(
            evaluate(HeaderFact::MapName, &record, None, None).as_deref(),
            Some("Circuit Breaker")
        );
        assert_eq!(
            evaluate(HeaderFact::ReplayName, &record, None, None).as_deref(),
            Some("game1.rep")
        );
    }

    #[test]
    fn path_facts_fail_without_path() {
        let mut record = record();
        record.path = None;
        let ctx = StartContext {
            record: &record,
            summary: None,
            me: None,
        };
        let mut analyzer = HeaderAnalyzer::new(HeaderFact::ReplayPath);
        assert!(matches!(
            analyzer.start(&ctx),
            Err(AnalyzerError::MissingPath)
        ));
    }
}
