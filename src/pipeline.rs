//! Per-match orchestration of the selected analyzers.
//!
//! A [`Pipeline`] is built once from a list of [`AnalyzerSpec`]s. Invalid selections are
//! reported and left out at that point, so that running a match never fails because of the
//! selection. For every match, [`Pipeline::run`]:
//!
//! 1. clones a fresh instance of every selected analyzer;
//! 2. resolves the primary player and the memoized [`MatchSummary`](crate::summary::MatchSummary)
//!    (a derivation fault is logged and the match proceeds without summary);
//! 3. calls [`Analyzer::start`] on every instance, collecting the results of those done already;
//! 4. walks the command log once, in order, feeding every command to every active instance, and
//!    stops as soon as no instance is active anymore (when early exit is enabled).
//!
//! Analyzers erroring out are removed from the match without result. Analyzers still active at
//! the end of the log yield no result.

use std::collections::{BTreeMap, HashSet};

use tracing::{trace, warn};

use crate::analyzer::{
    registry::instantiate, Analyzer, AnalyzerDescriptor, AnalyzerSpec, AnyAnalyzer, Progress,
    StartContext, TRUE,
};
use crate::replay::{MatchRecord, Player};

/// Named results of one match. Absent names have no result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResults(BTreeMap<&'static str, String>);

impl MatchResults {
    /// Result of the analyzer `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the analyzer `name` has the canonical `"true"` result.
    pub fn is_true(&self, name: &str) -> bool {
        self.get(name) == Some(TRUE)
    }

    /// Results sorted by analyzer name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: &'static str, value: String) {
        self.0.insert(name, value);
    }
}

impl FromIterator<(&'static str, String)> for MatchResults {
    fn from_iter<T: IntoIterator<Item = (&'static str, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone)]
struct Selected {
    descriptor: &'static AnalyzerDescriptor,
    template: AnyAnalyzer,
}

/// Validated analyzer selection, reusable across matches and threads.
#[derive(Debug, Clone)]
pub struct Pipeline {
    analyzers: Vec<Selected>,
    me: HashSet<String>,
    early_exit: bool,
}

impl Pipeline {
    /// Builds a pipeline from a selection.
    ///
    /// Unknown analyzers, invalid arguments and duplicate names are logged and skipped.
    pub fn new(specs: &[AnalyzerSpec]) -> Self {
        let mut analyzers: Vec<Selected> = Vec::with_capacity(specs.len());
        for spec in specs {
            let (descriptor, template) = match instantiate(spec) {
                Ok(analyzer) => analyzer,
                Err(err) => {
                    warn!(%spec, %err, "analyzer excluded from the run");
                    continue;
                }
            };
            if analyzers.iter().any(|s| s.descriptor.name == descriptor.name) {
                warn!(%spec, "analyzer selected twice, keeping the first selection");
                continue;
            }
            analyzers.push(Selected {
                descriptor,
                template,
            });
        }
        Self {
            analyzers,
            me: HashSet::new(),
            early_exit: true,
        }
    }

    /// Sets the names identifying the primary player.
    pub fn with_me<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            me: names.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Enables or disables stopping the command pass once every analyzer is done.
    pub fn with_early_exit(self, early_exit: bool) -> Self {
        Self { early_exit, ..self }
    }

    /// Names of the selected analyzers, sorted.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.analyzers.iter().map(|s| s.descriptor.name).collect();
        names.sort_unstable();
        names
    }

    /// Descriptors of the selected analyzers, in selection order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static AnalyzerDescriptor> + '_ {
        self.analyzers.iter().map(|s| s.descriptor)
    }

    /// First player of the header whose name is one of the configured names.
    pub fn primary_player<'a>(&self, record: &'a MatchRecord) -> Option<&'a Player> {
        record
            .header
            .players
            .iter()
            .find(|player| self.me.contains(&player.name))
    }

    /// Runs every selected analyzer over `record`.
    pub fn run(&self, record: &MatchRecord) -> MatchResults {
        let summary = match record.summary() {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!(%err, "statistics unavailable for this match");
                None
            }
        };
        let ctx = StartContext {
            record,
            summary,
            me: self.primary_player(record),
        };

        let mut results = MatchResults::default();
        let mut active: Vec<(&'static str, AnyAnalyzer)> = Vec::new();
        for selected in &self.analyzers {
            let name = selected.descriptor.name;
            let mut analyzer = selected.template.clone();
            match analyzer.start(&ctx) {
                Ok(Progress::Continue) => active.push((name, analyzer)),
                Ok(Progress::Done) => {
                    if let Some(result) = analyzer.result() {
                        results.insert(name, result);
                    }
                }
                Err(err) => warn!(analyzer = name, %err, "analyzer failed to start"),
            }
        }

        let mut processed = 0usize;
        for cmd in &record.commands {
            if self.early_exit && active.is_empty() {
                break;
            }
            processed += 1;
            active.retain_mut(|(name, analyzer)| match analyzer.process_command(cmd) {
                Ok(Progress::Continue) => true,
                Ok(Progress::Done) => {
                    if let Some(result) = analyzer.result() {
                        results.insert(*name, result);
                    }
                    false
                }
                Err(err) => {
                    warn!(analyzer = *name, %cmd, %err, "analyzer failed");
                    false
                }
            });
        }
        trace!(
            processed,
            commands = record.commands.len(),
            unfinished = active.len(),
            "command pass finished"
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::command::{Command, CommandKind, LeaveReason, Unit};
    use crate::replay::{Frame, Header, Race};

    fn record() -> MatchRecord {
        let player = |id: u8, team, name: &str, race| Player {
            slot_id: u16::from(id),
            id,
            team,
            name: name.to_owned(),
            race,
        };
        let header = Header {
            frames: Frame(10_000),
            start_time: OffsetDateTime::UNIX_EPOCH,
            title: String::new(),
            host: String::new(),
            map_name: "Fighting Spirit".to_owned(),
            map_width: 128,
            map_height: 128,
            players: vec![
                player(0, 1, "opponent", Race::Terran),
                player(1, 2, "me", Race::Zerg),
            ],
        };
        let train = |frame, player_id, name: &str| {
            Command::new(
                frame,
                player_id,
                CommandKind::Train {
                    unit: Unit::new(0, name),
                },
            )
        };
        let chat = Command::new(
            1_500,
            1,
            CommandKind::Chat {
                target_player_id: None,
                message: "glhf".to_owned(),
            },
        );
        let leave = Command::new(
            9_000,
            0,
            CommandKind::LeaveGame {
                reason: LeaveReason::Quit,
            },
        );
        let commands = vec![
            train(100, 0, "SCV"),
            train(200, 1, "Drone"),
            chat,
            train(2_000, 1, "Overlord"),
            train(5_000, 1, "Zergling"),
            train(6_000, 0, "Marine"),
            leave,
        ];
        MatchRecord::new(header, commands).with_path("replays/zvt.rep")
    }

    fn specs(selection: &[&str]) -> Vec<AnalyzerSpec> {
        selection.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn runs_every_kind_of_analyzer() {
        let pipeline = Pipeline::new(&specs(&[
            "my-name",
            "my-race-is-zerg",
            "my-win",
            "my-apm",
            "my-first-specific-unit-seconds=Zergling",
            "my-first-chat-seconds",
            "replay-name",
        ]))
        .with_me(["me"]);
        let results = pipeline.run(&record());

        assert_eq!(results.get("my-name"), Some("me"));
        assert!(results.is_true("my-race-is-zerg"));
        assert!(results.is_true("my-win"));
        // 4 commands over 5000 frames (3.5 minutes)
        assert_eq!(results.get("my-apm"), Some("1"));
        assert_eq!(results.get("my-first-specific-unit-seconds"), Some("210"));
        assert_eq!(results.get("my-first-chat-seconds"), Some("63"));
        assert_eq!(results.get("replay-name"), Some("zvt.rep"));
    }

    #[test]
    fn early_exit_does_not_change_results() {
        let selection = specs(&[
            "my-first-specific-unit-seconds=Overlord",
            "my-first-specific-unit-seconds=Hydralisk",
            "my-first-chat-seconds",
            "my-game",
            "map-name",
        ]);
        let record = record();
        for me in ["me", "opponent", "nobody"] {
            let with = Pipeline::new(&selection).with_me([me]).run(&record);
            let without = Pipeline::new(&selection)
                .with_me([me])
                .with_early_exit(false)
                .run(&record);
            assert_eq!(with, without, "me = {me}");
        }
    }

    #[test]
    fn analyzers_are_independent() {
        let selection = [
            "my-first-specific-unit-seconds=Zergling,Drone",
            "my-first-chat-seconds",
            "my-apm",
            "is-there-a-race=protoss",
            "duration-minutes",
        ];
        let record = record();
        let together = Pipeline::new(&specs(&selection)).with_me(["me"]).run(&record);
        for name in selection {
            let alone = Pipeline::new(&specs(&[name])).with_me(["me"]).run(&record);
            assert_eq!(alone.len(), 1);
            for (field, value) in alone.iter() {
                assert_eq!(together.get(field), Some(value));
            }
        }
        assert_eq!(together.len(), selection.len());
    }

    #[test]
    fn invalid_selections_are_excluded() {
        let pipeline = Pipeline::new(&specs(&[
            "my-race",
            "no-such-analyzer",
            "is-there-a-race",
            "is-there-a-race=elves",
            "map-name=x",
            "my-race",
            "date-time",
        ]));
        assert_eq!(pipeline.field_names(), ["date-time", "my-race"]);
    }

    #[test]
    fn failing_analyzer_does_not_affect_others() {
        let mut record = record();
        record.path = None;
        let results = Pipeline::new(&specs(&["replay-path", "map-name"])).run(&record);
        assert_eq!(results.get("replay-path"), None);
        assert_eq!(results.get("map-name"), Some("Fighting Spirit"));
    }

    #[test]
    fn derivation_fault_degrades_to_absent_statistics() {
        let mut record = record();
        record.commands.push(Command::new(
            9_500,
            7,
            CommandKind::GameSpeed { speed: 6 },
        ));
        let results = Pipeline::new(&specs(&["my-apm", "my-win", "my-name"]))
            .with_me(["me"])
            .run(&record);
        assert_eq!(results.get("my-apm"), None);
        assert_eq!(results.get("my-win"), None);
        assert_eq!(results.get("my-name"), Some("me"));
    }

    #[test]
    fn unfinished_analyzers_have_no_result() {
        let results = Pipeline::new(&specs(&["my-first-specific-unit-seconds=Ultralisk"]))
            .with_me(["me"])
            .run(&record());
        assert!(results.is_empty());
    }

    #[test]
    fn primary_player_is_first_match_in_header_order() {
        let pipeline = Pipeline::new(&[]).with_me(["me", "opponent"]);
        let record = record();
        assert_eq!(
            pipeline.primary_player(&record).map(|p| p.name.as_str()),
            Some("opponent")
        );
        assert!(Pipeline::new(&[]).primary_player(&record).is_none());
    }
}
