//! Static table of the built-in analyzers.
//!
//! Each [`AnalyzerDescriptor`] names an analyzer, documents it, tells whether it takes
//! arguments and whether its result is boolean (and may thus be used by the result filter), and
//! knows how to build a fresh [`AnyAnalyzer`] from validated arguments.

use std::fmt;

use super::{
    AnalyzerSpec, AnyAnalyzer, ArgumentError, FirstChatSeconds, FirstUnitSeconds,
    HeaderAnalyzer, HeaderFact,
};
use crate::replay::Race;

type Builder = fn(&[String]) -> Result<AnyAnalyzer, ArgumentError>;

/// Registry entry of a built-in analyzer.
pub struct AnalyzerDescriptor {
    /// Name used to select the analyzer and to label its result.
    pub name: &'static str,
    /// One-line human readable description.
    pub description: &'static str,
    /// Whether the analyzer requires a comma-separated argument list.
    pub takes_arguments: bool,
    /// Whether the result is [`TRUE`](super::TRUE) / [`FALSE`](super::FALSE).
    pub boolean_result: bool,
    build: Builder,
}

impl fmt::Debug for AnalyzerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerDescriptor")
            .field("name", &self.name)
            .field("takes_arguments", &self.takes_arguments)
            .field("boolean_result", &self.boolean_result)
            .finish_non_exhaustive()
    }
}

impl AnalyzerDescriptor {
    /// Validates `arguments` and builds a fresh analyzer.
    ///
    /// # Errors
    /// Returns an [`ArgumentError`] if arguments are missing, unexpected or invalid.
    pub fn build(&self, arguments: &[String]) -> Result<AnyAnalyzer, ArgumentError> {
        if self.takes_arguments && arguments.is_empty() {
            return Err(ArgumentError::MissingArguments(self.name));
        }
        if !self.takes_arguments && !arguments.is_empty() {
            return Err(ArgumentError::UnexpectedArguments(self.name));
        }
        (self.build)(arguments)
    }
}

const fn header(
    name: &'static str,
    description: &'static str,
    boolean_result: bool,
    build: Builder,
) -> AnalyzerDescriptor {
    AnalyzerDescriptor {
        name,
        description,
        takes_arguments: false,
        boolean_result,
        build,
    }
}

fn fact(fact: HeaderFact) -> Result<AnyAnalyzer, ArgumentError> {
    Ok(AnyAnalyzer::Header(HeaderAnalyzer::new(fact)))
}

/// Every built-in analyzer, sorted by name.
pub static REGISTRY: &[AnalyzerDescriptor] = &[
    header(
        "date-time",
        "Start time of the match",
        false,
        |_| fact(HeaderFact::DateTime),
    ),
    header(
        "duration-minutes",
        "Duration of the match in minutes",
        false,
        |_| fact(HeaderFact::DurationMinutes),
    ),
    AnalyzerDescriptor {
        name: "is-there-a-race",
        description: "Whether any player plays one of the given races (comma-separated)",
        takes_arguments: true,
        boolean_result: true,
        build: |arguments| {
            let races = arguments
                .iter()
                .map(|name| {
                    Race::from_name(name).ok_or_else(|| ArgumentError::UnknownRace(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            fact(HeaderFact::IsThereARace(races))
        },
    },
    header(
        "map-name",
        "Name of the map",
        false,
        |_| fact(HeaderFact::MapName),
    ),
    header(
        "my-apm",
        "APM of the primary player",
        false,
        |_| fact(HeaderFact::MyApm),
    ),
    header(
        "my-first-chat-seconds",
        "Seconds until the primary player's first chat message",
        false,
        |_| Ok(AnyAnalyzer::FirstChat(FirstChatSeconds::default())),
    ),
    AnalyzerDescriptor {
        name: "my-first-specific-unit-seconds",
        description:
            "Seconds until the primary player first produces one of the given units (comma-separated)",
        takes_arguments: true,
        boolean_result: false,
        build: |arguments| Ok(AnyAnalyzer::FirstUnit(FirstUnitSeconds::new(arguments.to_vec()))),
    },
    header(
        "my-game",
        "Whether the primary player plays in the match",
        true,
        |_| fact(HeaderFact::MyGame),
    ),
    header(
        "my-name",
        "Name of the primary player",
        false,
        |_| fact(HeaderFact::MyName),
    ),
    header(
        "my-race",
        "Race of the primary player",
        false,
        |_| fact(HeaderFact::MyRace),
    ),
    header(
        "my-race-is-protoss",
        "Whether the primary player is Protoss",
        true,
        |_| fact(HeaderFact::MyRaceIs(Race::Protoss)),
    ),
    header(
        "my-race-is-terran",
        "Whether the primary player is Terran",
        true,
        |_| fact(HeaderFact::MyRaceIs(Race::Terran)),
    ),
    header(
        "my-race-is-zerg",
        "Whether the primary player is Zerg",
        true,
        |_| fact(HeaderFact::MyRaceIs(Race::Zerg)),
    ),
    header(
        "my-win",
        "Whether the primary player's team won",
        true,
        |_| fact(HeaderFact::MyWin),
    ),
    header(
        "replay-name",
        "File name of the replay",
        false,
        |_| fact(HeaderFact::ReplayName),
    ),
    header(
        "replay-path",
        "Path of the replay",
        false,
        |_| fact(HeaderFact::ReplayPath),
    ),
];

/// Looks up a built-in analyzer by name.
pub fn descriptor(name: &str) -> Option<&'static AnalyzerDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}

/// Resolves and validates a selection.
///
/// # Errors
/// Returns an [`ArgumentError`] for unknown names or invalid arguments.
pub fn instantiate(
    spec: &AnalyzerSpec,
) -> Result<(&'static AnalyzerDescriptor, AnyAnalyzer), ArgumentError> {
    let descriptor =
        descriptor(&spec.name).ok_or_else(|| ArgumentError::UnknownAnalyzer(spec.name.clone()))?;
    let analyzer = descriptor.build(&spec.argument_list())?;
    Ok((descriptor, analyzer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_sorted_and_unique() {
        for pair in REGISTRY.windows(2) {
            assert!(pair[0].name < pair[1].name, "{} >= {}", pair[0].name, pair[1].name);
        }
    }

    #[test]
    fn argument_validation() {
        assert!(instantiate(&AnalyzerSpec::new("my-apm")).is_ok());
        assert_eq!(
            instantiate(&AnalyzerSpec::with_arguments("my-apm", "x")).unwrap_err(),
            ArgumentError::UnexpectedArguments("my-apm")
        );
        assert_eq!(
            instantiate(&AnalyzerSpec::with_arguments("is-there-a-race", " , ")).unwrap_err(),
            ArgumentError::MissingArguments("is-there-a-race")
        );
        assert_eq!(
            instantiate(&AnalyzerSpec::with_arguments("is-there-a-race", "zerg,random"))
                .unwrap_err(),
            ArgumentError::UnknownRace("random".to_owned())
        );
        assert_eq!(
            instantiate(&AnalyzerSpec::new("my-mmr")).unwrap_err(),
            ArgumentError::UnknownAnalyzer("my-mmr".to_owned())
        );
    }

    #[test]
    fn builds_the_right_kind() {
        let (descriptor, analyzer) =
            instantiate(&AnalyzerSpec::with_arguments("is-there-a-race", "Zerg, terran")).unwrap();
        assert!(descriptor.boolean_result);
        let AnyAnalyzer::Header(analyzer) = analyzer else {
            panic!("expected a header analyzer");
        };
        assert_eq!(
            analyzer.fact(),
            &HeaderFact::IsThereARace(vec![Race::Zerg, Race::Terran])
        );

        let (_, analyzer) = instantiate(&AnalyzerSpec::with_arguments(
            "my-first-specific-unit-seconds",
            "Zergling",
        ))
        .unwrap();
        assert!(matches!(analyzer, AnyAnalyzer::FirstUnit(_)));
    }
}
