//! Tests for pattern parsing and resolution.

use rstest::{fixture, rstest};

use super::*;

fn noop(
    _context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    Ok(Payload::new())
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn registry_with(patterns: &[&str]) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for pattern in patterns {
        registry
            .register(pattern)
            .expect("valid pattern")
            .bind(Capability::Server, noop);
    }
    registry
}

#[fixture]
fn list_registry() -> CommandRegistry {
    registry_with(&["list {artist}", "list {album} [<artist>]", "idle <subsystems>..."])
}

#[rstest]
fn duplicate_patterns_are_rejected() {
    let mut registry = registry_with(&["play [<songpos>]"]);
    let error = registry
        .register("play   [<songpos>]")
        .err()
        .expect("duplicate should fail");
    assert_eq!(
        error,
        RegistryError::DuplicatePattern {
            pattern: "play [<songpos>]".to_owned()
        }
    );
}

#[rstest]
fn same_name_with_different_shapes_is_allowed(list_registry: CommandRegistry) {
    assert_eq!(list_registry.len(), 3);
    assert_eq!(list_registry.commands().count(), 2);
}

#[rstest]
#[case("", RegistryError::EmptyPattern)]
#[case(
    "play <>",
    RegistryError::InvalidPlaceholder {
        pattern: "play <>".to_owned(),
        token: "<>".to_owned(),
    }
)]
#[case(
    "find album",
    RegistryError::InvalidPlaceholder {
        pattern: "find album".to_owned(),
        token: "album".to_owned(),
    }
)]
#[case(
    "move [<from>] <to>",
    RegistryError::MisplacedOptional {
        pattern: "move [<from>] <to>".to_owned(),
        token: "<to>".to_owned(),
    }
)]
#[case(
    "idle <subsystems>... [<extra>]",
    RegistryError::MisplacedOptional {
        pattern: "idle <subsystems>... [<extra>]".to_owned(),
        token: "[<extra>]".to_owned(),
    }
)]
fn malformed_patterns_are_rejected(#[case] pattern: &str, #[case] expected: RegistryError) {
    let mut registry = CommandRegistry::new();
    let error = registry.register(pattern).err().expect("pattern should fail");
    assert_eq!(error, expected);
}

#[rstest]
#[case(&["artist"], "list {artist}")]
#[case(&["ARTIST"], "list {artist}")]
#[case(&["album"], "list {album} [<artist>]")]
#[case(&["Album", "Nirvana"], "list {album} [<artist>]")]
fn first_structural_match_wins(
    list_registry: CommandRegistry,
    #[case] values: &[&str],
    #[case] expected: &str,
) {
    match list_registry.resolve("list", &args(values)) {
        Resolution::Matched(pattern) => assert_eq!(pattern.text(), expected),
        other => panic!("expected a match, got {other:?}"),
    }
}

#[rstest]
#[case(&[])]
#[case(&["title"])]
#[case(&["artist", "extra"])]
#[case(&["album", "a", "b"])]
fn unmatched_arguments_are_a_mismatch(list_registry: CommandRegistry, #[case] values: &[&str]) {
    assert!(matches!(
        list_registry.resolve("list", &args(values)),
        Resolution::Mismatch
    ));
}

#[rstest]
fn unknown_names_are_reported(list_registry: CommandRegistry) {
    assert!(matches!(
        list_registry.resolve("bogus", &[]),
        Resolution::Unknown
    ));
}

#[rstest]
#[case(&[])]
#[case(&["player"])]
#[case(&["player", "mixer", "options"])]
fn variadic_slots_take_any_count(list_registry: CommandRegistry, #[case] values: &[&str]) {
    let values = args(values);
    let Resolution::Matched(pattern) = list_registry.resolve("idle", &values) else {
        panic!("idle should match");
    };
    let bound = pattern.arguments(&values);
    assert_eq!(bound.rest("subsystems"), values.as_slice());
}

#[rstest]
fn bound_arguments_are_named() {
    let registry = registry_with(&["addid <uri> [<songpos>]"]);
    let values = args(&["dummy:a", "3"]);
    let Resolution::Matched(pattern) = registry.resolve("addid", &values) else {
        panic!("addid should match");
    };
    let bound = pattern.arguments(&values);
    assert_eq!(bound.command(), "addid");
    assert_eq!(bound.get("uri"), Some("dummy:a"));
    assert_eq!(bound.int("songpos").expect("integer"), 3);
}

#[test]
fn standard_registry_builds() {
    let registry = CommandRegistry::standard().expect("standard registry");
    let names: Vec<&str> = registry.commands().map(|(name, _)| name).collect();
    for expected in ["ping", "status", "playlistinfo", "lsinfo", "outputs", "kill"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
    assert_eq!(
        registry
            .commands()
            .find(|(name, _)| *name == "password")
            .map(|(_, capability)| capability),
        Some(Capability::Connection)
    );
}

#[rstest]
#[case(Capability::Connection, None, false)]
#[case(Capability::Server, None, true)]
#[case(Capability::Status, Some(Facility::Playback), true)]
#[case(Capability::Output, Some(Facility::Mixer), true)]
#[case(Capability::Library, Some(Facility::Library), true)]
fn capabilities_map_to_facilities(
    #[case] capability: Capability,
    #[case] facility: Option<Facility>,
    #[case] needs_auth: bool,
) {
    assert_eq!(capability.facility(), facility);
    assert_eq!(capability.requires_authentication(), needs_auth);
}
