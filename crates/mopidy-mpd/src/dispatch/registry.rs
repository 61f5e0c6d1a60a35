//! Command pattern registry.
//!
//! A pattern is the literal command name followed by placeholders:
//!
//! | Token       | Meaning                                          |
//! |-------------|--------------------------------------------------|
//! | `<name>`    | one required argument                            |
//! | `[<name>]`  | one optional argument, only at the tail          |
//! | `<name>...` | zero or more trailing arguments                  |
//! | `{a\|b}`    | one required argument from a case-insensitive set |
//!
//! Patterns are scanned in registration order and the first structural match
//! wins. Registering the same pattern text twice is a startup error.

use std::collections::BTreeMap;

use mopidy_core::Facility;

use super::arguments::Arguments;
use super::errors::{CommandError, RegistryError};
use super::response::Payload;
use crate::commands::{self, CommandContext};

/// Handler bound to a pattern.
pub type Handler = fn(&mut CommandContext<'_>, &Arguments<'_>) -> Result<Payload, CommandError>;

/// What a command touches, used for authentication and availability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Connection housekeeping allowed before authentication.
    Connection,
    /// Server-wide commands that need no backend facility.
    Server,
    /// Player status queries.
    Status,
    /// Transport control.
    Playback,
    /// The play queue.
    CurrentPlaylist,
    /// Saved playlists.
    StoredPlaylists,
    /// Library lookups.
    Library,
    /// Audio outputs and volume.
    Output,
}

impl Capability {
    /// Backend facility the command needs, if any.
    #[must_use]
    pub const fn facility(self) -> Option<Facility> {
        match self {
            Self::Connection | Self::Server => None,
            Self::Status | Self::Playback => Some(Facility::Playback),
            Self::CurrentPlaylist => Some(Facility::CurrentPlaylist),
            Self::StoredPlaylists => Some(Facility::StoredPlaylists),
            Self::Library => Some(Facility::Library),
            Self::Output => Some(Facility::Mixer),
        }
    }

    /// Reports whether a password-protected session must authenticate first.
    #[must_use]
    pub const fn requires_authentication(self) -> bool {
        !matches!(self, Self::Connection)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Required(String),
    Optional(String),
    Variadic(String),
    Choice(Vec<String>),
}

impl Slot {
    fn parse(pattern: &str, token: &str) -> Result<Self, RegistryError> {
        let invalid = || RegistryError::InvalidPlaceholder {
            pattern: pattern.to_owned(),
            token: token.to_owned(),
        };
        if let Some(inner) = token.strip_prefix("[<").and_then(|rest| rest.strip_suffix(">]")) {
            return placeholder_name(inner).map(Self::Optional).ok_or_else(invalid);
        }
        if let Some(inner) = token.strip_prefix('<').and_then(|rest| rest.strip_suffix(">...")) {
            return placeholder_name(inner).map(Self::Variadic).ok_or_else(invalid);
        }
        if let Some(inner) = token.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
            return placeholder_name(inner).map(Self::Required).ok_or_else(invalid);
        }
        if let Some(inner) = token.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
            let choices: Vec<String> = inner.split('|').map(str::to_owned).collect();
            if choices.iter().any(|choice| placeholder_name(choice).is_none()) {
                return Err(invalid());
            }
            return Ok(Self::Choice(choices));
        }
        Err(invalid())
    }

    fn name(&self) -> Option<&str> {
        match self {
            Self::Required(name) | Self::Optional(name) | Self::Variadic(name) => Some(name),
            Self::Choice(_) => None,
        }
    }

    fn is_tail(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Variadic(_))
    }
}

fn placeholder_name(text: &str) -> Option<String> {
    let valid = !text.is_empty()
        && text
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    valid.then(|| text.to_owned())
}

/// Immutable registration record.
#[derive(Debug, Clone)]
pub struct CommandPattern {
    text: String,
    name: String,
    slots: Vec<Slot>,
    capability: Capability,
    handler: Handler,
}

impl CommandPattern {
    /// Normalised pattern text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Literal command name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Facility and authentication class.
    #[must_use]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub(crate) fn handler(&self) -> Handler {
        self.handler
    }

    /// Reports whether `arguments` fit the placeholders.
    #[must_use]
    pub fn matches(&self, arguments: &[String]) -> bool {
        let mut consumed = 0;
        for slot in &self.slots {
            match slot {
                Slot::Required(_) => {
                    if consumed >= arguments.len() {
                        return false;
                    }
                    consumed += 1;
                }
                Slot::Choice(choices) => {
                    let Some(value) = arguments.get(consumed) else {
                        return false;
                    };
                    if !choices.iter().any(|choice| choice.eq_ignore_ascii_case(value)) {
                        return false;
                    }
                    consumed += 1;
                }
                Slot::Optional(_) => {
                    if consumed < arguments.len() {
                        consumed += 1;
                    }
                }
                Slot::Variadic(_) => consumed = arguments.len(),
            }
        }
        consumed == arguments.len()
    }

    /// Binds `arguments` to this pattern's placeholder names.
    #[must_use]
    pub fn arguments<'a>(&'a self, arguments: &'a [String]) -> Arguments<'a> {
        let names = self.slots.iter().map(Slot::name).collect();
        Arguments::new(names, arguments)
    }
}

fn parse_pattern(text: &str) -> Result<(String, Vec<Slot>), RegistryError> {
    let mut tokens = text.split_whitespace();
    let name = tokens.next().ok_or(RegistryError::EmptyPattern)?;
    let mut slots: Vec<Slot> = Vec::new();
    for token in tokens {
        let slot = Slot::parse(text, token)?;
        let after_tail = slots.last().is_some_and(|last| {
            matches!(last, Slot::Variadic(_)) || (last.is_tail() && !slot.is_tail())
        });
        if after_tail {
            return Err(RegistryError::MisplacedOptional {
                pattern: text.to_owned(),
                token: token.to_owned(),
            });
        }
        slots.push(slot);
    }
    Ok((name.to_owned(), slots))
}

/// Outcome of looking up a request.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// The first pattern whose structure fits.
    Matched(&'a CommandPattern),
    /// The command exists but no pattern accepts these arguments.
    Mismatch,
    /// No pattern uses this command name.
    Unknown,
}

/// Ordered set of command patterns.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    patterns: Vec<CommandPattern>,
    by_name: BTreeMap<String, Vec<usize>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry holding every protocol command.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (pattern, capability, handler) in commands::catalog() {
            registry.register(pattern)?.bind(capability, handler);
        }
        Ok(registry)
    }

    /// Starts registering `pattern`; the returned binder attaches the handler.
    pub fn register(&mut self, pattern: &str) -> Result<Binder<'_>, RegistryError> {
        let (name, slots) = parse_pattern(pattern)?;
        let text = pattern.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.patterns.iter().any(|existing| existing.text == text) {
            return Err(RegistryError::DuplicatePattern { pattern: text });
        }
        Ok(Binder {
            registry: self,
            text,
            name,
            slots,
        })
    }

    /// Finds the pattern for `name` that accepts `arguments`.
    #[must_use]
    pub fn resolve(&self, name: &str, arguments: &[String]) -> Resolution<'_> {
        let Some(indices) = self.by_name.get(name) else {
            return Resolution::Unknown;
        };
        indices
            .iter()
            .filter_map(|index| self.patterns.get(*index))
            .find(|pattern| pattern.matches(arguments))
            .map_or(Resolution::Mismatch, Resolution::Matched)
    }

    /// Distinct command names with the capability of their first pattern.
    pub fn commands(&self) -> impl Iterator<Item = (&str, Capability)> + '_ {
        self.by_name.iter().filter_map(|(name, indices)| {
            let first = indices.first().and_then(|index| self.patterns.get(*index))?;
            Some((name.as_str(), first.capability))
        })
    }

    /// Number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Reports whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Pending registration returned by [`CommandRegistry::register`].
#[must_use = "a pattern is only registered once a handler is bound"]
pub struct Binder<'a> {
    registry: &'a mut CommandRegistry,
    text: String,
    name: String,
    slots: Vec<Slot>,
}

impl Binder<'_> {
    /// Stores the pattern with its handler.
    pub fn bind(self, capability: Capability, handler: Handler) {
        let index = self.registry.patterns.len();
        self.registry
            .by_name
            .entry(self.name.clone())
            .or_default()
            .push(index);
        self.registry.patterns.push(CommandPattern {
            text: self.text,
            name: self.name,
            slots: self.slots,
            capability,
            handler,
        });
    }
}

#[cfg(test)]
mod tests;
