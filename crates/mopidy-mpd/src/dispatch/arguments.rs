//! Typed access to the arguments a pattern matched.

use std::ops::Range;

use super::errors::CommandError;

/// Arguments bound to the placeholder names of the matching pattern.
///
/// Optional and variadic placeholders only appear at the tail of a pattern,
/// so argument `i` always belongs to placeholder `i`.
#[derive(Debug, Clone)]
pub struct Arguments<'a> {
    names: Vec<Option<&'a str>>,
    values: &'a [String],
}

impl<'a> Arguments<'a> {
    pub(crate) fn new(names: Vec<Option<&'a str>>, values: &'a [String]) -> Self {
        Self { names, values }
    }

    /// Argument at `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).map(String::as_str)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|slot| *slot == Some(name))
    }

    /// Argument bound to placeholder `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.position(name).and_then(|index| self.value(index))
    }

    fn required(&self, name: &str) -> Result<&'a str, CommandError> {
        self.get(name)
            .ok_or_else(|| CommandError::argument(format!("missing argument \"{name}\"")))
    }

    /// Parses a required integer.
    pub fn int(&self, name: &str) -> Result<i64, CommandError> {
        parse_int(self.required(name)?)
    }

    /// Parses an optional integer.
    pub fn optional_int(&self, name: &str) -> Result<Option<i64>, CommandError> {
        self.get(name).map(parse_int).transpose()
    }

    /// Parses an optional `0`/`1` flag.
    pub fn flag(&self, name: &str) -> Result<Option<bool>, CommandError> {
        self.get(name)
            .map(|raw| match raw {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(CommandError::argument(format!("\"{other}\" is not 0 or 1"))),
            })
            .transpose()
    }

    /// Parses an optional `START`, `START:` or `START:END` song range.
    pub fn range(&self, name: &str) -> Result<Option<SongRange>, CommandError> {
        self.get(name).map(SongRange::parse).transpose()
    }
}

fn parse_int(raw: &str) -> Result<i64, CommandError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CommandError::argument(format!("\"{raw}\" is not a valid integer")))
}

/// Half-open range of playlist positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongRange {
    /// First position.
    pub start: usize,
    /// One past the last position; open when `None`.
    pub end: Option<usize>,
}

impl SongRange {
    fn parse(raw: &str) -> Result<Self, CommandError> {
        let invalid = || CommandError::argument(format!("\"{raw}\" is not a valid range"));
        let position = |text: &str| text.trim().parse::<usize>().map_err(|_| invalid());
        match raw.split_once(':') {
            None => {
                let start = position(raw)?;
                Ok(Self {
                    start,
                    end: Some(start.saturating_add(1)),
                })
            }
            Some((start, "")) => Ok(Self {
                start: position(start)?,
                end: None,
            }),
            Some((start, end)) => {
                let start = position(start)?;
                let end = position(end)?;
                if end < start {
                    return Err(invalid());
                }
                Ok(Self {
                    start,
                    end: Some(end),
                })
            }
        }
    }

    /// Positions inside `0..len` covered by the range; empty when disjoint.
    #[must_use]
    pub fn clamp(self, len: usize) -> Range<usize> {
        let end = self.end.map_or(len, |end| end.min(len));
        let start = self.start.min(end);
        start..end
    }
}
