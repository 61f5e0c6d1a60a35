//! Splits a request line into a command name and its arguments.
//!
//! Words are separated by whitespace outside double quotes. Inside quotes a
//! backslash escapes a following `"` or `\`; before anything else it is kept
//! as written.

use std::iter::Peekable;
use std::str::Chars;

use super::errors::TokenizeError;

/// A tokenized request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    name: String,
    arguments: Vec<String>,
}

impl Request {
    /// Builds a request from already split parts.
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Command name; empty for a blank line.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments in request order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Reports whether the line held nothing but whitespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.arguments.is_empty()
    }
}

/// Tokenizes one request line. Trailing `\r` and `\n` are ignored.
pub fn tokenize(line: &str) -> Result<Request, TokenizeError> {
    let mut chars = line.trim_end_matches(['\r', '\n']).chars().peekable();
    let mut words = Vec::new();

    loop {
        while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
        let Some(&first) = chars.peek() else {
            break;
        };
        if first == '"' {
            chars.next();
            match quoted_word(&mut chars) {
                Some(word) => words.push(word),
                None => {
                    return Err(TokenizeError::UnterminatedQuote {
                        command: words.first().cloned().unwrap_or_default(),
                    });
                }
            }
        } else {
            words.push(bare_word(&mut chars));
        }
    }

    let mut words = words.into_iter();
    let name = words.next().unwrap_or_default();
    Ok(Request::new(name, words.collect()))
}

fn bare_word(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut word = String::new();
    while let Some(ch) = chars.next_if(|ch| !ch.is_whitespace()) {
        word.push(ch);
    }
    word
}

/// Reads up to the closing quote; `None` when the line ends first.
fn quoted_word(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut word = String::new();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => return Some(word),
            '\\' => match chars.next_if(|next| *next == '"' || *next == '\\') {
                Some(escaped) => word.push(escaped),
                None => word.push('\\'),
            },
            other => word.push(other),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn words(request: &Request) -> Vec<&str> {
        std::iter::once(request.name())
            .chain(request.arguments().iter().map(String::as_str))
            .collect()
    }

    #[rstest]
    #[case("ping", &["ping"])]
    #[case("play \"0\"", &["play", "0"])]
    #[case("play 0", &["play", "0"])]
    #[case("  seek   \"1\"\t\"30\"  ", &["seek", "1", "30"])]
    #[case("lsinfo \"\"", &["lsinfo", ""])]
    #[case("search \"title\" \"two words\"", &["search", "title", "two words"])]
    #[case("find \"album\" \"say \\\"hi\\\"\"", &["find", "album", "say \"hi\""])]
    #[case("load \"back\\\\slash\"", &["load", "back\\slash"])]
    #[case("load \"keep\\n\"", &["load", "keep\\n"])]
    #[case("status\r\n", &["status"])]
    fn splits_words(#[case] line: &str, #[case] expected: &[&str]) {
        let request = tokenize(line).expect("tokenize");
        assert_eq!(words(&request), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n")]
    fn blank_lines_are_empty_requests(#[case] line: &str) {
        let request = tokenize(line).expect("tokenize");
        assert!(request.is_empty());
    }

    #[test]
    fn unterminated_quote_names_the_command() {
        let error = tokenize("play \"0").expect_err("quote left open");
        assert_eq!(error.command(), "play");
        assert_eq!(error.to_string(), "unterminated quoted argument");
    }

    #[test]
    fn unterminated_quote_in_name_has_no_command() {
        let error = tokenize("\"play").expect_err("quote left open");
        assert_eq!(error.command(), "");
    }

    #[test]
    fn numbers_stay_text() {
        let request = tokenize("playid -1").expect("tokenize");
        assert_eq!(request.arguments(), ["-1".to_owned()]);
    }
}
