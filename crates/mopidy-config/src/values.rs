//! Typed config values.
//!
//! Every key in the schema is read through a [`ConfigValue`], which turns the
//! raw string gathered from the config layers into a typed value and back.
//! Empty raw strings mean "unset": required values reject them, optional ones
//! deserialize to `None`.

use std::fmt;
use std::marker::PhantomData;
use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::str::FromStr;

use strum::VariantNames;

use crate::error::ValueError;
use crate::logging::LogLevel;
use crate::socket::UNIX_PREFIX;
use crate::validators::{validate_choice, validate_maximum, validate_minimum, validate_required};

const MASK: &str = "********";

/// Conversion between raw config text and a typed value.
pub trait ConfigValue {
    /// Typed representation produced by [`ConfigValue::deserialize`].
    type Value;

    /// Parses and validates `raw`. Returns `Ok(None)` for an unset optional value.
    fn deserialize(&self, raw: &str) -> Result<Option<Self::Value>, ValueError>;

    /// Renders `value` back to config text. `display` masks secrets.
    fn serialize(&self, value: &Self::Value, display: bool) -> String;
}

/// Decodes the `\\`, `\n` and `\t` escapes used in config text.
#[must_use]
pub fn decode(value: &str) -> String {
    value
        .replace("\\\\", "\\")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

/// Inverse of [`decode`].
#[must_use]
pub fn encode(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

/// Free-form text, optionally restricted to a set of choices.
#[derive(Debug, Clone)]
pub struct StringValue {
    required: bool,
    choices: Option<Vec<String>>,
}

impl StringValue {
    /// A value that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            required: true,
            choices: None,
        }
    }

    /// A value that may be left empty.
    #[must_use]
    pub const fn optional() -> Self {
        Self {
            required: false,
            choices: None,
        }
    }

    /// Restricts the value to `choices`.
    #[must_use]
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }
}

impl ConfigValue for StringValue {
    type Value = String;

    fn deserialize(&self, raw: &str) -> Result<Option<String>, ValueError> {
        let value = decode(raw).trim().to_owned();
        validate_required(value.is_empty(), self.required)?;
        if value.is_empty() {
            return Ok(None);
        }
        validate_choice(&value, self.choices.as_deref())?;
        Ok(Some(value))
    }

    fn serialize(&self, value: &String, _display: bool) -> String {
        encode(value)
    }
}

/// Text whose contents never appear in logs or displayed config.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps a secret.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("SecretString").field(&MASK).finish()
    }
}

/// Secret text such as a password.
#[derive(Debug, Clone)]
pub struct Secret {
    required: bool,
}

impl Secret {
    /// A secret that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self { required: true }
    }

    /// A secret that may be left empty.
    #[must_use]
    pub const fn optional() -> Self {
        Self { required: false }
    }
}

impl ConfigValue for Secret {
    type Value = SecretString;

    fn deserialize(&self, raw: &str) -> Result<Option<SecretString>, ValueError> {
        let inner = StringValue {
            required: self.required,
            choices: None,
        };
        Ok(inner.deserialize(raw)?.map(SecretString))
    }

    fn serialize(&self, value: &SecretString, display: bool) -> String {
        if display {
            MASK.to_owned()
        } else {
            encode(value.expose())
        }
    }
}

/// Whole numbers with optional bounds and choices.
#[derive(Debug, Clone, Default)]
pub struct Integer {
    required: bool,
    minimum: Option<i64>,
    maximum: Option<i64>,
    choices: Option<Vec<i64>>,
}

impl Integer {
    /// An integer that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            required: true,
            minimum: None,
            maximum: None,
            choices: None,
        }
    }

    /// An integer that may be left empty.
    #[must_use]
    pub const fn optional() -> Self {
        Self {
            required: false,
            minimum: None,
            maximum: None,
            choices: None,
        }
    }

    /// Sets the inclusive lower bound.
    #[must_use]
    pub fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the inclusive upper bound.
    #[must_use]
    pub fn maximum(mut self, maximum: i64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Restricts the value to `choices`.
    #[must_use]
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = i64>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }
}

impl ConfigValue for Integer {
    type Value = i64;

    fn deserialize(&self, raw: &str) -> Result<Option<i64>, ValueError> {
        let text = decode(raw);
        let text = text.trim();
        validate_required(text.is_empty(), self.required)?;
        if text.is_empty() {
            return Ok(None);
        }
        let value: i64 = text
            .parse()
            .map_err(|_| ValueError::Integer(text.to_owned()))?;
        validate_choice(&value, self.choices.as_deref())?;
        validate_minimum(value, self.minimum)?;
        validate_maximum(value, self.maximum)?;
        Ok(Some(value))
    }

    fn serialize(&self, value: &i64, _display: bool) -> String {
        value.to_string()
    }
}

/// Floating point numbers with optional bounds.
#[derive(Debug, Clone, Default)]
pub struct Float {
    required: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
}

impl Float {
    /// A float that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            required: true,
            minimum: None,
            maximum: None,
        }
    }

    /// Sets the inclusive lower bound.
    #[must_use]
    pub const fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the inclusive upper bound.
    #[must_use]
    pub const fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }
}

impl ConfigValue for Float {
    type Value = f64;

    fn deserialize(&self, raw: &str) -> Result<Option<f64>, ValueError> {
        let text = decode(raw);
        let text = text.trim();
        validate_required(text.is_empty(), self.required)?;
        if text.is_empty() {
            return Ok(None);
        }
        let value: f64 = text.parse().map_err(|_| ValueError::Float(text.to_owned()))?;
        validate_minimum(value, self.minimum)?;
        validate_maximum(value, self.maximum)?;
        Ok(Some(value))
    }

    fn serialize(&self, value: &f64, _display: bool) -> String {
        value.to_string()
    }
}

/// `1/yes/true/on` or `0/no/false/off`, in any casing.
#[derive(Debug, Clone, Default)]
pub struct Boolean {
    required: bool,
}

impl Boolean {
    /// A boolean that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self { required: true }
    }
}

impl ConfigValue for Boolean {
    type Value = bool;

    fn deserialize(&self, raw: &str) -> Result<Option<bool>, ValueError> {
        let text = decode(raw).trim().to_ascii_lowercase();
        validate_required(text.is_empty(), self.required)?;
        match text.as_str() {
            "" => Ok(None),
            "1" | "yes" | "true" | "on" => Ok(Some(true)),
            "0" | "no" | "false" | "off" => Ok(Some(false)),
            _ => Err(ValueError::Boolean(text)),
        }
    }

    fn serialize(&self, value: &bool, _display: bool) -> String {
        String::from(if *value { "true" } else { "false" })
    }
}

/// Two values joined by a separator, such as `host|port`.
#[derive(Debug, Clone)]
pub struct Pair<A, B> {
    required: bool,
    optional_pair: bool,
    separator: char,
    first: A,
    second: B,
}

impl<A, B> Pair<A, B> {
    /// A required pair split on `separator`.
    #[must_use]
    pub fn new(separator: char, first: A, second: B) -> Self {
        Self {
            required: true,
            optional_pair: false,
            separator,
            first,
            second,
        }
    }

    /// Allows a lone value, which is then used for both halves.
    #[must_use]
    pub fn optional_pair(mut self) -> Self {
        self.optional_pair = true;
        self
    }
}

impl<A, B> ConfigValue for Pair<A, B>
where
    A: ConfigValue,
    B: ConfigValue,
{
    type Value = (A::Value, B::Value);

    fn deserialize(&self, raw: &str) -> Result<Option<Self::Value>, ValueError> {
        let text = decode(raw).trim().to_owned();
        validate_required(text.is_empty(), self.required)?;
        if text.is_empty() {
            return Ok(None);
        }
        let (first, second) = match text.split_once(self.separator) {
            Some((first, second)) => (first.trim(), second.trim()),
            None if self.optional_pair => (text.as_str(), text.as_str()),
            None => {
                return Err(ValueError::MissingSeparator {
                    separator: self.separator.to_string(),
                    value: text,
                });
            }
        };
        let first = self.first.deserialize(first)?.ok_or(ValueError::Required)?;
        let second = self
            .second
            .deserialize(second)?
            .ok_or(ValueError::Required)?;
        Ok(Some((first, second)))
    }

    fn serialize(&self, value: &Self::Value, display: bool) -> String {
        let first = self.first.serialize(&value.0, display);
        let second = self.second.serialize(&value.1, display);
        if !display && self.optional_pair && first == second {
            return first;
        }
        format!("{first}{}{second}", self.separator)
    }
}

/// Comma or newline separated values of one type.
#[derive(Debug, Clone)]
pub struct List<V> {
    required: bool,
    unique: bool,
    subtype: V,
}

impl<V> List<V> {
    /// An optional list of `subtype` values.
    #[must_use]
    pub fn of(subtype: V) -> Self {
        Self {
            required: false,
            unique: false,
            subtype,
        }
    }

    /// Rejects empty lists.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Drops repeated entries, keeping the first occurrence.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

impl<V> ConfigValue for List<V>
where
    V: ConfigValue,
    V::Value: PartialEq,
{
    type Value = Vec<V::Value>;

    fn deserialize(&self, raw: &str) -> Result<Option<Self::Value>, ValueError> {
        let text = decode(raw);
        let separator = if text.contains('\n') { '\n' } else { ',' };
        let mut values = Vec::new();
        for item in text.split(separator).map(str::trim).filter(|item| !item.is_empty()) {
            let Some(value) = self.subtype.deserialize(item)? else {
                continue;
            };
            if self.unique && values.contains(&value) {
                continue;
            }
            values.push(value);
        }
        validate_required(values.is_empty(), self.required)?;
        Ok(Some(values))
    }

    fn serialize(&self, value: &Self::Value, display: bool) -> String {
        value
            .iter()
            .map(|item| self.subtype.serialize(item, display))
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Values drawn from a `strum` enum's variant names, matched case-insensitively.
#[derive(Debug, Clone, Copy)]
pub struct EnumValue<T> {
    required: bool,
    marker: PhantomData<T>,
}

impl<T> EnumValue<T> {
    /// An enum value that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self {
            required: true,
            marker: PhantomData,
        }
    }

    /// An enum value that may be left empty.
    #[must_use]
    pub const fn optional() -> Self {
        Self {
            required: false,
            marker: PhantomData,
        }
    }
}

impl<T> ConfigValue for EnumValue<T>
where
    T: FromStr + fmt::Display + VariantNames,
{
    type Value = T;

    fn deserialize(&self, raw: &str) -> Result<Option<T>, ValueError> {
        let text = decode(raw).trim().to_ascii_lowercase();
        validate_required(text.is_empty(), self.required)?;
        if text.is_empty() {
            return Ok(None);
        }
        validate_choice(&text.as_str(), Some(T::VARIANTS))?;
        text.parse().map(Some).map_err(|_| ValueError::Choice {
            value: text.clone(),
            choices: T::VARIANTS.join(", "),
        })
    }

    fn serialize(&self, value: &T, _display: bool) -> String {
        value.to_string()
    }
}

/// Log verbosity names: `critical`, `error`, `warning`, `info`, `debug`, `trace`, `all`.
pub type LogLevelValue = EnumValue<LogLevel>;

/// A listening address: a resolvable host name, an IP, or `unix:/path`.
#[derive(Debug, Clone, Default)]
pub struct Hostname {
    required: bool,
}

impl Hostname {
    /// A hostname that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self { required: true }
    }
}

impl ConfigValue for Hostname {
    type Value = String;

    fn deserialize(&self, raw: &str) -> Result<Option<String>, ValueError> {
        let text = decode(raw).trim().to_owned();
        validate_required(text.is_empty(), self.required)?;
        if text.is_empty() {
            return Ok(None);
        }
        if let Some(path) = text.strip_prefix(UNIX_PREFIX) {
            let expanded = expand_path(path).ok_or_else(|| ValueError::Path(path.to_owned()))?;
            return Ok(Some(format!("{UNIX_PREFIX}{}", expanded.display())));
        }
        (text.as_str(), 0)
            .to_socket_addrs()
            .map_err(|_| ValueError::Hostname)?;
        Ok(Some(text))
    }

    fn serialize(&self, value: &String, _display: bool) -> String {
        encode(value)
    }
}

/// TCP port numbers, `0..=65535`.
#[derive(Debug, Clone)]
pub struct Port {
    inner: Integer,
}

impl Port {
    /// A port that must be set.
    #[must_use]
    pub fn required() -> Self {
        Self {
            inner: Integer::required()
                .minimum(0)
                .maximum(i64::from(u16::MAX)),
        }
    }
}

impl ConfigValue for Port {
    type Value = u16;

    fn deserialize(&self, raw: &str) -> Result<Option<u16>, ValueError> {
        let Some(value) = self.inner.deserialize(raw)? else {
            return Ok(None);
        };
        u16::try_from(value).map(Some).map_err(|_| ValueError::Maximum {
            value: value.to_string(),
            maximum: u16::MAX.to_string(),
        })
    }

    fn serialize(&self, value: &u16, _display: bool) -> String {
        value.to_string()
    }
}

/// A filesystem path together with the text it was expanded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedPath {
    /// Text as written in the config.
    pub original: String,
    /// Path with `~` and `$XDG_*_DIR` replaced.
    pub expanded: PathBuf,
}

/// Paths supporting `~` and `$XDG_CACHE_DIR`, `$XDG_CONFIG_DIR`,
/// `$XDG_DATA_DIR`, `$XDG_MUSIC_DIR`.
#[derive(Debug, Clone, Default)]
pub struct PathValue {
    required: bool,
}

impl PathValue {
    /// A path that must be set.
    #[must_use]
    pub const fn required() -> Self {
        Self { required: true }
    }
}

impl ConfigValue for PathValue {
    type Value = ExpandedPath;

    fn deserialize(&self, raw: &str) -> Result<Option<ExpandedPath>, ValueError> {
        let text = decode(raw).trim().to_owned();
        validate_required(text.is_empty(), self.required)?;
        if text.is_empty() {
            return Ok(None);
        }
        let expanded = expand_path(&text).ok_or_else(|| ValueError::Path(text.clone()))?;
        Ok(Some(ExpandedPath {
            original: text,
            expanded,
        }))
    }

    fn serialize(&self, value: &ExpandedPath, _display: bool) -> String {
        encode(&value.original)
    }
}

/// A retired key: accepted and ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deprecated;

impl ConfigValue for Deprecated {
    type Value = ();

    fn deserialize(&self, _raw: &str) -> Result<Option<()>, ValueError> {
        Ok(None)
    }

    fn serialize(&self, _value: &(), _display: bool) -> String {
        String::new()
    }
}

/// Expands `~` and the `$XDG_*_DIR` tokens. `None` when a referenced
/// directory is unknown on this platform.
pub(crate) fn expand_path(raw: &str) -> Option<PathBuf> {
    let tokens = [
        ("$XDG_CACHE_DIR", dirs::cache_dir as fn() -> Option<PathBuf>),
        ("$XDG_CONFIG_DIR", dirs::config_dir),
        ("$XDG_DATA_DIR", dirs::data_dir),
        ("$XDG_MUSIC_DIR", dirs::audio_dir),
    ];
    let mut expanded = raw.to_owned();
    for (token, lookup) in tokens {
        if expanded.contains(token) {
            let dir = lookup()?;
            expanded = expanded.replace(token, &dir.to_string_lossy());
        }
    }
    if expanded == "~" {
        return dirs::home_dir();
    }
    if let Some(rest) = expanded.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }
    Some(PathBuf::from(expanded))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("a\\\\b", "a\\b")]
    #[case("line\\nbreak", "line\nbreak")]
    #[case("tab\\there", "tab\there")]
    fn decode_then_encode_restores_text(#[case] raw: &str, #[case] decoded: &str) {
        assert_eq!(decode(raw), decoded);
        assert_eq!(encode(decoded), raw);
    }

    #[test]
    fn string_value_enforces_choices() {
        let value = StringValue::required().with_choices(["json", "compact"]);
        assert_eq!(
            value.deserialize(" json ").expect("valid choice"),
            Some("json".to_owned())
        );
        let error = value.deserialize("xml").expect_err("not a choice");
        assert_eq!(
            error.to_string(),
            r#"must be one of "json", "compact", not "xml"."#
        );
    }

    #[test]
    fn required_string_rejects_blank() {
        let error = StringValue::required()
            .deserialize("   ")
            .expect_err("blank is unset");
        assert_eq!(error, ValueError::Required);
        assert_eq!(StringValue::optional().deserialize("").expect("optional"), None);
    }

    #[test]
    fn secret_is_masked_only_for_display() {
        let secret = Secret::optional()
            .deserialize("hunter2")
            .expect("valid")
            .expect("set");
        assert_eq!(Secret::optional().serialize(&secret, true), "********");
        assert_eq!(Secret::optional().serialize(&secret, false), "hunter2");
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[rstest]
    #[case("5", Ok(Some(5)))]
    #[case("", Err(ValueError::Required))]
    #[case("abc", Err(ValueError::Integer("abc".to_owned())))]
    #[case("0", Err(ValueError::Minimum { value: "0".to_owned(), minimum: "1".to_owned() }))]
    #[case("11", Err(ValueError::Maximum { value: "11".to_owned(), maximum: "10".to_owned() }))]
    fn integer_bounds(#[case] raw: &str, #[case] expected: Result<Option<i64>, ValueError>) {
        let value = Integer::required().minimum(1).maximum(10);
        assert_eq!(value.deserialize(raw), expected);
    }

    #[test]
    fn float_respects_bounds() {
        let value = Float::required().minimum(0.0).maximum(1.0);
        assert_eq!(value.deserialize("0.5").expect("in range"), Some(0.5));
        assert!(value.deserialize("1.5").is_err());
    }

    #[rstest]
    #[case("1", true)]
    #[case("Yes", true)]
    #[case("TRUE", true)]
    #[case("on", true)]
    #[case("0", false)]
    #[case("no", false)]
    #[case("False", false)]
    #[case("OFF", false)]
    fn boolean_spellings(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(Boolean::required().deserialize(raw), Ok(Some(expected)));
    }

    #[test]
    fn boolean_rejects_other_words() {
        assert_eq!(
            Boolean::required().deserialize("maybe"),
            Err(ValueError::Boolean("maybe".to_owned()))
        );
    }

    #[test]
    fn pair_splits_and_collapses_optional_pairs() {
        let value = Pair::new('|', StringValue::required(), Port::required()).optional_pair();
        let parsed = value
            .deserialize("localhost|6600")
            .expect("valid pair")
            .expect("set");
        assert_eq!(parsed, ("localhost".to_owned(), 6600));
        assert_eq!(value.serialize(&parsed, false), "localhost|6600");

        let same = Pair::new('|', StringValue::required(), StringValue::required()).optional_pair();
        let parsed = same.deserialize("abc").expect("lone value").expect("set");
        assert_eq!(parsed, ("abc".to_owned(), "abc".to_owned()));
        assert_eq!(same.serialize(&parsed, false), "abc");
    }

    #[test]
    fn pair_requires_separator_unless_optional() {
        let value = Pair::new('|', StringValue::required(), StringValue::required());
        assert!(matches!(
            value.deserialize("abc"),
            Err(ValueError::MissingSeparator { .. })
        ));
    }

    #[rstest]
    #[case("a, b ,c", vec!["a", "b", "c"])]
    #[case("a\nb, c\n\n", vec!["a", "b, c"])]
    #[case("a,a,b", vec!["a", "b"])]
    fn list_splits_on_comma_or_newline(#[case] raw: &str, #[case] expected: Vec<&str>) {
        let value = List::of(StringValue::required()).unique();
        let parsed = value.deserialize(raw).expect("valid list").expect("set");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn required_list_rejects_empty() {
        let value = List::of(StringValue::required()).required();
        assert_eq!(value.deserialize(" , "), Err(ValueError::Required));
    }

    #[test]
    fn log_level_value_accepts_any_casing() {
        assert_eq!(
            LogLevelValue::required().deserialize("Debug"),
            Ok(Some(LogLevel::Debug))
        );
        assert!(matches!(
            LogLevelValue::required().deserialize("verbose"),
            Err(ValueError::Choice { .. })
        ));
    }

    #[rstest]
    #[case("0", Some(0))]
    #[case("6600", Some(6600))]
    #[case("65535", Some(65535))]
    fn port_accepts_valid_range(#[case] raw: &str, #[case] expected: Option<u16>) {
        assert_eq!(Port::required().deserialize(raw), Ok(expected));
    }

    #[rstest]
    #[case("-1")]
    #[case("65536")]
    fn port_rejects_out_of_range(#[case] raw: &str) {
        assert!(Port::required().deserialize(raw).is_err());
    }

    #[test]
    fn hostname_accepts_ip_and_unix_socket() {
        assert_eq!(
            Hostname::required().deserialize("127.0.0.1"),
            Ok(Some("127.0.0.1".to_owned()))
        );
        assert_eq!(
            Hostname::required().deserialize("unix:/run/mpd.sock"),
            Ok(Some("unix:/run/mpd.sock".to_owned()))
        );
    }

    #[test]
    fn path_keeps_original_text() {
        let parsed = PathValue::required()
            .deserialize("/var/lib/mopidy")
            .expect("valid")
            .expect("set");
        assert_eq!(parsed.expanded, PathBuf::from("/var/lib/mopidy"));
        assert_eq!(PathValue::required().serialize(&parsed, true), "/var/lib/mopidy");
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_path("~/music"), Some(home.join("music")));
    }

    #[test]
    fn deprecated_ignores_anything() {
        assert_eq!(Deprecated.deserialize("whatever"), Ok(None));
    }
}
