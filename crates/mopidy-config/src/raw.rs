//! Untyped `section -> key -> text` layers merged before schema validation.

use std::collections::BTreeMap;

use toml::Value;

use crate::error::RawConfigError;

/// Raw key/value text for every section, in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl RawConfig {
    /// Parses a TOML document.
    ///
    /// Scalars are stored as their textual form and arrays are joined with
    /// newlines, so the value types see the same shape whatever the source.
    pub fn parse(source: &str) -> Result<Self, RawConfigError> {
        let document: toml::Table = toml::from_str(source)?;
        let mut raw = Self::default();
        for (section, entries) in document {
            let Value::Table(entries) = entries else {
                return Err(RawConfigError::NotATable { section });
            };
            for (key, value) in entries {
                let text = value_text(&value).ok_or_else(|| RawConfigError::UnsupportedValue {
                    section: section.clone(),
                    key: key.clone(),
                })?;
                raw.set(&section, &key, text);
            }
        }
        Ok(raw)
    }

    /// Parses a `section/key=value` command line override.
    pub fn parse_override(option: &str) -> Result<(String, String, String), RawConfigError> {
        let invalid = || RawConfigError::Override(option.to_owned());
        let (path, value) = option.split_once('=').ok_or_else(invalid)?;
        let (section, key) = path.split_once('/').ok_or_else(invalid)?;
        let (section, key) = (section.trim(), key.trim());
        if section.is_empty() || key.is_empty() {
            return Err(invalid());
        }
        Ok((section.to_owned(), key.to_owned(), value.trim().to_owned()))
    }

    /// Sets one value, replacing any earlier layer's text.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_owned())
            .or_default()
            .insert(key.to_owned(), value.into());
    }

    /// Returns the text stored for `section/key`.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Returns the keys of one section.
    pub fn keys<'a>(&'a self, section: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    /// Returns every section name.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Overlays `other` on top of `self`.
    pub fn merge(&mut self, other: Self) {
        for (section, entries) in other.sections {
            self.sections.entry(section).or_default().extend(entries);
        }
    }

    /// Renders the layer as a TOML document of string values.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(&self.sections)
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Integer(number) => Some(number.to_string()),
        Value::Float(number) => Some(number.to_string()),
        Value::Boolean(flag) => Some(flag.to_string()),
        Value::Datetime(datetime) => Some(datetime.to_string()),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join("\n")),
        Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn scalars_become_text() {
        let raw = RawConfig::parse(
            r#"
            [mpd]
            enabled = false
            port = 6601
            hostname = "::"

            [logging]
            filter = ["mopidy_mpd=debug", "info"]
            "#,
        )
        .expect("valid toml");
        assert_eq!(raw.get("mpd", "enabled"), Some("false"));
        assert_eq!(raw.get("mpd", "port"), Some("6601"));
        assert_eq!(raw.get("mpd", "hostname"), Some("::"));
        assert_eq!(raw.get("logging", "filter"), Some("mopidy_mpd=debug\ninfo"));
    }

    #[test]
    fn top_level_scalars_are_rejected() {
        let error = RawConfig::parse("port = 1").expect_err("needs a section");
        assert!(matches!(error, RawConfigError::NotATable { section } if section == "port"));
    }

    #[test]
    fn nested_tables_are_rejected() {
        let error = RawConfig::parse("[mpd.extra]\nkey = 1").expect_err("nested table");
        assert!(matches!(error, RawConfigError::UnsupportedValue { .. }));
    }

    #[test]
    fn later_layers_win() {
        let mut base = RawConfig::parse("[mpd]\nport = 6600\nhostname = \"::\"").expect("base");
        let overlay = RawConfig::parse("[mpd]\nport = 7700").expect("overlay");
        base.merge(overlay);
        assert_eq!(base.get("mpd", "port"), Some("7700"));
        assert_eq!(base.get("mpd", "hostname"), Some("::"));
    }

    #[rstest]
    #[case("mpd/port=7000", ("mpd", "port", "7000"))]
    #[case(" logging/level = debug ", ("logging", "level", "debug"))]
    #[case("mpd/password=a=b", ("mpd", "password", "a=b"))]
    fn overrides_split_section_key_and_value(
        #[case] option: &str,
        #[case] expected: (&str, &str, &str),
    ) {
        let (section, key, value) = RawConfig::parse_override(option).expect("valid override");
        assert_eq!((section.as_str(), key.as_str(), value.as_str()), expected);
    }

    #[rstest]
    #[case("mpd.port=7000")]
    #[case("mpd/port")]
    #[case("/port=1")]
    fn malformed_overrides_fail(#[case] option: &str) {
        assert!(matches!(
            RawConfig::parse_override(option),
            Err(RawConfigError::Override(_))
        ));
    }
}
