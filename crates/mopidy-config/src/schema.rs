//! Typed view over the raw layers.
//!
//! [`SectionReader`] pulls each key through its [`ConfigValue`] and records
//! failures instead of returning early, so one pass reports every invalid key.

use std::time::Duration;

use crate::error::{ConfigError, FieldError};
use crate::logging::LogFormat;
use crate::raw::RawConfig;
use crate::values::{
    Boolean, ConfigValue, EnumValue, Hostname, Integer, LogLevelValue, Port, Secret, StringValue,
};
use crate::{Config, LoggingConfig, MpdConfig};

/// Every section and key the schema accepts.
pub(crate) const SCHEMA: &[(&str, &[&str])] = &[
    ("logging", &["level", "format", "filter"]),
    (
        "mpd",
        &[
            "enabled",
            "hostname",
            "port",
            "password",
            "max_connections",
            "connection_timeout",
        ],
    ),
];

struct SectionReader<'a> {
    raw: &'a RawConfig,
    section: &'static str,
    errors: &'a mut Vec<FieldError>,
}

impl<'a> SectionReader<'a> {
    fn new(raw: &'a RawConfig, section: &'static str, errors: &'a mut Vec<FieldError>) -> Self {
        Self {
            raw,
            section,
            errors,
        }
    }

    fn read_optional<V: ConfigValue>(&mut self, key: &str, value: &V) -> Option<V::Value> {
        let text = self.raw.get(self.section, key).unwrap_or_default();
        match value.deserialize(text) {
            Ok(parsed) => parsed,
            Err(error) => {
                self.errors.push(FieldError::new(self.section, key, error));
                None
            }
        }
    }

    fn read<V: ConfigValue>(&mut self, key: &str, value: &V, fallback: V::Value) -> V::Value {
        self.read_optional(key, value).unwrap_or(fallback)
    }
}

fn unknown_keys(raw: &RawConfig, errors: &mut Vec<FieldError>) {
    for section in raw.sections() {
        let Some((_, keys)) = SCHEMA.iter().find(|(name, _)| *name == section) else {
            errors.push(FieldError::new(section, "*", "unknown config section."));
            continue;
        };
        for key in raw.keys(section) {
            if !keys.contains(&key) {
                errors.push(FieldError::new(section, key, "unknown config key."));
            }
        }
    }
}

pub(crate) fn from_raw(raw: &RawConfig) -> Result<Config, ConfigError> {
    let defaults = Config::default();
    let mut errors = Vec::new();
    unknown_keys(raw, &mut errors);

    let logging = {
        let mut reader = SectionReader::new(raw, "logging", &mut errors);
        LoggingConfig {
            level: reader.read("level", &LogLevelValue::required(), defaults.logging.level),
            format: reader.read(
                "format",
                &EnumValue::<LogFormat>::required(),
                defaults.logging.format,
            ),
            filter: reader.read_optional("filter", &StringValue::optional()),
        }
    };

    let mpd = {
        let mut reader = SectionReader::new(raw, "mpd", &mut errors);
        let max_connections = reader.read(
            "max_connections",
            &Integer::required().minimum(1).maximum(i64::from(u32::MAX)),
            i64::from(defaults.mpd.max_connections),
        );
        let connection_timeout = reader.read(
            "connection_timeout",
            &Integer::required().minimum(1),
            i64::try_from(defaults.mpd.connection_timeout.as_secs()).unwrap_or(i64::MAX),
        );
        MpdConfig {
            enabled: reader.read("enabled", &Boolean::required(), defaults.mpd.enabled),
            hostname: reader.read("hostname", &Hostname::required(), defaults.mpd.hostname),
            port: reader.read("port", &Port::required(), defaults.mpd.port),
            password: reader.read_optional("password", &Secret::optional()),
            max_connections: u32::try_from(max_connections)
                .unwrap_or(defaults.mpd.max_connections),
            connection_timeout: u64::try_from(connection_timeout)
                .map_or(defaults.mpd.connection_timeout, Duration::from_secs),
        }
    };

    if errors.is_empty() {
        Ok(Config { logging, mpd })
    } else {
        Err(ConfigError::Invalid { errors })
    }
}

pub(crate) fn to_raw(config: &Config, display: bool) -> RawConfig {
    let mut raw = RawConfig::default();
    let logging = &config.logging;
    raw.set(
        "logging",
        "level",
        LogLevelValue::required().serialize(&logging.level, display),
    );
    raw.set(
        "logging",
        "format",
        EnumValue::<LogFormat>::required().serialize(&logging.format, display),
    );
    raw.set(
        "logging",
        "filter",
        logging
            .filter
            .as_ref()
            .map(|filter| StringValue::optional().serialize(filter, display))
            .unwrap_or_default(),
    );

    let mpd = &config.mpd;
    raw.set(
        "mpd",
        "enabled",
        Boolean::required().serialize(&mpd.enabled, display),
    );
    raw.set(
        "mpd",
        "hostname",
        Hostname::required().serialize(&mpd.hostname, display),
    );
    raw.set("mpd", "port", Port::required().serialize(&mpd.port, display));
    raw.set(
        "mpd",
        "password",
        mpd.password
            .as_ref()
            .map(|secret| Secret::optional().serialize(secret, display))
            .unwrap_or_default(),
    );
    raw.set("mpd", "max_connections", mpd.max_connections.to_string());
    raw.set(
        "mpd",
        "connection_timeout",
        mpd.connection_timeout.as_secs().to_string(),
    );
    raw
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::defaults::DEFAULT_CONFIG;
    use crate::logging::LogLevel;

    fn defaults() -> RawConfig {
        RawConfig::parse(DEFAULT_CONFIG).expect("built-in defaults parse")
    }

    #[test]
    fn built_in_defaults_match_default_impl() {
        let config = from_raw(&defaults()).expect("defaults validate");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn every_schema_key_has_a_default() {
        let raw = defaults();
        for (section, keys) in SCHEMA {
            for key in *keys {
                assert!(raw.get(section, key).is_some(), "missing default {section}/{key}");
            }
        }
    }

    #[test]
    fn all_invalid_fields_are_reported_together() {
        let mut raw = defaults();
        raw.set("mpd", "port", "99999");
        raw.set("logging", "level", "loud");
        raw.set("mpd", "colour", "blue");
        let Err(ConfigError::Invalid { errors }) = from_raw(&raw) else {
            panic!("expected invalid configuration");
        };
        let keys: Vec<_> = errors
            .iter()
            .map(|error| format!("{}/{}", error.section, error.key))
            .collect();
        assert_eq!(keys, ["mpd/colour", "logging/level", "mpd/port"]);
    }

    #[rstest]
    #[case("max_connections", "0")]
    #[case("connection_timeout", "0")]
    #[case("enabled", "perhaps")]
    #[case("hostname", "")]
    fn rejects_invalid_mpd_values(#[case] key: &str, #[case] value: &str) {
        let mut raw = defaults();
        raw.set("mpd", key, value);
        let Err(ConfigError::Invalid { errors }) = from_raw(&raw) else {
            panic!("expected {key}={value:?} to be rejected");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(|error| error.key.as_str()), Some(key));
    }

    #[test]
    fn unknown_sections_are_rejected() {
        let mut raw = defaults();
        raw.set("http", "port", "6680");
        let error = from_raw(&raw).expect_err("unknown section");
        assert!(error.to_string().contains("http/* unknown config section."));
    }

    #[test]
    fn to_raw_masks_password_for_display() {
        let mut raw = defaults();
        raw.set("mpd", "password", "hunter2");
        raw.set("logging", "level", "debug");
        let config = from_raw(&raw).expect("valid");
        assert_eq!(config.logging.level, LogLevel::Debug);

        let displayed = to_raw(&config, true);
        assert_eq!(displayed.get("mpd", "password"), Some("********"));
        let exact = to_raw(&config, false);
        assert_eq!(exact.get("mpd", "password"), Some("hunter2"));
        assert_eq!(from_raw(&exact).expect("round trip"), config);
    }
}
