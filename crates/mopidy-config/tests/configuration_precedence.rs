use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use mopidy_config::{Config, ConfigArgs, SocketEndpoint};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

struct Harness {
    temp_dir: TempDir,
    args: RefCell<ConfigArgs>,
    env_path: RefCell<Option<PathBuf>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            args: RefCell::new(ConfigArgs::default()),
            env_path: RefCell::new(None),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
        }
    }

    fn write_port_file(&self, name: &str, port: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Err(error) = fs::write(&path, format!("[mpd]\nport = {port}\n")) {
            panic!("failed to write configuration: {error}");
        }
        path
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }
        let args = self.args.borrow().clone();
        let env_path = self.env_path.borrow().clone();
        // An empty file stands in for the per-user file so the host's own
        // configuration never leaks into the scenario.
        let env_path = env_path.unwrap_or_else(|| self.write_empty_file());
        match Config::load_layers(Some(&env_path), &args) {
            Ok(config) => *self.loaded.borrow_mut() = Some(config),
            Err(error) => *self.error.borrow_mut() = Some(error.to_string()),
        }
    }

    fn write_empty_file(&self) -> PathBuf {
        let path = self.temp_dir.path().join("empty.toml");
        if let Err(error) = fs::write(&path, "") {
            panic!("failed to write configuration: {error}");
        }
        path
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the port to \"{port}\"")]
fn given_configuration_file(harness: &Harness, port: String) {
    let path = harness.write_port_file("cli.toml", &port);
    harness.args.borrow_mut().config_path = Some(path);
}

#[given("the environment names a file setting the port to \"{port}\"")]
fn given_environment_file(harness: &Harness, port: String) {
    let path = harness.write_port_file("env.toml", &port);
    *harness.env_path.borrow_mut() = Some(path);
}

#[when("the option \"{option}\" is given")]
fn when_option_given(harness: &Harness, option: String) {
    harness.args.borrow_mut().options.push(option);
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[then("loading the configuration listens on host \"{hostname}\" port \"{port}\"")]
fn then_listens_on(harness: &Harness, hostname: String, port: u16) {
    harness.load();

    if let Some(error) = harness.error.borrow().as_ref() {
        panic!("configuration failed to load: {error}");
    }

    let loaded = harness.loaded.borrow();
    let Some(config) = loaded.as_ref() else {
        panic!("configuration was not loaded");
    };

    assert_eq!(
        config.mpd.endpoint(),
        SocketEndpoint::from_hostname(&hostname, port)
    );
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Defaults apply when nothing is overridden"
)]
fn defaults_apply(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "A configuration file replaces the defaults"
)]
fn file_replaces_defaults(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The command line file wins over the environment file"
)]
fn cli_file_wins_over_env_file(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Options win over every file"
)]
fn options_win_over_files(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "A unix hostname selects a domain socket"
)]
fn unix_hostname_selects_socket(#[from(harness)] harness: Harness) {
    drop(harness);
}
