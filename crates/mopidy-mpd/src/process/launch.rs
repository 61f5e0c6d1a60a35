//! Launch sequencing: bootstrap, listen, wait, tear down.

use std::io::{self, Write};
use std::sync::Arc;

use mopidy_config::Config;
use mopidy_core::{Backend, DummyBackend};
use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::ShutdownTrigger;

use super::PROCESS_TARGET;
use super::cli::Cli;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to run the server.
struct LaunchPlan<L, S> {
    loader: L,
    shutdown: S,
    reporter: Arc<dyn HealthReporter>,
    pub(crate) backend: Arc<dyn Backend>,
}

/// Runs the server using the production collaborators.
///
/// With `--show-config` the effective configuration is printed to standard
/// output and nothing is bound.
///
/// # Errors
///
/// Returns [`LaunchError`] when configuration, bootstrap, binding or signal
/// installation fails.
pub fn run_server(cli: &Cli) -> Result<(), LaunchError> {
    let loader = SystemConfigLoader::new(cli.config.clone());
    if cli.show_config {
        let config = loader.load()?;
        return render_config(&config, &mut io::stdout().lock());
    }
    run_server_with(LaunchPlan {
        loader,
        shutdown: SystemShutdownSignal::new(),
        reporter: Arc::new(StructuredHealthReporter::new()),
        backend: Arc::new(DummyBackend::new()),
    })
}

/// Runs the server with injected collaborators.
fn run_server_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        shutdown,
        reporter,
        backend,
    } = plan;

    let server = bootstrap_with(&loader, reporter, backend)?;
    if !server.config().mpd.enabled {
        info!(target: PROCESS_TARGET, "MPD frontend disabled; nothing to serve");
        return Ok(());
    }

    let trigger = ShutdownTrigger::new();
    let listener = server.listen(trigger.clone())?;
    shutdown.wait(&trigger)?;
    server.reporter().shutdown_requested();
    listener.shutdown();
    listener.join()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

/// Writes the configuration as TOML with secrets masked.
pub(crate) fn render_config(config: &Config, out: &mut dyn Write) -> Result<(), LaunchError> {
    let rendered = config
        .to_toml_string(true)
        .map_err(|source| LaunchError::Render { source })?;
    out.write_all(rendered.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| LaunchError::Io { source })
}
