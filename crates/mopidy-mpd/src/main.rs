use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use mopidy_mpd::{Cli, run_server};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_server(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr().lock(), "mopidy-mpd: {error}");
            ExitCode::FAILURE
        }
    }
}
