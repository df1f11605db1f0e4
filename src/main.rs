mod args;
mod commands;
mod config;
mod dispatcher;
mod handler;
mod models;
mod pagination;
mod prompt;
mod resources;
mod table;
#[cfg(test)]
mod testing;
mod transport;

use std::io::{self, Write};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Result;
use config::Config;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::Api;
use crate::prompt::ConsolePrompt;
use crate::resources::Resources;
use crate::transport::{GitLabClient, Transport, Unconfigured};

const PROGRAM: &str = "glc";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // try_init fails only when a global subscriber is already installed
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Connects to GitLab when configuration is complete. Without it, help still
/// works and any command touching the network fails with the config error.
fn connect() -> Result<Api> {
    match Config::load() {
        Ok(config) => {
            let client = GitLabClient::new(&config)?;
            let resources = Resources::new(&config);
            tracing::debug!(project = resources.address(), "using project");
            Ok(Api::new(Rc::new(client), resources))
        }
        Err(err) => {
            tracing::warn!("running without configuration: {err:#}");
            let transport: Rc<dyn Transport> = Rc::new(Unconfigured::new(format!("{err:#}")));
            Ok(Api::new(transport, Resources::new(&Config::default())))
        }
    }
}

fn run(argv: &[String]) -> Result<()> {
    let api = connect()?;
    let mut dispatcher = commands::dispatcher(PROGRAM, api, Box::new(ConsolePrompt::default()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    dispatcher.run(argv, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let argv: Vec<String> = std::env::args().collect();
    match run(&argv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
