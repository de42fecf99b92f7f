#[macro_use]
extern crate prettytable;

use anyhow::anyhow;
use directories::UserDirs;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod cli;
mod interface;
mod model;
mod store;

use cli::{Command::*, CommandLineArgs};
use interface::StdinPicker;
use store::Store;

const DATA_FILE_NAME: &str = ".timetrack.json";

/// Default store location: a single file in the user's home directory.
fn find_default_data_file() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| dirs.home_dir().join(DATA_FILE_NAME))
}

fn enable_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    // Get the command-line arguments.
    let CommandLineArgs {
        action,
        data_file,
        verbose,
    } = CommandLineArgs::from_args();

    enable_logging(verbose);

    // Unpack the data file.
    let data_file = data_file
        .or_else(find_default_data_file)
        .ok_or(anyhow!("Failed to locate a home directory for the data file."))?;

    let store = Store::new(data_file);

    // Perform the action.
    match action {
        Create { project } => interface::create_project(&store, &project),
        Start { project } => interface::start_tracking(&store, project, &StdinPicker),
        Stop {
            project,
            description,
        } => interface::stop_tracking(&store, project, description, &StdinPicker),
        Summary => interface::print_summary(&store),
        Archive { project } => interface::archive_project(&store, &project),
        Restore { project } => interface::restore_project(&store, &project),
    }?;
    Ok(())
}
