use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Create a new project.
    Create {
        /// The project name.
        #[structopt(short, long)]
        project: String,
    },
    /// Start the timer for a project.
    Start {
        /// The project name. Prompts for a choice when omitted.
        #[structopt(short, long)]
        project: Option<String>,
    },
    /// Stop the timer for a project and record an entry.
    Stop {
        /// The project name. Prompts for a choice when omitted.
        #[structopt(short, long)]
        project: Option<String>,

        /// What was done. Prompts when omitted.
        #[structopt(long)]
        description: Option<String>,
    },
    /// Print every project's total time and entries.
    Summary,
    /// Hide a project from selection lists without deleting its data.
    Archive {
        /// The project name.
        #[structopt(short, long)]
        project: String,
    },
    /// Bring an archived project back.
    Restore {
        /// The project name.
        #[structopt(short, long)]
        project: String,
    },
}

#[derive(Debug, StructOpt)]
#[structopt(name = "timetrack", about = "A hyper-minimalistic per-project time tracker.")]
pub struct CommandLineArgs {
    #[structopt(subcommand)]
    pub action: Command,

    /// Use a different data file.
    #[structopt(parse(from_os_str), long)]
    pub data_file: Option<PathBuf>,

    /// Log debug output to stderr.
    #[structopt(short, long)]
    pub verbose: bool,
}
