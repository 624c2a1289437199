use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "daybook", version, about = "Terminal month calendar with hourly notes")]
pub struct Cli {
    /// Log level for the log file (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a notes file for the current directory
    Init,
    /// Print the month grid; days with notes are starred
    Month {
        /// Any day in the month (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the hourly agenda of a day
    Day {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Save a note at an hour; blank text removes it
    Set {
        /// Day (YYYY-MM-DD)
        date: String,
        /// Hour of the day, 0-23
        hour: u32,
        /// Note text
        text: String,
    },
    /// Remove the note at an hour
    Remove {
        /// Day (YYYY-MM-DD)
        date: String,
        /// Hour of the day, 0-23
        hour: u32,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Remove every note
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Fill the months around today with sample notes
    Seed,
    /// Launch the interactive TUI
    Tui,
}
