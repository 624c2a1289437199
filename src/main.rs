mod cli;
mod commands;
mod config;
mod logging;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let config = config::Config::load()?;
    let level = args.log_level.as_deref().unwrap_or(&config.log_level);
    let _logger = logging::init_logging(level, &storage::log_dir()?)?;
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::Month { date } => commands::month(&config, date),
        cli::Command::Day { date } => commands::day(&config, date),
        cli::Command::Set { date, hour, text } => commands::set(&config, date, hour, text),
        cli::Command::Remove { date, hour, yes } => commands::remove(&config, date, hour, yes),
        cli::Command::Clear { yes } => commands::clear(&config, yes),
        cli::Command::Seed => commands::seed(&config),
        cli::Command::Tui => commands::tui(&config),
    }
}
