use crate::config::Config;
use crate::storage::{init_project_store, locate_store, open_store, StoreLocation};
use crate::ui;
use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use daybook::clock::{Clock, ZonedClock};
use daybook::controller::{CalendarState, ConfirmRequest, SampleRange};
use daybook::grid::DayCell;
use daybook::model::NoteKey;
use daybook::sample::ChoreList;
use daybook::slot::Commit;
use daybook::store::YamlStore;
use std::env;
use std::io::{self, BufRead, Write};

pub type Calendar = CalendarState<YamlStore, ZonedClock<Local>>;

pub fn init() -> Result<()> {
    let location = init_project_store()?;
    println!("Initialized notes at {}", location.path.display());
    Ok(())
}

pub fn month(config: &Config, date: Option<String>) -> Result<()> {
    let (mut calendar, location) = load_calendar(config)?;
    if let Some(day) = parse_date(date.as_deref())? {
        calendar.select_month(day)?;
    }
    let grid = calendar.grid();
    println!(
        "{}  ({}: {})",
        grid.month.format("%B %Y"),
        location.scope.label(),
        location.path.display()
    );
    println!(
        "{}",
        calendar
            .week_start()
            .headings()
            .iter()
            .map(|h| format!(" {} ", h))
            .collect::<String>()
    );
    for week in grid.weeks() {
        println!("{}", week.iter().map(cell_text).collect::<String>());
    }
    print_warnings(&calendar);
    Ok(())
}

pub fn day(config: &Config, date: Option<String>) -> Result<()> {
    let (mut calendar, _) = load_calendar(config)?;
    if let Some(day) = parse_date(date.as_deref())? {
        calendar.select_day(day)?;
    }
    let agenda = calendar.agenda();
    println!("{}", agenda.day.format("%B %-d, %Y"));
    for slot in &agenda.slots {
        let label = hour_label(calendar.clock(), slot.key, slot.hour);
        if slot.is_skipped() {
            println!("  {}  (skipped by clock change)", label);
        } else if slot.displayed.is_empty() {
            println!("  {}", label);
        } else {
            println!("  {}  {}", label, slot.displayed);
        }
    }
    print_warnings(&calendar);
    Ok(())
}

pub fn set(config: &Config, date: String, hour: u32, text: String) -> Result<()> {
    let (mut calendar, _) = load_calendar(config)?;
    let day = require_date(&date)?;
    calendar.select_day(day)?;
    calendar
        .edit_slot(hour, &text)
        .with_context(|| format!("editing {} {}:00", day, hour))?;
    let commit = calendar
        .save_slot(hour)
        .with_context(|| format!("saving {} {}:00", day, hour))?;
    match commit {
        Commit::Stored => println!("Saved {} {:02}:00", day, hour),
        Commit::Removed => println!("Removed {} {:02}:00", day, hour),
        Commit::Unchanged => println!("Nothing to change at {} {:02}:00", day, hour),
    }
    Ok(())
}

pub fn remove(config: &Config, date: String, hour: u32, yes: bool) -> Result<()> {
    let (mut calendar, _) = load_calendar(config)?;
    let day = require_date(&date)?;
    calendar.select_day(day)?;
    let request = calendar
        .request_remove(hour)
        .with_context(|| format!("removing {} {}:00", day, hour))?;
    if confirm_or_cancel(&mut calendar, request, yes)? {
        println!("Removed {} {:02}:00", day, hour);
    }
    Ok(())
}

pub fn clear(config: &Config, yes: bool) -> Result<()> {
    let (mut calendar, _) = load_calendar(config)?;
    let request = calendar.request_clear();
    if confirm_or_cancel(&mut calendar, request, yes)? {
        println!("Cleared all notes");
    }
    Ok(())
}

pub fn seed(config: &Config) -> Result<()> {
    let (mut calendar, _) = load_calendar(config)?;
    let range = SampleRange::around(calendar.today())?;
    let mut generator = ChoreList::new(config.sample_notes.clone());
    let written = calendar.seed_sample(range, &mut generator, &mut rand::thread_rng())?;
    println!(
        "Wrote {} sample notes between {} and {}",
        written, range.start, range.end
    );
    Ok(())
}

pub fn tui(config: &Config) -> Result<()> {
    let (calendar, location) = load_calendar(config)?;
    ui::run(calendar, location, config)
}

pub fn load_calendar(config: &Config) -> Result<(Calendar, StoreLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_store(&cwd, config)?;
    let store = open_store(&location)?;
    let calendar = CalendarState::new(store, ZonedClock::local(), config.week_start)?;
    Ok((calendar, location))
}

fn confirm_or_cancel(calendar: &mut Calendar, request: ConfirmRequest, yes: bool) -> Result<bool> {
    if !yes && !prompt_yes(request.prompt())? {
        println!("Canceled");
        return Ok(false);
    }
    calendar.confirm(request)?;
    Ok(true)
}

fn prompt_yes(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn parse_date(input: Option<&str>) -> Result<Option<NaiveDate>> {
    let raw = match input {
        Some(r) => r.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() {
        return Ok(None);
    }
    require_date(raw).map(Some)
}

fn require_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid date (use YYYY-MM-DD): {}", raw))
}

pub fn hour_label<C: Clock>(clock: &C, key: Option<NoteKey>, hour: u32) -> String {
    key.and_then(|k| clock.local_datetime(k))
        .map(|dt| dt.format("%l %P").to_string())
        .unwrap_or_else(|| format!("{:>2}:00", hour))
}

fn cell_text(cell: &DayCell) -> String {
    let marker = match (cell.has_event, cell.in_current_month) {
        (true, true) => '*',
        (true, false) => '+',
        _ => ' ',
    };
    let open = if cell.is_selected { '[' } else { ' ' };
    format!("{}{:>2}{}", open, cell.date.day(), marker)
}

fn print_warnings(calendar: &Calendar) {
    for warning in calendar.warnings() {
        eprintln!("warning: {}", warning);
    }
}
