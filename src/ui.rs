use crate::commands::{hour_label, Calendar};
use crate::config::Config;
use crate::storage::StoreLocation;
use anyhow::Result;
use chrono::Datelike;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use daybook::controller::{ConfirmRequest, PendingAction, SampleRange};
use daybook::grid::DayCell;
use daybook::model::{CalendarError, HOURS_PER_DAY};
use daybook::sample::ChoreList;
use daybook::slot::{Commit, Controls, Slot, SlotState};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListState;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run(calendar: Calendar, location: StoreLocation, config: &Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(calendar, location, config.sample_notes.clone());
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    calendar: Calendar,
    location: StoreLocation,
    sample_notes: Vec<String>,
    focus: Focus,
    hour: u32,
    agenda_offset: usize,
    last_save: Option<Instant>,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Editing { hour: u32, field: FieldValue },
    Confirm(ConfirmRequest),
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Focus {
    Month,
    Day,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.value.len();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let next = next_char(self.cursor, &self.value);
        self.value.drain(self.cursor..next);
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(calendar: Calendar, location: StoreLocation, sample_notes: Vec<String>) -> Self {
        let status = format!("Loaded notes from {}", location.path.display());
        App {
            calendar,
            location,
            sample_notes,
            focus: Focus::Month,
            hour: 9,
            agenda_offset: 0,
            last_save: None,
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Editing { .. } => {
                self.handle_edit_key(key);
                false
            }
            Mode::Confirm(_) => {
                self.handle_confirm_key(key);
                false
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Month => Focus::Day,
                    Focus::Day => Focus::Month,
                };
                return false;
            }
            KeyCode::Char('[') => {
                let result = self.calendar.prev_month();
                self.report(result, |s| format!("Showing {}", s.month_title()));
                return false;
            }
            KeyCode::Char(']') => {
                let result = self.calendar.next_month();
                self.report(result, |s| format!("Showing {}", s.month_title()));
                return false;
            }
            KeyCode::Char('t') => {
                let result = self.calendar.go_to_today();
                self.report(result, |_| "Jumped to today".into());
                return false;
            }
            KeyCode::Char('C') => {
                let request = self.calendar.request_clear();
                self.status = format!("{} (y to confirm, n/Esc to cancel)", request.prompt());
                self.mode = Mode::Confirm(request);
                return false;
            }
            KeyCode::Char('g') => {
                self.seed();
                return false;
            }
            _ => {}
        }

        match self.focus {
            Focus::Month => self.handle_month_key(key),
            Focus::Day => self.handle_day_key(key),
        }
        false
    }

    fn handle_month_key(&mut self, key: KeyEvent) {
        let days = match key.code {
            KeyCode::Left | KeyCode::Char('h') => -1,
            KeyCode::Right | KeyCode::Char('l') => 1,
            KeyCode::Up | KeyCode::Char('k') => -7,
            KeyCode::Down | KeyCode::Char('j') => 7,
            KeyCode::Enter => {
                self.focus = Focus::Day;
                return;
            }
            _ => return,
        };
        let result = self.calendar.shift_day(days);
        self.report(result, |s| {
            format!("Selected {}", s.calendar.selected().format("%B %-d, %Y"))
        });
    }

    fn handle_day_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.hour = self.hour.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.hour = (self.hour + 1).min(HOURS_PER_DAY - 1)
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Esc => self.focus = Focus::Month,
            KeyCode::Enter | KeyCode::Char('e') => self.start_editing(),
            KeyCode::Char('s') => self.save_current(self.hour),
            KeyCode::Char('u') => {
                let result = self.calendar.cancel_slot(self.hour);
                self.report(result, |s| format!("Reverted {}", s.hour_text(s.hour)));
            }
            KeyCode::Char('d') => match self.calendar.request_remove(self.hour) {
                Ok(request) => {
                    self.status = format!("{} (y to confirm, n/Esc to cancel)", request.prompt());
                    self.mode = Mode::Confirm(request);
                }
                Err(CalendarError::NothingToRemove(_)) => {
                    self.status = "No saved note at this hour to remove".into();
                }
                Err(err) => self.status = format!("Remove failed: {}", err),
            },
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let mut keep_editing = true;
        if let Mode::Editing { hour, field } = &mut mode {
            let hour = *hour;
            let mut changed = false;
            match key.code {
                KeyCode::Esc => {
                    keep_editing = false;
                    self.status = self.slot_summary(hour);
                }
                KeyCode::Enter => {
                    keep_editing = false;
                    self.save_current(hour);
                }
                KeyCode::Left => field.move_left(),
                KeyCode::Right => field.move_right(),
                KeyCode::Home => field.home(),
                KeyCode::End => field.end(),
                KeyCode::Backspace => {
                    field.backspace();
                    changed = true;
                }
                KeyCode::Delete => {
                    field.delete();
                    changed = true;
                }
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        field.insert_char(c);
                        changed = true;
                    }
                }
                _ => {}
            }
            if changed {
                if let Err(err) = self.calendar.edit_slot(hour, &field.value) {
                    self.status = format!("Edit failed: {}", err);
                }
            }
        }
        self.mode = if keep_editing { mode } else { Mode::Normal };
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Mode::Confirm(request) = std::mem::replace(&mut self.mode, Mode::Normal) {
                    let action = request.action();
                    let result = self.calendar.confirm(request);
                    if result.is_ok() {
                        self.last_save = Some(Instant::now());
                    }
                    self.report(result, move |s| match action {
                        PendingAction::ClearAll => "Cleared all notes".into(),
                        PendingAction::RemoveNote { .. } => {
                            format!("Removed note at {}", s.hour_text(s.hour))
                        }
                    });
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn start_editing(&mut self) {
        let slot = self.calendar.agenda().slot(self.hour);
        if slot.map_or(false, Slot::is_skipped) {
            self.status = format!("{}:00 does not exist on this day", self.hour);
            return;
        }
        let text = slot.map(|s| s.displayed.clone()).unwrap_or_default();
        self.mode = Mode::Editing {
            hour: self.hour,
            field: FieldValue::new(&text),
        };
        self.status = format!(
            "Editing {} (Enter save, Esc keep draft)",
            self.hour_text(self.hour)
        );
    }

    fn save_current(&mut self, hour: u32) {
        match self.calendar.save_slot(hour) {
            Ok(Commit::Stored) => {
                self.last_save = Some(Instant::now());
                self.status = format!("Saved {}", self.hour_text(hour));
            }
            Ok(Commit::Removed) => {
                self.last_save = Some(Instant::now());
                self.status = format!("Removed note at {}", self.hour_text(hour));
            }
            Ok(Commit::Unchanged) => {
                self.status = format!("Nothing to save at {}", self.hour_text(hour));
            }
            Err(err) => {
                self.status = format!("Error: save failed, draft kept: {}", err);
            }
        }
        self.surface_warnings();
    }

    fn seed(&mut self) {
        let range = match SampleRange::around(self.calendar.today()) {
            Ok(range) => range,
            Err(err) => {
                self.status = format!("Error: {}", err);
                return;
            }
        };
        let mut generator = ChoreList::new(self.sample_notes.clone());
        match self
            .calendar
            .seed_sample(range, &mut generator, &mut rand::thread_rng())
        {
            Ok(count) => {
                self.last_save = Some(Instant::now());
                self.status = format!("Wrote {} sample notes", count);
            }
            Err(err) => self.status = format!("Error: seeding failed: {}", err),
        }
        self.surface_warnings();
    }

    fn report<T, F>(&mut self, result: Result<T, CalendarError>, message: F)
    where
        F: FnOnce(&App) -> String,
    {
        match result {
            Ok(_) => self.status = message(self),
            Err(err) => self.status = format!("Error: {}", err),
        }
        self.surface_warnings();
    }

    fn surface_warnings(&mut self) {
        let count = self.calendar.warnings().count();
        if let Some(first) = self.calendar.warnings().next() {
            self.status = format!("{}  •  {} warning(s): {}", self.status, count, first);
        }
    }

    fn month_title(&self) -> String {
        self.calendar.month().format("%B %Y").to_string()
    }

    fn hour_text(&self, hour: u32) -> String {
        match self.calendar.agenda().slot(hour) {
            Some(slot) => hour_label(self.calendar.clock(), slot.key, hour)
                .trim()
                .to_string(),
            None => format!("{}:00", hour),
        }
    }

    fn slot_summary(&self, hour: u32) -> String {
        match self.calendar.agenda().slot(hour).map(Slot::state) {
            Some(SlotState::Dirty) => format!(
                "Draft kept at {} (s save, u revert)",
                self.hour_text(hour)
            ),
            _ => format!("Done editing {}", self.hour_text(hour)),
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(12),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
            .split(layout[1]);
        self.draw_month(f, panes[0]);
        self.draw_day(f, panes[1]);
        self.draw_footer(f, layout[2]);

        if let Mode::Confirm(request) = &self.mode {
            draw_confirm(f, request);
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let saved = match self.last_save {
            Some(at) => format!("saved {}", format_elapsed(at)),
            None => "no changes yet".into(),
        };
        let title = Line::from(vec![
            Span::styled(
                "daybook ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.month_title(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(self.location.scope.label(), Style::default().fg(Color::Green)),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(saved, Style::default().fg(Color::Gray)),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_month(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Month && matches!(self.mode, Mode::Normal);
        let grid = self.calendar.grid();
        let mut lines = Vec::new();
        lines.push(Line::from(Span::styled(
            format!("{} {}", grid.month.format("%B"), grid.month.year()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        let header_spans: Vec<Span<'static>> = self
            .calendar
            .week_start()
            .headings()
            .iter()
            .map(|h| Span::styled(format!("{:^5}", h), Style::default().fg(Color::Gray)))
            .collect();
        lines.push(Line::from(header_spans));
        lines.push(Line::from(""));

        for week in grid.weeks() {
            let spans: Vec<Span<'static>> = week.iter().map(|c| day_span(c, focused)).collect();
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }

        let block = Block::default()
            .title(Span::styled(
                "Month",
                Style::default()
                    .fg(if focused { Color::Cyan } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }));
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_day(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Day || matches!(self.mode, Mode::Editing { .. });
        let editing = match &self.mode {
            Mode::Editing { hour, field } => Some((*hour, field.clone())),
            _ => None,
        };
        let text_width = area.width.saturating_sub(26) as usize;
        let agenda = self.calendar.agenda();
        let items = agenda
            .slots
            .iter()
            .map(|slot| {
                let label = hour_label(self.calendar.clock(), slot.key, slot.hour);
                let field = editing
                    .as_ref()
                    .filter(|(h, _)| *h == slot.hour)
                    .map(|(_, field)| field);
                slot_item(slot, &label, field, text_width)
            })
            .collect::<Vec<_>>();

        let viewport = area.height.saturating_sub(2) as usize;
        let mut state = ListState::default();
        if focused {
            self.agenda_offset =
                adjust_offset(self.hour as usize, self.agenda_offset, viewport, 2, items.len());
            state.select(Some(self.hour as usize));
        }
        *state.offset_mut() = self.agenda_offset;

        let dirty = agenda.dirty_count();
        let mut title = agenda.day.format("%A, %B %-d, %Y").to_string();
        if dirty > 0 {
            title.push_str(&format!(" ({} unsaved)", dirty));
        }
        let accent = if focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .title(Span::styled(
                title,
                Style::default()
                    .fg(if focused { Color::Cyan } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(accent));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::Rgb(40, 44, 52))
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
        let mut spans = Vec::new();
        match (&self.mode, self.focus) {
            (Mode::Editing { .. }, _) => spans.extend([
                key("Enter", Color::LightGreen),
                Span::raw(" save  "),
                key("Esc", Color::LightYellow),
                Span::raw(" stop editing (keeps draft)  "),
                key("←→ Home End", Color::LightCyan),
                Span::raw(" move cursor"),
            ]),
            (Mode::Confirm(_), _) => spans.extend([
                key("y", Color::LightRed),
                Span::raw(" confirm  "),
                key("n/Esc", Color::LightCyan),
                Span::raw(" cancel"),
            ]),
            (Mode::Normal, Focus::Month) => spans.extend([
                key("←↑↓→ / h j k l", Color::LightCyan),
                Span::raw(" day  "),
                key("[ ]", Color::LightCyan),
                Span::raw(" month  "),
                key("Enter/Tab", Color::LightYellow),
                Span::raw(" hours  "),
            ]),
            (Mode::Normal, Focus::Day) => spans.extend([
                key("↑↓ / j k", Color::LightCyan),
                Span::raw(" hour  "),
                key("e", Color::LightYellow),
                Span::raw(" edit  "),
                key("s", Color::LightGreen),
                Span::raw(" save  "),
                key("u", Color::LightYellow),
                Span::raw(" revert  "),
                key("d", Color::LightRed),
                Span::raw(" remove  "),
                key("Esc/Tab", Color::LightCyan),
                Span::raw(" month  "),
            ]),
        }
        if matches!(self.mode, Mode::Normal) {
            spans.extend([
                key("t", Color::LightMagenta),
                Span::raw(" today  "),
                key("g", Color::LightMagenta),
                Span::raw(" sample  "),
                key("C", Color::LightRed),
                Span::raw(" clear  "),
                key("q", Color::LightRed),
                Span::raw(" quit"),
            ]);
        }
        Line::from(spans)
    }
}

fn draw_confirm(f: &mut ratatui::Frame<'_>, request: &ConfirmRequest) {
    let area = centered_rect(50, 30, f.size());
    let title = match request.action() {
        PendingAction::ClearAll => "Confirm Clear",
        PendingAction::RemoveNote { .. } => "Confirm Remove",
    };
    let body = vec![
        Line::from(Span::styled(
            request.prompt().to_string(),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Press y to confirm, n or Esc to cancel"),
    ];
    let dialog = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn day_span(cell: &DayCell, focused: bool) -> Span<'static> {
    let text = if cell.has_event {
        format!("{:>3}•", cell.date.day())
    } else {
        format!("{:>3} ", cell.date.day())
    };
    let mut style = Style::default().fg(match (cell.in_current_month, cell.has_event) {
        (true, true) => Color::LightYellow,
        (true, false) => Color::White,
        (false, true) => Color::Yellow,
        (false, false) => Color::DarkGray,
    });
    if cell.has_event {
        style = style.add_modifier(Modifier::BOLD);
    }
    if cell.is_today {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    if cell.is_selected {
        style = style
            .bg(if focused { Color::Cyan } else { Color::Blue })
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD);
    }
    Span::styled(format!("{} ", text), style)
}

fn slot_item(
    slot: &Slot,
    label: &str,
    field: Option<&FieldValue>,
    width: usize,
) -> ListItem<'static> {
    let editing = field.is_some();
    let state = slot.state();
    let text = match field {
        Some(f) => f.with_caret(),
        None if slot.is_skipped() => "(skipped by clock change)".to_string(),
        None => truncate_text(&slot.displayed, width),
    };
    let text_style = match state {
        SlotState::Dirty => Style::default().fg(Color::LightRed),
        SlotState::SavedFilled => Style::default().fg(Color::White),
        SlotState::Empty => Style::default().fg(Color::Gray),
    };
    let controls = match slot.controls(editing) {
        Controls::SaveCancel => Span::styled(
            "  [s]ave [u]ndo",
            Style::default().fg(Color::LightGreen),
        ),
        Controls::Remove => Span::styled("  [d]elete", Style::default().fg(Color::DarkGray)),
        Controls::None => Span::raw(""),
    };
    let spans = vec![
        Span::styled(
            format!("{:>6} │ ", label.trim()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{:width$}", text, width = width.min(60)),
            if editing {
                text_style.add_modifier(Modifier::UNDERLINED)
            } else {
                text_style
            },
        ),
        controls,
    ];
    ListItem::new(Line::from(spans))
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn prev_char(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_char(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
