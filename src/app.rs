use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use slotmap::SecondaryMap;

use crate::input::{self, Dispatch, Focus};
use crate::model::config::AppConfig;
use crate::model::document::{Document, DocumentError};
use crate::model::mode::Mode;
use crate::model::workbook::{Table, Workbook};
use crate::msg::Msg;
use crate::nav::{
    CellRef, GridId, Movement, NavOptions, Navigator, Presentation, RowRef, Target,
};

pub struct App {
    pub mode: Mode,
    pub config: AppConfig,
    pub workbook: Workbook,
    pub navigator: Navigator,
    document_path: Option<PathBuf>,
    command_input: String,
    pub notifications: VecDeque<String>,
    hit_map: Vec<(Rect, CellRef)>,
    /// First row drawn for each table.
    top_rows: SecondaryMap<GridId, usize>,
    reload_due: Option<Instant>,
    pub should_quit: bool,
    event_tx: mpsc::Sender<Msg>,
}

impl App {
    pub fn new(
        config: AppConfig,
        document_path: Option<PathBuf>,
        event_tx: mpsc::Sender<Msg>,
    ) -> Result<Self> {
        let document = load_document(document_path.as_deref())?;
        let workbook = Workbook::from_document(&document, &config.navigation.selectable_attribute);

        let mut app = Self {
            mode: Mode::Normal,
            config,
            workbook,
            navigator: Navigator::new(),
            document_path,
            command_input: String::new(),
            notifications: VecDeque::new(),
            hit_map: Vec::new(),
            top_rows: SecondaryMap::new(),
            reload_due: None,
            should_quit: false,
            event_tx,
        };
        app.start_session();
        Ok(app)
    }

    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    fn start_session(&mut self) {
        let grids = self.workbook.session_grids();
        self.navigator.init_session(
            &mut self.workbook,
            &grids,
            self.config.navigation.clone(),
        );
        tracing::info!(
            tables = self.workbook.len(),
            navigable = grids.len(),
            "navigation session started"
        );
        if self.navigator.selected_cell().is_none() {
            self.push_notification("nothing selectable".to_string());
        }
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Mouse(mouse) => self.handle_mouse(mouse),
            Msg::Command(command) => self.run_command(&command),
            Msg::DocumentChanged(path) => self.handle_document_changed(&path),
            Msg::Tick => self.handle_tick(),
            Msg::Resize(..) => {}
        }
        Ok(())
    }

    fn push_notification(&mut self, message: String) {
        self.notifications.push_back(message);
        while self.notifications.len() > 8 {
            self.notifications.pop_front();
        }
    }

    fn report(&mut self, movement: Movement) {
        if movement == Movement::Failed {
            self.push_notification("no selectable cell in that direction".to_string());
        }
    }

    fn focus(&self) -> Focus {
        match self.mode {
            Mode::Normal => match self.navigator.selected_table() {
                Some(grid) => Focus::Element { grid: Some(grid) },
                None => Focus::Nothing,
            },
            // the prompt holds focus and sits outside every table
            Mode::Command => Focus::Element { grid: None },
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let focus = self.focus();
        match input::handle_key(&mut self.navigator, &mut self.workbook, key, focus) {
            Dispatch::Handled(movement) => self.report(movement),
            Dispatch::PassThrough => match self.mode {
                Mode::Normal => self.handle_key_normal(key),
                Mode::Command => self.handle_key_command(key),
            },
        }
    }

    fn handle_key_normal(&mut self, key: KeyEvent) {
        let page = self.config.general.page_size.max(1) as isize;
        match key.code {
            KeyCode::PageUp => {
                let movement = self.navigator.move_to_row(&mut self.workbook, -page);
                self.report(movement);
            }
            KeyCode::PageDown => {
                let movement = self.navigator.move_to_row(&mut self.workbook, page);
                self.report(movement);
            }
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_input.clear();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_key_command(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_input.clear();
            }
            KeyCode::Enter => {
                let command = self.command_input.trim().to_string();
                self.mode = Mode::Normal;
                self.command_input.clear();

                if !command.is_empty() {
                    let _ = self.event_tx.send(Msg::Command(command));
                }
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(ch) => self.command_input.push(ch),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Normal {
            return;
        }

        let hits = &self.hit_map;
        input::handle_mouse(&mut self.navigator, &mut self.workbook, mouse, |column, row| {
            hit_test(hits, column, row)
        });
    }

    fn run_command(&mut self, command: &str) {
        let mut parts = command.split_whitespace();
        let Some(name) = parts.next() else {
            return;
        };
        let args: Vec<&str> = parts.collect();

        match name {
            "goto" | "g" => self.goto(&args),
            "reset" => {
                self.navigator.reset(&mut self.workbook);
                self.push_notification("session reset, :reload to start again".to_string());
            }
            "reload" | "r" => self.reload(),
            "quit" | "q" => self.should_quit = true,
            "help" => {
                for line in [
                    "built-ins:",
                    "  goto <column> <row> (alias: g)",
                    "  reset",
                    "  reload (alias: r)",
                    "  quit (alias: q)",
                ] {
                    self.push_notification(line.to_string());
                }
            }
            _ => self.push_notification(format!("unknown command: {name}")),
        }
    }

    /// `goto <column> <row>`, both one-based, within the selected table.
    fn goto(&mut self, args: &[&str]) {
        let parsed = match args {
            [column, row] => column.parse::<usize>().ok().zip(row.parse::<usize>().ok()),
            _ => None,
        };

        let Some((column, row)) = parsed.filter(|(column, row)| *column > 0 && *row > 0) else {
            self.push_notification("usage: goto <column> <row>".to_string());
            return;
        };

        if !self
            .navigator
            .select_by_coordinates(&mut self.workbook, column - 1, row - 1)
        {
            self.push_notification(format!("cannot select column {column}, row {row}"));
        }
    }

    fn handle_document_changed(&mut self, path: &Path) {
        let Some(current) = self.document_path.as_deref() else {
            return;
        };

        if same_file_path(current, path) {
            let debounce = Duration::from_millis(self.config.general.reload_debounce_ms);
            self.reload_due = Some(Instant::now() + debounce);
        }
    }

    fn handle_tick(&mut self) {
        if self
            .reload_due
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.reload_due = None;
            self.reload();
        }
    }

    /// Tear the session down, re-read the document and start over. The old
    /// tables stay when the document cannot be read.
    fn reload(&mut self) {
        self.navigator.reset(&mut self.workbook);

        match load_document(self.document_path.as_deref()) {
            Ok(document) => {
                self.workbook =
                    Workbook::from_document(&document, &self.config.navigation.selectable_attribute);
                self.top_rows.clear();
                self.push_notification("document reloaded".to_string());
            }
            Err(err) => {
                tracing::warn!("reload failed: {err}");
                self.push_notification(format!("reload failed: {err}"));
            }
        }

        self.start_session();
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // tables
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.render_tables(frame, chunks[0]);
        self.render_status_bar(frame, chunks[1]);

        if self.mode == Mode::Command {
            // " COMMAND " then " :" then the typed input
            let offset = self.mode.label().len() + 4 + self.command_input.chars().count();
            let offset = u16::try_from(offset).unwrap_or(u16::MAX);
            frame.set_cursor_position((chunks[1].x.saturating_add(offset), chunks[1].y));
        }
    }

    fn render_tables(&mut self, frame: &mut Frame, area: Rect) {
        self.hit_map.clear();

        let tables: Vec<(GridId, &Table)> = self.workbook.iter().collect();
        let heights: Vec<u16> = tables
            .iter()
            .map(|(_, table)| table_height(table).min(area.height))
            .collect();

        // Skip leading tables until the selected one fits on screen.
        let selected = self
            .navigator
            .selected_table()
            .and_then(|grid| tables.iter().position(|(id, _)| *id == grid))
            .unwrap_or(0);
        let mut first = selected;
        let mut used = heights.get(selected).copied().unwrap_or(0);
        while first > 0 && used.saturating_add(heights[first - 1]) <= area.height {
            first -= 1;
            used += heights[first];
        }

        let options = self.navigator.options();
        let selected_row = self.navigator.selected_row();
        let mut y = area.y;
        for ((id, table), height) in tables.into_iter().zip(heights).skip(first) {
            let remaining = area.bottom().saturating_sub(y);
            if remaining == 0 {
                break;
            }
            let table_area = Rect::new(area.x, y, area.width, height.min(remaining));
            y = y.saturating_add(table_area.height);

            let visible_rows = usize::from(table_area.height.saturating_sub(2));
            let focus = selected_row
                .filter(|row| row.grid == id)
                .map(|row| row.index);
            let top = keep_row_visible(
                self.top_rows.get(id).copied().unwrap_or(0),
                visible_rows,
                table.rows.len(),
                focus,
            );
            self.top_rows.insert(id, top);

            let hits = render_table(frame, table_area, id, table, top, &self.workbook, options);
            self.hit_map.extend(hits);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Normal => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Mode::Command => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let mode_span = Span::styled(format!(" {} ", self.mode.label()), mode_style);

        let info = match self.mode {
            Mode::Command => format!(" :{}", self.command_input),
            Mode::Normal => {
                let title = self
                    .navigator
                    .selected_table()
                    .and_then(|id| self.workbook.table(id))
                    .map_or("-", |table| table.title.as_str());
                let position = match (self.navigator.selected_row(), self.navigator.selected_cell()) {
                    (Some(row), Some(cell)) => format!("{}:{}", row.index + 1, cell.index + 1),
                    (Some(row), None) => format!("{}:-", row.index + 1),
                    _ => "-:-".to_string(),
                };
                let note = self
                    .notifications
                    .back()
                    .map(|note| format!(" | {note}"))
                    .unwrap_or_default();
                format!(" {title}  {position}{note} ")
            }
        };

        let bar = Line::from(vec![
            mode_span,
            Span::styled(info, Style::default().fg(Color::Gray).bg(Color::DarkGray)),
        ]);
        frame.render_widget(
            Paragraph::new(bar).style(Style::default().bg(Color::DarkGray)),
            area,
        );
    }
}

fn load_document(path: Option<&Path>) -> Result<Document, DocumentError> {
    match path {
        Some(path) => Document::from_path(path),
        None => Ok(Document::demo()),
    }
}

/// Height of a table with its border, saturating at the terminal limit.
fn table_height(table: &Table) -> u16 {
    u16::try_from(table.rows.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
}

/// First row to draw so that `focus` stays inside a window of `height` rows.
fn keep_row_visible(top: usize, height: usize, len: usize, focus: Option<usize>) -> usize {
    let mut top = top.min(len.saturating_sub(height));
    if let Some(row) = focus {
        if row < top {
            top = row;
        } else if height > 0 && row >= top + height {
            top = row + 1 - height;
        }
    }
    top
}

/// Draw rows `top..` of one table and return the screen rectangle of every
/// visible cell.
fn render_table(
    frame: &mut Frame,
    area: Rect,
    id: GridId,
    table: &Table,
    top: usize,
    workbook: &Workbook,
    options: &NavOptions,
) -> Vec<(Rect, CellRef)> {
    let is_selected = workbook.has_marker(id.into(), &options.selected_table_marker);
    let is_navigable = workbook.has_marker(id.into(), &options.navigable_marker);

    let border_style = if is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if is_navigable {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .title(format!(" {} ", table.title))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let widths = table.column_widths();
    let mut hits = Vec::new();
    let mut lines = Vec::with_capacity(usize::from(inner.height));

    let window = table.rows.iter().enumerate().skip(top);
    for ((row_idx, row), y) in window.zip(inner.y..inner.bottom()) {
        let row_ref = RowRef::new(id, row_idx);
        let row_target = Target::Row(row_ref);
        let row_selected = workbook.has_marker(row_target, &options.selected_row_marker);
        let row_locked =
            workbook.attribute(row_target, &options.selectable_attribute) == Some("false");

        let mut spans = Vec::with_capacity(row.cells.len());
        let mut x = inner.x;

        for (cell_idx, cell) in row.cells.iter().enumerate() {
            let cell_ref = row_ref.cell(cell_idx);
            let target = Target::Cell(cell_ref);
            let width = widths.get(cell_idx).copied().unwrap_or(0) + 2;
            let cell_width = u16::try_from(width).unwrap_or(u16::MAX);

            let mut style = Style::default();
            if row_selected {
                style = style.bg(Color::Rgb(30, 30, 45));
            }
            if row_locked
                || !is_navigable
                || workbook.attribute(target, &options.selectable_attribute) == Some("false")
            {
                style = style.fg(Color::DarkGray);
            }
            if workbook.has_marker(target, &options.selected_cell_marker) {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }

            if x < inner.right() {
                let visible = cell_width.min(inner.right() - x);
                hits.push((Rect::new(x, y, visible, 1), cell_ref));
            }

            spans.push(Span::styled(format!(" {:<w$} ", cell.text, w = width - 2), style));
            spans.push(Span::raw("│"));
            x = x.saturating_add(cell_width.saturating_add(1));
        }

        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
    hits
}

fn hit_test(hits: &[(Rect, CellRef)], column: u16, row: u16) -> Option<CellRef> {
    hits.iter()
        .find(|(rect, _)| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        })
        .map(|(_, cell)| *cell)
}

fn same_file_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }

    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
