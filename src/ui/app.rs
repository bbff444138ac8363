//! Application state and TUI event loop
//!
//! Manages the viewer state (current input outcome, table sort, selection,
//! search) and handles user input.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::{info, warn};

use super::flame::{layout, tree_height, FlameDimensions, FlameFrame, FlameGraph};
use crate::parser::{Node, ValidationErrors, ValidatorConfig};
use crate::pipeline::{Outcome, Pipeline};
use crate::table::{FlattenedRow, SortColumn, SortState, COLUMNS};

/// Virtual scroll state for efficient rendering of large tables
#[derive(Debug, Default, Clone)]
pub struct VirtualScrollState {
    /// First visible row index
    pub offset: usize,
    /// Number of visible rows in the viewport
    pub viewport_height: usize,
}

impl VirtualScrollState {
    /// Create a new virtual scroll state
    pub fn new() -> Self {
        Self {
            offset: 0,
            viewport_height: 0,
        }
    }

    /// Update the viewport height
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
    }

    /// Visible `(start, end)` range once `ensure_visible` has run
    pub fn visible_range(&self, total: usize) -> (usize, usize) {
        if total == 0 || self.viewport_height == 0 {
            return (0, 0);
        }
        let start = self.offset.min(total - 1);
        let end = (start + self.viewport_height).min(total);
        (start, end)
    }

    /// Update offset to ensure selection is visible
    pub fn ensure_visible(&mut self, selected: usize, total: usize) {
        if total == 0 || self.viewport_height == 0 {
            self.offset = 0;
            return;
        }

        // If selection is above visible area, scroll up
        if selected < self.offset {
            self.offset = selected;
        }
        // If selection is below visible area, scroll down
        else if selected >= self.offset + self.viewport_height {
            self.offset = selected.saturating_sub(self.viewport_height - 1);
        }
    }
}

/// Application state
pub struct App {
    /// Validation + aggregation driver for the input text
    pipeline: Pipeline,
    /// Where the input came from, shown in the header
    pub source: String,
    /// Current table sort
    pub sort: SortState,
    /// Table rows in display order (sorted, then filtered by search)
    pub rows: Vec<FlattenedRow>,
    /// Currently selected index into `rows`
    pub selected_index: usize,
    /// Whether the application should quit
    pub should_quit: bool,
    /// Whether search mode is active
    pub search_active: bool,
    /// Current search query
    pub search_query: String,
    /// Virtual scroll state for performance with large tables
    pub scroll_state: VirtualScrollState,
    /// Transient message for the footer
    pub status: Option<String>,
    /// Table state for ratatui
    table_state: TableState,
}

impl App {
    /// Create a new application for input from `source`
    pub fn new(source: impl Into<String>, config: ValidatorConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
            source: source.into(),
            sort: SortState::new(),
            rows: Vec::new(),
            selected_index: 0,
            should_quit: false,
            search_active: false,
            search_query: String::new(),
            scroll_state: VirtualScrollState::new(),
            status: None,
            table_state: TableState::default(),
        }
    }

    /// Replace the input text and recompute everything derived from it
    pub fn set_input(&mut self, text: &str) {
        let generation = self.pipeline.submit(text);
        info!(generation = generation.value(), bytes = text.len(), "input updated");
        self.refresh_rows();
    }

    /// Outcome of the current input, if any input has been set
    pub fn outcome(&self) -> Option<&Outcome> {
        self.pipeline.outcome()
    }

    /// The validated tree, only when the current input is valid
    pub fn tree(&self) -> Option<&Node> {
        self.outcome().and_then(|o| o.tree()).map(|tree| tree.as_ref())
    }

    /// Validation errors, only when the current input is invalid
    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.outcome().and_then(|o| o.errors())
    }

    fn root_total(&self) -> f64 {
        self.outcome().and_then(|o| o.root_total()).unwrap_or(0.0)
    }

    /// Header click on a column: cycle its sort direction
    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort = self.sort.toggle(column);
        self.refresh_rows();
    }

    /// Rebuild the displayed rows from the current outcome, sort and search
    fn refresh_rows(&mut self) {
        let ordered = match self.pipeline.outcome().and_then(|o| o.rows()) {
            Some(pre_order) => self.sort.apply(pre_order),
            None => Vec::new(),
        };

        self.rows = if self.search_query.is_empty() {
            ordered
        } else {
            ordered
                .into_iter()
                .filter(|row| fuzzy_match(&row.name, &self.search_query))
                .collect()
        };

        // Ensure selected index is valid
        if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len().saturating_sub(1);
        }
        self.table_state.select(Some(self.selected_index));
    }

    /// The selected row, if any
    pub fn selected_row(&self) -> Option<&FlattenedRow> {
        self.rows.get(self.selected_index)
    }

    /// Move selection to the next item
    pub fn select_next(&mut self) {
        let total = self.rows.len();
        if total > 0 {
            self.selected_index = (self.selected_index + 1).min(total - 1);
            self.table_state.select(Some(self.selected_index));
            self.scroll_state.ensure_visible(self.selected_index, total);
        }
    }

    /// Move selection to the previous item
    pub fn select_previous(&mut self) {
        let total = self.rows.len();
        if total > 0 && self.selected_index > 0 {
            self.selected_index -= 1;
            self.table_state.select(Some(self.selected_index));
            self.scroll_state.ensure_visible(self.selected_index, total);
        }
    }

    /// Move selection down by a page
    pub fn page_down(&mut self) {
        let total = self.rows.len();
        if total > 0 {
            let page_size = self.scroll_state.viewport_height.max(1);
            self.selected_index = (self.selected_index + page_size).min(total - 1);
            self.table_state.select(Some(self.selected_index));
            self.scroll_state.ensure_visible(self.selected_index, total);
        }
    }

    /// Move selection up by a page
    pub fn page_up(&mut self) {
        let total = self.rows.len();
        if total > 0 {
            let page_size = self.scroll_state.viewport_height.max(1);
            self.selected_index = self.selected_index.saturating_sub(page_size);
            self.table_state.select(Some(self.selected_index));
            self.scroll_state.ensure_visible(self.selected_index, total);
        }
    }

    /// Jump to the first item
    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.selected_index = 0;
            self.table_state.select(Some(0));
            self.scroll_state.offset = 0;
        }
    }

    /// Jump to the last item
    pub fn select_last(&mut self) {
        let total = self.rows.len();
        if total > 0 {
            self.selected_index = total - 1;
            self.table_state.select(Some(self.selected_index));
            self.scroll_state.ensure_visible(self.selected_index, total);
        }
    }

    /// Signal that the application should quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Start search mode
    pub fn start_search(&mut self) {
        self.search_active = true;
        self.search_query.clear();
    }

    /// Clear search and return to normal mode
    pub fn clear_search(&mut self) {
        self.search_active = false;
        self.search_query.clear();
        self.selected_index = 0;
        self.refresh_rows();
    }

    /// Add a character to the search query
    pub fn search_push(&mut self, c: char) {
        self.search_query.push(c);
        self.selected_index = 0;
        self.refresh_rows();
    }

    /// Remove the last character from the search query
    pub fn search_pop(&mut self) {
        self.search_query.pop();
        self.selected_index = 0;
        self.refresh_rows();
    }
}

/// Perform fuzzy matching of query against text (case-insensitive)
/// A match requires all characters of the query to appear in order in the text
fn fuzzy_match(text: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    let mut query_chars = query_lower.chars().peekable();
    for c in text_lower.chars() {
        if let Some(&q) = query_chars.peek() {
            if c == q {
                query_chars.next();
            }
        }
        if query_chars.peek().is_none() {
            return true;
        }
    }
    query_chars.peek().is_none()
}

/// Run the TUI application
///
/// `reload` re-reads the input from its source when `r` is pressed.
pub fn run_app<B, F>(terminal: &mut Terminal<B>, app: &mut App, mut reload: F) -> io::Result<()>
where
    B: Backend,
    F: FnMut() -> io::Result<String>,
{
    loop {
        terminal.draw(|frame| render(frame, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key.code, &mut reload);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Apply one key press to the application state
///
/// The footer status only describes the key press that set it.
pub fn handle_key<F>(app: &mut App, code: KeyCode, reload: &mut F)
where
    F: FnMut() -> io::Result<String>,
{
    app.status = None;

    if app.search_active {
        // Search mode key handling
        match code {
            KeyCode::Esc => app.clear_search(),
            KeyCode::Enter => {
                // Exit search mode but keep the filter active
                app.search_active = false;
            }
            KeyCode::Backspace => app.search_pop(),
            KeyCode::Char(c) => app.search_push(c),
            KeyCode::Down | KeyCode::Tab => app.select_next(),
            KeyCode::Up | KeyCode::BackTab => app.select_previous(),
            _ => {}
        }
        return;
    }

    // Normal mode key handling
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                // Clear the filter but stay in normal mode
                app.clear_search();
            } else {
                app.quit();
            }
        }
        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::PageDown | KeyCode::Char('d') => app.page_down(),
        KeyCode::PageUp | KeyCode::Char('u') => app.page_up(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('s') => app.toggle_sort(SortColumn::SelfValue),
        KeyCode::Char('t') => app.toggle_sort(SortColumn::Total),
        KeyCode::Char('n') => app.toggle_sort(SortColumn::Name),
        KeyCode::Char('r') => match reload() {
            Ok(text) => {
                app.set_input(&text);
                app.status = Some("Reloaded".to_string());
            }
            Err(err) => {
                warn!(error = %err, "reload failed");
                app.status = Some(format!("Reload failed: {}", err));
            }
        },
        _ => {}
    }
}

/// Render the application UI
pub fn render(frame: &mut Frame, app: &mut App) {
    // Determine if search bar is visible
    let show_search = app.search_active || !app.search_query.is_empty();

    let chunks = if show_search {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Search bar
                Constraint::Min(0),    // Body
                Constraint::Length(3), // Footer
            ])
            .split(frame.area())
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Body
                Constraint::Length(3), // Footer
            ])
            .split(frame.area())
    };

    let (body, footer) = if show_search {
        render_search_bar(frame, app, chunks[1]);
        (chunks[2], chunks[3])
    } else {
        (chunks[1], chunks[2])
    };

    render_header(frame, app, chunks[0]);
    render_body(frame, app, body);
    render_footer(frame, app, footer);
}

/// Render the header
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!("flamescope - {}", app.source))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

/// Render the search bar
fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (border_color, title) = if app.search_active {
        (Color::Yellow, "Search (Enter to confirm, Esc to cancel)")
    } else {
        (Color::Gray, "Filter (/ to edit, Esc to clear)")
    };

    let cursor = if app.search_active { "_" } else { "" };
    let content = Line::from(vec![
        Span::styled(format!("/{}", app.search_query), Style::default().fg(Color::White)),
        Span::styled(cursor, Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK)),
        Span::styled(
            format!(" ({} matches)", app.rows.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let search_bar = Paragraph::new(content).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    frame.render_widget(search_bar, area);
}

/// Render the graph and table, or only the errors when the input is invalid
fn render_body(frame: &mut Frame, app: &mut App, area: Rect) {
    if let Some(errors) = app.errors() {
        render_errors(frame, errors, area);
        return;
    }

    let graph_height = match app.tree() {
        Some(tree) => {
            // Borders take 2 rows; the graph never takes more than half the body
            let wanted = u16::try_from(tree_height(tree)).unwrap_or(u16::MAX).saturating_add(2);
            wanted.min(area.height / 2)
        }
        None => {
            let empty = Paragraph::new("No input").block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(graph_height), Constraint::Min(0)])
        .split(area);

    render_flame(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);
}

/// Render the validation errors as a list
fn render_errors(frame: &mut Frame, errors: &ValidationErrors, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            capitalize(&errors.kind().to_string()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
    ];

    for error in errors {
        let mut spans = vec![
            Span::styled(format!("[{}] ", error.kind.label()), Style::default().fg(Color::DarkGray)),
            Span::styled(error.path.to_string(), Style::default().fg(Color::Yellow)),
            Span::raw(": "),
            Span::styled(error.message.clone(), Style::default().fg(Color::Red)),
        ];
        if let (Some(expected), Some(received)) = (&error.expected, &error.received) {
            spans.push(Span::styled(
                format!(" (expected {}, received {})", expected, received),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!("Errors ({})", errors.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(paragraph, area);
}

/// Render the flame graph for the validated tree
///
/// The block title carries the selected frame's tooltip, if it has one.
fn render_flame(frame: &mut Frame, app: &App, area: Rect) {
    let highlight = app.selected_row().map(|row| row.name.as_str());
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let frames = match (app.tree(), FlameDimensions::new(inner.width, inner.height)) {
        (Some(tree), Some(dims)) => layout(tree, dims),
        _ => Vec::new(),
    };

    let title = match highlight.and_then(|name| selected_tooltip(&frames, name)) {
        Some(tooltip) => format!("Flame Graph - {}", tooltip),
        None => "Flame Graph".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    frame.render_widget(block, area);
    frame.render_widget(FlameGraph::new(&frames).highlight(highlight), inner);
}

/// Tooltip of the first laid-out frame named `name`
fn selected_tooltip<'a>(frames: &'a [FlameFrame], name: &str) -> Option<&'a str> {
    frames
        .iter()
        .find(|f| f.name == name)
        .and_then(|f| f.tooltip.as_deref())
}

/// Render the metrics table with virtual scrolling
///
/// Only builds the visible rows, so tables with thousands of nodes stay
/// responsive.
fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let root_total = app.root_total();
    let total_rows = app.rows.len();

    // Borders take 2 rows, the header 1
    let viewport_height = (area.height as usize).saturating_sub(3);
    app.scroll_state.set_viewport_height(viewport_height);
    app.scroll_state.ensure_visible(app.selected_index, total_rows);
    let (start_idx, end_idx) = app.scroll_state.visible_range(total_rows);

    let header = Row::new(COLUMNS.iter().map(|column| {
        let indicator = app.sort.direction_for(column.key).indicator();
        Cell::from(format!("{}{}", column.label(), indicator))
    }))
    .style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app.rows[start_idx..end_idx]
        .iter()
        .map(|row| {
            let cells = COLUMNS.iter().map(|column| {
                let text = column.format_cell(row, root_total);
                match column.key {
                    SortColumn::Name => Cell::from(format!("{}{}", "  ".repeat(row.depth), text)),
                    SortColumn::SelfValue if row.self_value < 0.0 => {
                        Cell::from(text).style(Style::default().fg(Color::Red))
                    }
                    _ => Cell::from(text),
                }
            });
            Row::new(cells)
        })
        .collect();

    // Adjust selection to be relative to visible window
    let relative_selection = app.selected_index.saturating_sub(start_idx);
    app.table_state.select(if total_rows == 0 { None } else { Some(relative_selection) });

    let title = if !app.search_query.is_empty() {
        format!("Nodes (filtered: {} matches)", total_rows)
    } else if total_rows > viewport_height && viewport_height > 0 {
        format!("Nodes ({}-{} of {})", start_idx + 1, end_idx, total_rows)
    } else {
        format!("Nodes ({})", total_rows)
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("► ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

/// Render the footer with help text
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.search_active {
        Line::from(vec![
            Span::styled("Type", Style::default().fg(Color::Yellow)),
            Span::raw(" to search  "),
            Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
            Span::raw(" Navigate  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" Confirm  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ])
    } else {
        let mut spans = vec![
            Span::styled("s/t/n", Style::default().fg(Color::Yellow)),
            Span::raw(" Sort Self/Total/Name  "),
            Span::styled("j/k", Style::default().fg(Color::Yellow)),
            Span::raw(" Nav  "),
            Span::styled("/", Style::default().fg(Color::Yellow)),
            Span::raw(" Search  "),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" Reload  "),
            Span::styled("q", Style::default().fg(Color::Yellow)),
            Span::raw(" Quit"),
        ];
        if let Some(status) = &app.status {
            spans.push(Span::raw("  │  "));
            spans.push(Span::styled(status.clone(), Style::default().fg(Color::Green)));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SortDirection;
    use ratatui::backend::TestBackend;

    const SAMPLE: &str = r#"{"name":"root","value":10,"children":[
        {"name":"parse","value":4,"children":[{"name":"lex","value":1}]},
        {"name":"render","value":3}
    ]}"#;

    fn create_test_app() -> App {
        let mut app = App::new("sample.json", ValidatorConfig::default());
        app.set_input(SAMPLE);
        app
    }

    fn names(app: &App) -> Vec<&str> {
        app.rows.iter().map(|r| r.name.as_str()).collect()
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer.get(x, y).symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_app_creation() {
        let app = create_test_app();
        assert_eq!(app.selected_index, 0);
        assert!(!app.should_quit);
        assert_eq!(names(&app), vec!["root", "parse", "lex", "render"]);
        assert!(app.tree().is_some());
        assert!(app.errors().is_none());
    }

    #[test]
    fn test_app_without_input() {
        let app = App::new("empty", ValidatorConfig::default());
        assert!(app.outcome().is_none());
        assert!(app.rows.is_empty());
        assert!(app.selected_row().is_none());
    }

    #[test]
    fn test_invalid_input_clears_rows() {
        let mut app = create_test_app();
        app.set_input(r#"{"name":"root"}"#);

        assert!(app.rows.is_empty());
        assert!(app.tree().is_none());
        assert_eq!(app.errors().unwrap().len(), 1);

        app.set_input(SAMPLE);
        assert_eq!(app.rows.len(), 4);
    }

    #[test]
    fn test_toggle_sort_cycle() {
        let mut app = create_test_app();

        app.toggle_sort(SortColumn::Total);
        assert_eq!(app.sort.direction(), SortDirection::Ascending);
        assert_eq!(names(&app), vec!["lex", "render", "parse", "root"]);

        app.toggle_sort(SortColumn::Total);
        assert_eq!(names(&app), vec!["root", "parse", "render", "lex"]);

        app.toggle_sort(SortColumn::Total);
        assert_eq!(names(&app), vec!["root", "parse", "lex", "render"]);
    }

    #[test]
    fn test_sort_survives_input_change() {
        let mut app = create_test_app();
        app.toggle_sort(SortColumn::Name);

        app.set_input(r#"{"name":"z","value":2,"children":[{"name":"a","value":1}]}"#);
        assert_eq!(names(&app), vec!["a", "z"]);
    }

    #[test]
    fn test_select_next_and_previous() {
        let mut app = create_test_app();

        app.select_next();
        assert_eq!(app.selected_index, 1);
        assert_eq!(app.selected_row().unwrap().name, "parse");

        app.select_last();
        app.select_next();
        assert_eq!(app.selected_index, 3);

        app.select_previous();
        assert_eq!(app.selected_index, 2);

        app.select_first();
        app.select_previous();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_selection_clamped_when_rows_shrink() {
        let mut app = create_test_app();
        app.select_last();

        app.set_input(r#"{"name":"solo","value":1}"#);
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_row().unwrap().name, "solo");
    }

    #[test]
    fn test_page_navigation() {
        let mut app = create_test_app();
        app.scroll_state.set_viewport_height(2);

        app.page_down();
        assert_eq!(app.selected_index, 2);

        app.page_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_search_filtering() {
        let mut app = create_test_app();

        app.start_search();
        app.search_push('r');
        app.search_push('e');
        assert_eq!(names(&app), vec!["parse", "render"]);

        app.search_pop();
        app.search_pop();
        assert_eq!(app.rows.len(), 4);

        app.search_push('x');
        app.clear_search();
        assert!(!app.search_active);
        assert_eq!(app.rows.len(), 4);
    }

    #[test]
    fn test_quit() {
        let mut app = create_test_app();
        app.quit();
        assert!(app.should_quit);
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("render", "render"));
        assert!(fuzzy_match("render", "rdr"));
        assert!(fuzzy_match("Render", "RENDER"));
        assert!(!fuzzy_match("render", "xyz"));
        assert!(fuzzy_match("render", ""));
        assert!(!fuzzy_match("re", "render"));
    }

    #[test]
    fn test_virtual_scroll_ensure_visible() {
        let mut state = VirtualScrollState::new();
        state.set_viewport_height(10);
        state.offset = 50;

        // Selection above visible area - should scroll up
        state.ensure_visible(40, 100);
        assert_eq!(state.offset, 40);
        assert_eq!(state.visible_range(100), (40, 50));

        // Selection below visible area - should scroll down
        state.offset = 0;
        state.ensure_visible(15, 100);
        assert_eq!(state.offset, 6);

        // Empty list
        state.ensure_visible(0, 0);
        assert_eq!(state.visible_range(0), (0, 0));
    }

    #[test]
    fn test_render_valid_input_shows_graph_and_table() {
        let mut app = create_test_app();
        let screen = draw(&mut app, 80, 24);

        assert!(screen.contains("flamescope - sample.json"));
        assert!(screen.contains("Flame Graph"));
        assert!(screen.contains("Self"));
        assert!(screen.contains("3 (30%)"));
        assert!(screen.contains("10 (100%)"));
        assert!(!screen.contains("Errors"));
    }

    #[test]
    fn test_render_invalid_input_shows_only_errors() {
        let mut app = create_test_app();
        app.set_input(r#"{"name":"root","value":"ten"}"#);
        let screen = draw(&mut app, 80, 24);

        assert!(screen.contains("Errors (1)"));
        assert!(screen.contains("Document is malformed"));
        assert!(screen.contains("value: Expected number, received string"));
        assert!(!screen.contains("Flame Graph"));
        assert!(!screen.contains("Nodes ("));
    }

    #[test]
    fn test_render_sort_indicator() {
        let mut app = create_test_app();
        app.toggle_sort(SortColumn::Total);
        let screen = draw(&mut app, 80, 24);
        assert!(screen.contains("Total ▲"));
    }

    fn no_reload() -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::Other, "Standard input cannot be reloaded"))
    }

    #[test]
    fn test_handle_key_navigation_and_sort() {
        let mut app = create_test_app();
        let mut reload = no_reload;

        handle_key(&mut app, KeyCode::Char('j'), &mut reload);
        assert_eq!(app.selected_index, 1);

        handle_key(&mut app, KeyCode::Char('t'), &mut reload);
        assert_eq!(app.sort.column(), Some(SortColumn::Total));

        handle_key(&mut app, KeyCode::Char('/'), &mut reload);
        handle_key(&mut app, KeyCode::Char('q'), &mut reload);
        assert!(!app.should_quit);
        assert_eq!(app.search_query, "q");

        handle_key(&mut app, KeyCode::Esc, &mut reload);
        handle_key(&mut app, KeyCode::Char('q'), &mut reload);
        assert!(app.should_quit);
    }

    #[test]
    fn test_reload_status_cleared_on_next_key() {
        let mut app = create_test_app();
        let mut reload = || -> io::Result<String> { Ok(r#"{"name":"fresh","value":2}"#.to_string()) };

        handle_key(&mut app, KeyCode::Char('r'), &mut reload);
        assert_eq!(app.status.as_deref(), Some("Reloaded"));
        assert_eq!(app.rows[0].name, "fresh");

        handle_key(&mut app, KeyCode::Char('j'), &mut reload);
        assert_eq!(app.status, None);
    }

    #[test]
    fn test_reload_failure_status() {
        let mut app = create_test_app();
        let mut reload = no_reload;

        handle_key(&mut app, KeyCode::Char('r'), &mut reload);
        assert_eq!(
            app.status.as_deref(),
            Some("Reload failed: Standard input cannot be reloaded")
        );
        // The previous outcome stays on screen
        assert_eq!(app.rows.len(), 4);

        handle_key(&mut app, KeyCode::Char('k'), &mut reload);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_render_selected_tooltip_in_flame_title() {
        let mut app = App::new("tips.json", ValidatorConfig::default());
        app.set_input(
            r#"{"name":"root","value":4,"tooltip":"whole run","children":[
                {"name":"io","value":2,"tooltip":"disk reads"}]}"#,
        );

        let screen = draw(&mut app, 80, 24);
        assert!(screen.contains("Flame Graph - whole run"));

        app.select_next();
        let screen = draw(&mut app, 80, 24);
        assert!(screen.contains("Flame Graph - disk reads"));
    }

    #[test]
    fn test_selected_tooltip() {
        let mut with_tip = Node::new("a", 1.0);
        with_tip.tooltip = Some("hint".to_string());
        let frames = layout(
            &Node::new("root", 2.0).with_child(with_tip),
            FlameDimensions::new(10, 3).unwrap(),
        );

        assert_eq!(selected_tooltip(&frames, "a"), Some("hint"));
        assert_eq!(selected_tooltip(&frames, "root"), None);
        assert_eq!(selected_tooltip(&frames, "missing"), None);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("document"), "Document");
        assert_eq!(capitalize(""), "");
    }
}
