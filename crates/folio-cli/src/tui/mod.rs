//! Interactive TUI (Terminal User Interface) for Folio.
//!
//! Provides a list view over one section with:
//! - Real-time search as you type (same syntax as `folio query`)
//! - Facet filters cycled from the keyboard
//! - Sort direction toggle and a detail pane for the selected record

use crate::app::{record_label, App};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use folio_core::{parse_query, resolve, Config, FieldPath, ListView, Selection, SortSpec};
use ratatui::{prelude::*, widgets::*};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// TUI application state.
struct TuiApp {
    /// Section name
    name: String,

    /// The section's list view
    view: ListView,

    /// Current query string
    query_string: String,

    /// Facet selections made with the keyboard, replayed over the typed query
    filter_overrides: BTreeMap<FieldPath, Selection>,

    /// Sort chosen with the keyboard, replayed over the typed query
    sort_override: Option<SortSpec>,

    /// Facet field that Ctrl+F cycles
    facet_cursor: usize,

    /// Selected result index
    selected: usize,

    /// Vertical scroll offset
    scroll_offset: usize,

    /// Show the selected record as JSON
    show_detail: bool,

    /// Whether we should quit
    should_quit: bool,

    /// Last query time
    last_query_time: Duration,

    /// Status message
    status_message: Option<String>,
}

impl TuiApp {
    fn new(name: String, view: ListView) -> Self {
        TuiApp {
            name,
            view,
            query_string: String::new(),
            filter_overrides: BTreeMap::new(),
            sort_override: None,
            facet_cursor: 0,
            selected: 0,
            scroll_offset: 0,
            show_detail: false,
            should_quit: false,
            last_query_time: Duration::ZERO,
            status_message: None,
        }
    }

    /// Build the spec from the keyboard overrides and the query string and
    /// run it once. Filters and sorts typed in the query string win over
    /// keyboard choices for the same field.
    fn refresh(&mut self) {
        let start = Instant::now();

        let mut base = self
            .filter_overrides
            .iter()
            .fold(self.view.initial_spec().clone(), |spec, (field, selection)| {
                spec.with_filter(field.clone(), selection.clone())
            });
        if let Some(ref sort) = self.sort_override {
            base = base.with_sort(sort.clone());
        }

        let spec = match parse_query(&self.query_string, &base) {
            Ok(spec) => spec,
            Err(e) => {
                self.status_message = Some(format!("Invalid query: {}", e));
                return;
            }
        };
        self.view.set_spec(spec);

        self.last_query_time = start.elapsed();

        // Reset selection
        self.selected = 0;
        self.scroll_offset = 0;
        self.status_message = None;
    }

    /// Handle input character.
    fn on_char(&mut self, c: char) {
        self.query_string.push(c);
        self.refresh();
    }

    /// Handle backspace.
    fn on_backspace(&mut self) {
        self.query_string.pop();
        self.refresh();
    }

    /// Move the facet cursor to the next facet field.
    fn next_facet(&mut self) {
        let count = self.view.facets().len();
        if count > 0 {
            self.facet_cursor = (self.facet_cursor + 1) % count;
        }
    }

    /// Step the facet under the cursor to its next value (`all` first).
    fn cycle_facet(&mut self) {
        let Some(facet) = self.view.facets().iter().nth(self.facet_cursor) else {
            self.status_message = Some("This section has no facets".to_string());
            return;
        };

        let mut options = vec![Selection::All];
        options.extend(facet.values.iter().map(|c| Selection::Value(c.value.clone())));

        let field = facet.field.clone();
        let current = self
            .view
            .spec()
            .filters()
            .get(&field)
            .cloned()
            .unwrap_or(Selection::All);
        let position = options.iter().position(|o| *o == current).unwrap_or(0);
        let next = options[(position + 1) % options.len()].clone();

        self.filter_overrides.insert(field.clone(), next.clone());
        self.refresh();

        if self.view.spec().filters().get(&field) != Some(&next) {
            self.status_message = Some(format!(
                "'{}' is set in the query text, which takes precedence",
                field
            ));
        }
    }

    /// Flip the primary sort direction.
    fn reverse_sort(&mut self) {
        let mut sort = self.view.spec().sort().clone();
        sort.direction = sort.direction.reversed();
        self.sort_override = Some(sort.clone());
        self.refresh();

        if self.view.spec().sort() != &sort {
            self.status_message =
                Some("Sort is set in the query text, which takes precedence".to_string());
        }
    }

    /// Drop the query string and keyboard overrides.
    fn reset(&mut self) {
        self.query_string.clear();
        self.filter_overrides.clear();
        self.sort_override = None;
        self.show_detail = false;
        self.refresh();
    }

    /// Move selection up.
    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.ensure_visible();
        }
    }

    /// Move selection down.
    fn select_next(&mut self) {
        if self.selected + 1 < self.view.len() {
            self.selected += 1;
            self.ensure_visible();
        }
    }

    /// Page up.
    fn page_up(&mut self, page_size: usize) {
        self.selected = self.selected.saturating_sub(page_size);
        self.ensure_visible();
    }

    /// Page down.
    fn page_down(&mut self, page_size: usize) {
        self.selected = (self.selected + page_size).min(self.view.len().saturating_sub(1));
        self.ensure_visible();
    }

    /// Ensure selected item is visible.
    fn ensure_visible(&mut self) {
        // Corrected against the real area height when drawing
        let visible_height = 20;

        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// Run the TUI application.
pub fn run(config: Config, section: &str, source: Option<PathBuf>) -> anyhow::Result<()> {
    let app = App::open(config, section, source)?;

    if app.collection.is_empty() {
        eprintln!("Section '{}' has no records.", app.name);
        return Ok(());
    }

    let (name, view) = app.into_view();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut tui_app = TuiApp::new(name, view);
    tui_app.refresh();

    // Main loop
    let result = run_loop(&mut terminal, &mut tui_app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Main event loop.
fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut TuiApp) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => {
                            if app.show_detail {
                                app.show_detail = false;
                            } else {
                                app.should_quit = true;
                            }
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.should_quit = true;
                        }
                        KeyCode::Char(c) => {
                            if key.modifiers.contains(KeyModifiers::CONTROL) {
                                match c {
                                    'f' => app.cycle_facet(),
                                    'n' => app.next_facet(),
                                    's' => app.reverse_sort(),
                                    'r' => app.reset(),
                                    _ => {}
                                }
                            } else {
                                app.on_char(c);
                            }
                        }
                        KeyCode::Tab => {
                            app.next_facet();
                        }
                        KeyCode::Backspace => {
                            app.on_backspace();
                        }
                        KeyCode::Up => {
                            app.select_previous();
                        }
                        KeyCode::Down => {
                            app.select_next();
                        }
                        KeyCode::PageUp => {
                            app.page_up(10);
                        }
                        KeyCode::PageDown => {
                            app.page_down(10);
                        }
                        KeyCode::Home => {
                            app.selected = 0;
                            app.scroll_offset = 0;
                        }
                        KeyCode::End => {
                            if !app.view.is_empty() {
                                app.selected = app.view.len() - 1;
                                app.ensure_visible();
                            }
                        }
                        KeyCode::Enter => {
                            app.show_detail = !app.show_detail && !app.view.is_empty();
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

mod ui {
    use super::*;

    /// Draw the UI.
    pub fn draw(f: &mut Frame, app: &mut TuiApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Search box
                Constraint::Length(1), // Facet bar
                Constraint::Min(10),   // Results
                Constraint::Length(2), // Status bar
            ])
            .split(f.area());

        draw_search_box(f, app, chunks[0]);
        draw_facet_bar(f, app, chunks[1]);
        if app.show_detail {
            draw_detail(f, app, chunks[2]);
        } else {
            draw_results(f, app, chunks[2]);
        }
        draw_status_bar(f, app, chunks[3]);
    }

    /// Draw the search input box.
    fn draw_search_box(f: &mut Frame, app: &TuiApp, area: Rect) {
        let input = Paragraph::new(app.query_string.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} (words, field=value, sort:field:dir) ", app.name)),
            );
        f.render_widget(input, area);

        // Show cursor
        f.set_cursor_position(Position::new(
            area.x + app.query_string.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }

    /// Draw one `field: selection` cell per facet, the cursor facet highlighted.
    fn draw_facet_bar(f: &mut Frame, app: &TuiApp, area: Rect) {
        let filters = app.view.spec().filters();
        let mut spans = Vec::new();

        for (i, facet) in app.view.facets().iter().enumerate() {
            let selection = filters
                .get(&facet.field)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "all".to_string());

            let style = if i == app.facet_cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Cyan)
            };

            spans.push(Span::styled(format!(" {}: {} ", facet.field, selection), style));
            spans.push(Span::raw(" "));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Draw the results list.
    fn draw_results(f: &mut Frame, app: &mut TuiApp, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;

        // Update scroll offset based on visible height
        if app.selected >= app.scroll_offset + visible_height {
            app.scroll_offset = app.selected + 1 - visible_height.max(1);
        }

        let sort_field = &app.view.spec().sort().field;
        let items: Vec<ListItem> = app
            .view
            .results()
            .skip(app.scroll_offset)
            .take(visible_height)
            .enumerate()
            .map(|(i, record)| {
                let line = match resolve(record, sort_field) {
                    Some(value) => format!("{}  [{}]", record_label(record), value),
                    None => record_label(record),
                };

                let style = if i + app.scroll_offset == app.selected {
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(line).style(style)
            })
            .collect();

        let title = format!(
            " Results ({} of {} in {:.1}ms, sorted by {}) ",
            app.view.len(),
            app.view.collection().len(),
            app.last_query_time.as_secs_f64() * 1000.0,
            app.view.spec().sort()
        );

        let results = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(results, area);
    }

    /// Draw the selected record as pretty JSON.
    fn draw_detail(f: &mut Frame, app: &TuiApp, area: Rect) {
        let text = app
            .view
            .get(app.selected)
            .and_then(|record| serde_json::to_string_pretty(record).ok())
            .unwrap_or_default();

        let detail = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Record (Esc to close) "));

        f.render_widget(detail, area);
    }

    /// Draw the status bar.
    fn draw_status_bar(f: &mut Frame, app: &TuiApp, area: Rect) {
        let status = if let Some(ref msg) = app.status_message {
            msg.clone()
        } else {
            "↑↓:Navigate Enter:Record Tab:Next facet Ctrl+F:Cycle facet Ctrl+S:Reverse Ctrl+R:Reset Esc:Quit"
                .to_string()
        };

        let status_bar = Paragraph::new(status).style(Style::default().fg(Color::Gray));

        f.render_widget(status_bar, area);
    }
}
