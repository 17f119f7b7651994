//! Pingup TUI Application
//!
//! A terminal user interface for browsing Pingup places, their services and
//! the time slots available this week.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pingup_client::{ClientConfig, Environment, PingupClient, PlaceFilters};

const LOG_FILE: &str = "pingup-tui.log";
const PAGE_SIZE: u32 = 20;

// ============================================================================
// Application State
// ============================================================================

/// Represents the current screen being displayed
#[derive(Debug, Clone, PartialEq)]
enum AppScreen {
    /// Token input screen - user enters an access token
    TokenInput,
    /// Loading places from API
    LoadingPlaces,
    /// Place table screen with paging
    PlaceTable,
    /// Loading services of the selected place
    LoadingServices,
    /// Service table for the selected place
    ServiceTable,
    /// Loading time slots of the selected service
    LoadingSlots,
    /// Time slot table for the selected service
    SlotTable,
}

/// Main application state
struct AppState {
    screen: AppScreen,
    /// Access token entered by user
    token: String,
    cursor_position: usize,
    sandbox: bool,
    client: Option<PingupClient>,
    places: Vec<Value>,
    /// Offset of the first place shown
    place_offset: u32,
    selected_place: usize,
    services: Vec<Value>,
    selected_service: usize,
    slots: Vec<Value>,
    selected_slot: usize,
    error_message: Option<String>,
    should_quit: bool,
}

impl AppState {
    fn new() -> Self {
        // Prefill from PINGUP_TOKEN / PINGUP_SANDBOX when available.
        let (token, sandbox) = match ClientConfig::from_env() {
            Ok(config) => (config.token, config.environment == Environment::Sandbox),
            Err(_) => (String::new(), false),
        };
        Self {
            screen: AppScreen::TokenInput,
            cursor_position: token.len(),
            token,
            sandbox,
            client: None,
            places: Vec::new(),
            place_offset: 0,
            selected_place: 0,
            services: Vec::new(),
            selected_service: 0,
            slots: Vec::new(),
            selected_slot: 0,
            error_message: None,
            should_quit: false,
        }
    }

    /// Initialize the API client with the current token
    fn init_client(&mut self) -> Result<(), String> {
        match PingupClient::new(&self.token, self.sandbox) {
            Ok(client) => {
                info!(endpoint = client.endpoint(), "client initialized");
                self.client = Some(client);
                Ok(())
            }
            Err(e) => Err(format!("Failed to create client: {e}")),
        }
    }

    fn fetch_places(&mut self) -> Result<(), String> {
        let client = self.client.as_ref().ok_or("Client not initialized")?;
        let filters = PlaceFilters {
            offset: Some(self.place_offset),
            limit: Some(PAGE_SIZE),
            ..Default::default()
        };
        match client.places().list(&filters) {
            Ok(value) => {
                self.places = items(value);
                self.selected_place = 0;
                Ok(())
            }
            Err(e) => Err(format!("Failed to fetch places: {e}")),
        }
    }

    fn fetch_services(&mut self) -> Result<(), String> {
        let client = self.client.as_ref().ok_or("Client not initialized")?;
        let place_id = self
            .places
            .get(self.selected_place)
            .map(|p| text(p, &["id"]))
            .ok_or("No place selected")?;
        match client.places().services(&place_id) {
            Ok(value) => {
                self.services = items(value);
                self.selected_service = 0;
                Ok(())
            }
            Err(e) => Err(format!("Failed to fetch services: {e}")),
        }
    }

    fn fetch_slots(&mut self) -> Result<(), String> {
        let client = self.client.as_ref().ok_or("Client not initialized")?;
        let place_id = self
            .places
            .get(self.selected_place)
            .map(|p| text(p, &["id"]))
            .ok_or("No place selected")?;
        let service_id = self
            .services
            .get(self.selected_service)
            .map(|s| text(s, &["id"]))
            .ok_or("No service selected")?;

        let (start, end) = this_week();
        match client
            .places()
            .time_slots(&place_id, &service_id, &start, &end, None)
        {
            Ok(value) => {
                self.slots = items(value);
                self.selected_slot = 0;
                Ok(())
            }
            Err(e) => Err(format!("Failed to fetch time slots: {e}")),
        }
    }

    /// Byte width of the char left of the cursor, 0 at the start.
    fn char_width_before_cursor(&self) -> usize {
        self.token[..self.cursor_position]
            .chars()
            .next_back()
            .map_or(0, char::len_utf8)
    }

    /// Byte width of the char right of the cursor, 0 at the end.
    fn char_width_after_cursor(&self) -> usize {
        self.token[self.cursor_position..]
            .chars()
            .next()
            .map_or(0, char::len_utf8)
    }

    /// Cursor position in terminal columns.
    fn cursor_column(&self) -> u16 {
        self.token[..self.cursor_position].chars().count() as u16
    }

    fn clear_error(&mut self) {
        self.error_message = None;
    }

    fn set_error(&mut self, message: String) {
        warn!("{message}");
        self.error_message = Some(message);
    }
}

// ============================================================================
// Terminal Setup
// ============================================================================

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Log to a file; stdout belongs to the UI.
fn setup_logging() -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ============================================================================
// UI Rendering
// ============================================================================

fn title_block(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL))
}

fn help_line(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
}

fn screen_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Body
            Constraint::Length(2), // Help
            Constraint::Length(2), // Status bar
        ])
        .split(area)
        .to_vec()
}

fn render_token_input(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Input
            Constraint::Length(2), // Help
            Constraint::Min(1),    // Spacer
            Constraint::Length(2), // Status bar
        ])
        .split(f.area());

    f.render_widget(title_block("Pingup Browser".into()), chunks[0]);

    let environment = if state.sandbox { "sandbox" } else { "live" };
    let input_block = Block::default()
        .title(format!(" Access token ({environment}) "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let input_text = Paragraph::new(state.token.as_str())
        .style(Style::default().fg(Color::White))
        .block(input_block);
    f.render_widget(input_text, chunks[1]);

    let cursor_x = chunks[1].x + state.cursor_column() + 1;
    let cursor_y = chunks[1].y + 1;
    f.set_cursor_position((cursor_x, cursor_y));

    f.render_widget(
        help_line("Enter: Connect | Tab: Toggle sandbox | Esc: Quit"),
        chunks[2],
    );
    render_status_bar(f, chunks[4], state);
}

fn render_loading(f: &mut Frame, state: &AppState, message: &str) {
    let chunks = screen_layout(f.area());
    f.render_widget(title_block("Pingup Browser".into()), chunks[0]);

    let loading = Paragraph::new(format!("{message}..."))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(loading, chunks[1]);

    render_status_bar(f, chunks[3], state);
}

/// Render a list of JSON items as a table, one column per key path.
fn render_items(
    f: &mut Frame,
    area: Rect,
    title: &str,
    columns: &[(&str, &[&str], u16)],
    rows: &[Value],
    selected: usize,
) {
    let table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(
                columns
                    .iter()
                    .map(|(_, keys, width)| Cell::from(truncate(&text(item, keys), *width)))
                    .collect::<Vec<_>>(),
            )
            .style(style)
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|(_, _, width)| Constraint::Length(*width))
        .collect();
    let header = Row::new(columns.iter().map(|(name, _, _)| *name).collect::<Vec<_>>())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!(" {title} ")));
    f.render_widget(table, area);
}

fn render_place_table(f: &mut Frame, state: &AppState) {
    let chunks = screen_layout(f.area());
    let first = state.place_offset + 1;
    let last = state.place_offset + state.places.len() as u32;
    f.render_widget(title_block(format!("Places {first}-{last}")), chunks[0]);

    render_items(
        f,
        chunks[1],
        "Places",
        &[
            ("Name", &["name"], 30),
            ("Locality", &["locality", "location.locality", "address.locality"], 20),
            ("Category", &["category", "categories.0"], 20),
            ("Id", &["id"], 26),
        ],
        &state.places,
        state.selected_place,
    );

    f.render_widget(
        help_line("Enter: Services | n: Next | p: Prev | Esc: Back | q: Quit"),
        chunks[2],
    );
    render_status_bar(f, chunks[3], state);
}

fn render_service_table(f: &mut Frame, state: &AppState) {
    let chunks = screen_layout(f.area());
    let place = state
        .places
        .get(state.selected_place)
        .map(|p| text(p, &["name", "id"]))
        .unwrap_or_default();
    f.render_widget(title_block(format!("Services - {place}")), chunks[0]);

    render_items(
        f,
        chunks[1],
        "Services",
        &[
            ("Name", &["name"], 30),
            ("Duration", &["duration"], 10),
            ("Price", &["price", "price.amount"], 10),
            ("Id", &["id"], 26),
        ],
        &state.services,
        state.selected_service,
    );

    f.render_widget(
        help_line("Enter: Time slots | Esc: Back | q: Quit"),
        chunks[2],
    );
    render_status_bar(f, chunks[3], state);
}

fn render_slot_table(f: &mut Frame, state: &AppState) {
    let chunks = screen_layout(f.area());
    let service = state
        .services
        .get(state.selected_service)
        .map(|s| text(s, &["name", "id"]))
        .unwrap_or_default();
    let (start, end) = this_week();
    f.render_widget(
        title_block(format!("Time slots - {service} | {start} to {end}")),
        chunks[0],
    );

    render_items(
        f,
        chunks[1],
        "Time slots",
        &[
            ("Start", &["startTime", "start"], 22),
            ("End", &["endTime", "end"], 22),
            ("Personnel", &["personnelId", "personnel.name"], 26),
        ],
        &state.slots,
        state.selected_slot,
    );

    f.render_widget(help_line("Esc: Back | q: Quit"), chunks[2]);
    render_status_bar(f, chunks[3], state);
}

fn render_status_bar(f: &mut Frame, area: Rect, state: &AppState) {
    let status_text = match (&state.error_message, &state.client) {
        (Some(error), _) => format!(" Error: {error}"),
        (None, Some(client)) => format!(" Connected to: {}", client.endpoint()),
        (None, None) => " Not connected".to_string(),
    };

    let style = if state.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let status = Paragraph::new(status_text)
        .style(style)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}

fn render(f: &mut Frame, state: &AppState) {
    match state.screen {
        AppScreen::TokenInput => render_token_input(f, state),
        AppScreen::LoadingPlaces => render_loading(f, state, "Loading places"),
        AppScreen::PlaceTable => render_place_table(f, state),
        AppScreen::LoadingServices => render_loading(f, state, "Loading services"),
        AppScreen::ServiceTable => render_service_table(f, state),
        AppScreen::LoadingSlots => render_loading(f, state, "Loading time slots"),
        AppScreen::SlotTable => render_slot_table(f, state),
    }
}

// ============================================================================
// Event Handling
// ============================================================================

fn handle_token_input(event: KeyEvent, state: &mut AppState) {
    match event.code {
        KeyCode::Char(c) => {
            state.token.insert(state.cursor_position, c);
            state.cursor_position += c.len_utf8();
            state.clear_error();
        }
        KeyCode::Backspace => {
            if state.cursor_position > 0 {
                state.cursor_position -= state.char_width_before_cursor();
                state.token.remove(state.cursor_position);
                state.clear_error();
            }
        }
        KeyCode::Delete => {
            if state.cursor_position < state.token.len() {
                state.token.remove(state.cursor_position);
                state.clear_error();
            }
        }
        KeyCode::Left => {
            state.cursor_position -= state.char_width_before_cursor();
        }
        KeyCode::Right => {
            state.cursor_position += state.char_width_after_cursor();
        }
        KeyCode::Home => state.cursor_position = 0,
        KeyCode::End => state.cursor_position = state.token.len(),
        KeyCode::Tab => state.sandbox = !state.sandbox,
        KeyCode::Enter => {
            if let Err(e) = state.init_client() {
                state.set_error(e);
            } else {
                state.place_offset = 0;
                state.screen = AppScreen::LoadingPlaces;
            }
        }
        KeyCode::Esc => state.should_quit = true,
        _ => {}
    }
}

/// Move a selection up or down within `len` rows.
fn move_selection(selected: &mut usize, len: usize, code: KeyCode) {
    match code {
        KeyCode::Up => *selected = selected.saturating_sub(1),
        KeyCode::Down => {
            if *selected + 1 < len {
                *selected += 1;
            }
        }
        _ => {}
    }
}

fn handle_place_table(event: KeyEvent, state: &mut AppState) {
    match event.code {
        KeyCode::Up | KeyCode::Down => {
            move_selection(&mut state.selected_place, state.places.len(), event.code)
        }
        KeyCode::Enter if !state.places.is_empty() => {
            state.clear_error();
            state.screen = AppScreen::LoadingServices;
        }
        KeyCode::Char('n') if state.places.len() as u32 == PAGE_SIZE => {
            state.place_offset += PAGE_SIZE;
            state.screen = AppScreen::LoadingPlaces;
        }
        KeyCode::Char('p') if state.place_offset > 0 => {
            state.place_offset = state.place_offset.saturating_sub(PAGE_SIZE);
            state.screen = AppScreen::LoadingPlaces;
        }
        KeyCode::Esc => {
            state.client = None;
            state.clear_error();
            state.screen = AppScreen::TokenInput;
        }
        _ => {}
    }
}

fn handle_service_table(event: KeyEvent, state: &mut AppState) {
    match event.code {
        KeyCode::Up | KeyCode::Down => {
            move_selection(&mut state.selected_service, state.services.len(), event.code)
        }
        KeyCode::Enter if !state.services.is_empty() => {
            state.clear_error();
            state.screen = AppScreen::LoadingSlots;
        }
        KeyCode::Esc => {
            state.clear_error();
            state.screen = AppScreen::PlaceTable;
        }
        _ => {}
    }
}

fn handle_slot_table(event: KeyEvent, state: &mut AppState) {
    match event.code {
        KeyCode::Up | KeyCode::Down => {
            move_selection(&mut state.selected_slot, state.slots.len(), event.code)
        }
        KeyCode::Esc => {
            state.clear_error();
            state.screen = AppScreen::ServiceTable;
        }
        _ => {}
    }
}

fn handle_event(event: Event, state: &mut AppState) {
    if let Event::Key(key_event) = event {
        // 'q' quits everywhere except while typing the token
        if key_event.code == KeyCode::Char('q')
            && state.screen != AppScreen::TokenInput
            && key_event.modifiers == KeyModifiers::NONE
        {
            state.should_quit = true;
            return;
        }

        match state.screen {
            AppScreen::TokenInput => handle_token_input(key_event, state),
            AppScreen::PlaceTable => handle_place_table(key_event, state),
            AppScreen::ServiceTable => handle_service_table(key_event, state),
            AppScreen::SlotTable => handle_slot_table(key_event, state),
            _ => {} // Loading screens don't handle input
        }
    }
}

// ============================================================================
// Application Logic
// ============================================================================

/// Perform the fetch a loading screen stands for, then move on.
fn process_state(state: &mut AppState) {
    let (result, next, fallback) = match state.screen {
        AppScreen::LoadingPlaces => (
            state.fetch_places(),
            AppScreen::PlaceTable,
            AppScreen::TokenInput,
        ),
        AppScreen::LoadingServices => (
            state.fetch_services(),
            AppScreen::ServiceTable,
            AppScreen::PlaceTable,
        ),
        AppScreen::LoadingSlots => (
            state.fetch_slots(),
            AppScreen::SlotTable,
            AppScreen::ServiceTable,
        ),
        _ => return,
    };

    match result {
        Ok(()) => state.screen = next,
        Err(e) => {
            state.set_error(e);
            state.screen = fallback;
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// The list inside a response: the body itself, or its first array field.
fn items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(list) => list,
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(list) => Some(list),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// First non-empty value among dotted key paths, rendered as text.
fn text(item: &Value, paths: &[&str]) -> String {
    paths
        .iter()
        .filter_map(|path| {
            path.split('.').try_fold(item, |v, key| match key.parse::<usize>() {
                Ok(i) => v.get(i),
                Err(_) => v.get(key),
            })
        })
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

fn truncate(s: &str, width: u16) -> String {
    let width = width as usize;
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(4)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Today and six days later, the widest span the API accepts.
fn this_week() -> (String, String) {
    let today = chrono::Local::now().date_naive();
    let end = today + chrono::Duration::days(6);
    (
        today.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}

// ============================================================================
// Main Application
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging()?;
    let mut state = AppState::new();
    let mut terminal = setup_terminal()?;

    loop {
        terminal.draw(|f| render(f, &state))?;

        process_state(&mut state);

        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            let event = event::read()?;
            handle_event(event, &mut state);
        }
    }

    restore_terminal(&mut terminal)?;

    Ok(())
}
