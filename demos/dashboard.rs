//! Terminal dashboard for a Lync 12 controller.
//!
//! ```text
//! cargo run --example dashboard -- 192.168.1.50 [port]
//! ```
//!
//! Keys: up/down select a zone, `p` power, `m` mute, `+`/`-` volume,
//! `s` next source, `r` refresh all, `q` quit.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use htd_lync12::{
    DeviceConfig, Diagnostic, DiagnosticReceiver, HtdClient, MuteState, PowerState, ZoneState,
    DEFAULT_PORT, MAX_VOLUME, SOURCE_COUNT,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

struct App {
    client: HtdClient,
    zone_names: Vec<String>,
    source_names: Vec<String>,
    list_state: ListState,
    diagnostics: DiagnosticReceiver,
    status_message: String,
}

impl App {
    fn new(config: DeviceConfig) -> Self {
        let client = config.client();
        let diagnostics = client.subscribe_diagnostics();
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            zone_names: config.zone_names(),
            source_names: config.source_names(),
            client,
            list_state,
            diagnostics,
            status_message: format!("Connected to {}:{}", config.host, config.port),
        }
    }

    fn selected_zone(&self) -> u8 {
        self.list_state.selected().unwrap_or(0) as u8 + 1
    }

    fn select_next(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((i + 1) % self.zone_names.len()));
    }

    fn select_previous(&mut self) {
        let n = self.zone_names.len();
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((i + n - 1) % n));
    }

    async fn refresh(&mut self) {
        match self.client.query_all().await {
            Ok(_) => self.status_message = "Refreshed".to_string(),
            Err(e) => self.status_message = format!("Refresh failed: {}", e),
        }
    }

    async fn handle_key(&mut self, code: KeyCode) {
        let zone = self.selected_zone();
        let state = self.client.zone(zone).unwrap_or_else(|| ZoneState::new(zone));

        let result = match code {
            KeyCode::Char('p') => self.client.set_power(zone, !state.is_on()).await.map(|_| ()),
            KeyCode::Char('m') => {
                if state.is_muted() {
                    self.client.mute_off(zone).await.map(|_| ())
                } else {
                    self.client.mute_on(zone).await.map(|_| ())
                }
            }
            KeyCode::Char('+') | KeyCode::Char('-') => {
                let percent = u32::from(state.volume) * 100 / u32::from(MAX_VOLUME);
                let percent = if code == KeyCode::Char('+') {
                    (percent + 5).min(100)
                } else {
                    percent.saturating_sub(5)
                };
                self.client.set_volume(zone, percent as u8).await.map(|_| ())
            }
            KeyCode::Char('s') => {
                let next = state.source % SOURCE_COUNT + 1;
                self.client.set_source(zone, next).await.map(|_| ())
            }
            KeyCode::Char('r') => {
                self.refresh().await;
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.status_message = format!("Zone {}: {}", zone, e);
        }

        while let Some(diagnostic) = self.diagnostics.try_recv() {
            self.status_message = match diagnostic {
                Diagnostic::Timeout { .. } => "Controller did not answer".to_string(),
                Diagnostic::MalformedResponse { len, .. } => {
                    format!("Ignored {}-byte response", len)
                }
                Diagnostic::ZoneMismatch { requested, reported, .. } => {
                    format!("Asked for zone {:?}, got {}", requested, reported)
                }
                Diagnostic::NoZoneDecoded { .. } => "No zone in response".to_string(),
            };
        }
    }
}

fn zone_line<'a>(name: &'a str, state: &ZoneState, sources: &'a [String]) -> Line<'a> {
    let (power, color) = match state.power {
        Some(PowerState::On) => ("ON ", Color::Green),
        Some(PowerState::Off) => ("OFF", Color::DarkGray),
        Some(PowerState::Unknown) => ("???", Color::Red),
        None => (" - ", Color::DarkGray),
    };
    let mute = match state.mute {
        Some(MuteState::On) => "muted",
        Some(MuteState::Unknown) => "?",
        _ => "",
    };
    let source = usize::from(state.source)
        .checked_sub(1)
        .and_then(|i| sources.get(i))
        .map(String::as_str)
        .unwrap_or("-");

    Line::from(vec![
        Span::styled(format!("{:>2} ", state.zone), Style::default().fg(Color::Cyan)),
        Span::styled(power, Style::default().fg(color)),
        Span::raw(format!(" {:<16}", name)),
        Span::raw(format!(" vol {:>2}/{} ", state.volume, MAX_VOLUME)),
        Span::styled(format!("{:<6}", mute), Style::default().fg(Color::Yellow)),
        Span::raw(source),
    ])
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(f.size());

    let zones = app.client.zones();
    let items: Vec<ListItem> = zones
        .iter()
        .zip(app.zone_names.iter())
        .map(|(state, name)| ListItem::new(zone_line(name, state, &app.source_names)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Zones"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    let help = Paragraph::new(vec![Line::from(app.status_message.as_str())]).block(
        Block::default()
            .borders(Borders::ALL)
            .title("p power  m mute  +/- volume  s source  r refresh  q quit"),
    );
    f.render_widget(help, chunks[1]);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().ok_or("usage: dashboard <host> [port]")?;
    let port = match args.next() {
        Some(p) => p.parse()?,
        None => DEFAULT_PORT,
    };

    // Log to a file; stdout belongs to the terminal UI
    let log_file = std::fs::File::create("dashboard.log")?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let mut config = DeviceConfig::new(host);
    config.port = port;
    let mut app = App::new(config);
    app.refresh().await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down => app.select_next(),
                KeyCode::Up => app.select_previous(),
                code => app.handle_key(code).await,
            }
        }
    }
}
