use std::{
    any::Any,
    io::{self, stdout},
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
    time::Duration,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::{
    service::data_manager::DataManager,
    ui::{menu::Menu, route::Route, views::*, Controller, RenderContext},
};

use super::ReplError;

const ACCENT: Color = Color::Rgb(200, 150, 0);

enum AppState {
    Menu,
    ViewingOutput(Box<dyn RenderableView>),
    Error(String),
}

struct App {
    state: AppState,
    menu: Menu,
    should_quit: bool,
    scroll_offset: u16,
    view_height: u16,
    pressed_keys: Vec<KeyCode>,
    panic_flag: Arc<Mutex<Option<String>>>,
}

impl App {
    fn new(panic_flag: Arc<Mutex<Option<String>>>) -> Self {
        Self {
            state: AppState::Menu,
            menu: Menu::new(),
            should_quit: false,
            scroll_offset: 0,
            view_height: 0,
            pressed_keys: Vec::new(),
            panic_flag,
        }
    }

    fn is_in_menu(&self) -> bool {
        matches!(self.state, AppState::Menu)
    }

    fn is_in_subview(&self) -> bool {
        matches!(self.state, AppState::ViewingOutput(_))
    }

    fn active_route(&self) -> Option<Route> {
        match &self.state {
            AppState::ViewingOutput(view) => view.route(),
            _ => None,
        }
    }

    fn open_view(&mut self, view: Box<dyn RenderableView>) {
        info!("Opening view '{}'", view.title());
        self.state = AppState::ViewingOutput(view);
        self.scroll_offset = 0;
        self.pressed_keys.clear();
    }

    fn open_route(&mut self, route: Route, ctrl: &Controller) {
        info!("Navigating to {}", route.path());
        self.open_view(route.open(ctrl));
    }

    fn next(&mut self) {
        match &self.state {
            AppState::Menu => self.menu.next(),
            AppState::ViewingOutput(_) | AppState::Error(_) => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
            }
        }
    }

    fn previous(&mut self) {
        match &self.state {
            AppState::Menu => self.menu.previous(),
            AppState::ViewingOutput(_) | AppState::Error(_) => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
        }
    }

    fn page_down(&mut self, amount: u16) {
        if self.is_in_subview() {
            self.scroll_offset = self.scroll_offset.saturating_add(amount);
        }
    }

    fn page_up(&mut self, amount: u16) {
        if self.is_in_subview() {
            self.scroll_offset = self.scroll_offset.saturating_sub(amount);
        }
    }

    fn manual_refresh(&mut self, ctrl: &Controller) {
        if let AppState::ViewingOutput(view) = &mut self.state {
            info!("Manual refresh of '{}'", view.title());
            view.refresh_data(ctrl);
            self.scroll_offset = 0;
        }
    }

    /// Switches to the panic screen once the hook reported one
    fn check_panic(&mut self) {
        if let Ok(panic_guard) = self.panic_flag.lock() {
            if let Some(panic_msg) = panic_guard.as_ref() {
                if !matches!(self.state, AppState::Error(_)) {
                    self.state = AppState::Error(panic_msg.clone());
                    self.scroll_offset = 0;
                }
            }
        }
    }

    /// Runs `step`, turning a panic inside it into the panic screen
    fn guarded<R>(&mut self, step: impl FnOnce(&mut Self) -> R) -> Option<R> {
        match panic::catch_unwind(AssertUnwindSafe(|| step(self))) {
            Ok(result) => Some(result),
            Err(payload) => {
                self.recover(payload.as_ref());
                None
            }
        }
    }

    fn recover(&mut self, payload: &(dyn Any + Send)) {
        let reported = self.panic_flag.lock().ok().and_then(|guard| guard.clone());
        let msg = reported.unwrap_or_else(|| format!("Application panicked!\n\nMessage:\n  {}\n", payload_message(payload)));
        self.state = AppState::Error(msg);
        self.scroll_offset = 0;
        self.pressed_keys.clear();
    }

    /// Hands pending keys to the active view and lets it poll its data
    fn tick(&mut self, ctrl: &Controller) {
        if let AppState::ViewingOutput(view) = &mut self.state {
            view.update(ctrl, &self.pressed_keys);
        }
        self.pressed_keys.clear();
    }

    fn handle_key(&mut self, code: KeyCode, ctrl: &Controller) {
        if let KeyCode::Char(c) = code {
            if let Some(route) = Route::from_hotkey(c) {
                if !matches!(self.state, AppState::Error(_)) {
                    self.open_route(route, ctrl);
                    return;
                }
            }
        }

        match code {
            KeyCode::Char('q') if !self.is_in_subview() => self.should_quit = true,
            KeyCode::Char('r') if self.is_in_subview() => self.manual_refresh(ctrl),
            KeyCode::Up => self.previous(),
            KeyCode::Down => self.next(),
            KeyCode::PageUp => self.page_up(self.view_height / 2),
            KeyCode::PageDown => self.page_down(self.view_height / 2),
            KeyCode::Esc | KeyCode::Char('q') if self.is_in_subview() => {
                self.state = AppState::Menu;
                self.scroll_offset = 0;
            }
            KeyCode::Enter if self.is_in_menu() => {
                if let Some(factory) = self.menu.get_factory() {
                    self.open_view(factory(ctrl));
                }
            }
            _ => self.pressed_keys.push(code),
        }
    }

    fn link_bar(&self) -> Line<'static> {
        let active = self.active_route();
        let mut spans = vec![Span::raw(" ")];
        for (i, route) in Route::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
            }
            let label = format!("[{}] {}", route.hotkey(), route.label());
            let style = if active == Some(*route) {
                Style::default().bg(ACCENT).fg(Color::Black).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            spans.push(Span::styled(label, style));
        }
        Line::from(spans)
    }

    fn footer(&self) -> String {
        match &self.state {
            AppState::Menu => "Use ↑/↓ to navigate, Enter to select, 1-4 to jump to a page, q to quit.".to_string(),
            AppState::ViewingOutput(view) => {
                let general = "↑/↓ PgUp/PgDn scroll, r refresh, 1-4 pages, Esc/q menu";
                match view.hints() {
                    "" => general.to_string(),
                    hints => format!("{} | {}", hints, general),
                }
            }
            AppState::Error(_) => "Press 'q' to quit.".to_string(),
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());
        self.view_height = chunks[1].height;

        let header = Paragraph::new(self.link_bar()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title("Gamestats - Game Statistics Dashboard")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        );
        f.render_widget(header, chunks[0]);

        let info_paragraph = Paragraph::new(self.footer())
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Right);
        f.render_widget(info_paragraph, chunks[2]);

        match &self.state {
            AppState::Error(panic_msg) => {
                let error_block = Block::default()
                    .borders(Borders::ALL)
                    .title("ERROR - Application Panicked")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .padding(ratatui::widgets::Padding::horizontal(1))
                    .border_style(Style::default().fg(Color::Red));

                let error_text = Paragraph::new(panic_msg.as_str())
                    .block(error_block)
                    .wrap(Wrap { trim: false })
                    .scroll((self.scroll_offset, 0))
                    .style(Style::default().fg(Color::Red));

                f.render_widget(error_text, chunks[1]);
            }
            AppState::Menu => self.menu.render(f, chunks[1]),
            AppState::ViewingOutput(view) => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .padding(ratatui::widgets::Padding::horizontal(1))
                    .title(view.title().to_string())
                    .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(ACCENT));

                let rc = RenderContext {
                    frame: f,
                    area: chunks[1],
                    scroll_offset: self.scroll_offset,
                    block,
                };
                view.render(rc);
            }
        }
    }

    /// One frame: poll the view, then draw
    fn step<B: Backend>(&mut self, terminal: &mut Terminal<B>, ctrl: &Controller) -> io::Result<()> {
        self.check_panic();
        self.guarded(|app| app.tick(ctrl));
        match self.guarded(|app| terminal.draw(|f| app.draw(f)).map(|_| ())) {
            Some(result) => result,
            None => {
                terminal.current_buffer_mut().reset();
                terminal.draw(|f| self.draw(f)).map(|_| ())
            }
        }
    }

    fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>, ctrl: &Controller) -> Result<(), ReplError> {
        loop {
            self.step(terminal, ctrl)?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    self.guarded(|app| app.handle_key(key.code, ctrl));
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<no message>"
    }
}

/// Leaves raw mode and the alternate screen when dropped, also while unwinding
struct TerminalRestore;

impl TerminalRestore {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let restore = TerminalRestore;
        execute!(stdout(), EnterAlternateScreen)?;
        Ok(restore)
    }
}

impl Drop for TerminalRestore {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", err);
        }
        if let Err(err) = execute!(stdout(), LeaveAlternateScreen) {
            error!("Failed to leave alternate screen: {}", err);
        }
    }
}

fn install_panic_hook(panic_flag: Arc<Mutex<Option<String>>>) {
    std::panic::set_hook(Box::new(move |panic_info| {
        let mut msg = String::from("Application panicked!\n\n");

        if let Some(location) = panic_info.location() {
            msg.push_str(&format!(
                "Location: {}:{}:{}\n\n",
                location.file(),
                location.line(),
                location.column()
            ));
        }

        msg.push_str(&format!("Message:\n  {}\n\n", payload_message(panic_info.payload())));

        if let Some(thread_name) = std::thread::current().name() {
            msg.push_str(&format!("Thread: {}\n\n", thread_name));
        } else {
            msg.push_str(&format!(
                "Thread: <unnamed> (id: {:?})\n\n",
                std::thread::current().id()
            ));
        }

        msg.push_str("Backtrace:\n");
        let backtrace_enabled = std::env::var("RUST_BACKTRACE")
            .map(|v| v == "1" || v.to_lowercase() == "full")
            .unwrap_or(false);
        if backtrace_enabled {
            let backtrace = std::backtrace::Backtrace::force_capture();
            msg.push_str(&format!("{}\n", backtrace));
        } else {
            msg.push_str("  <disabled - run with RUST_BACKTRACE=1 to enable>\n");
        }

        error!("{}", msg);

        // Worker panics surface as a failed load in their view
        if std::thread::current().name() != Some("main") {
            return;
        }
        if let Ok(mut panic_info_guard) = panic_flag.lock() {
            *panic_info_guard = Some(msg);
        }
    }));
}

pub fn run(manager: DataManager, start: Route) -> Result<(), ReplError> {
    let panic_flag = Arc::new(Mutex::new(None));
    install_panic_hook(panic_flag.clone());

    let restore = TerminalRestore::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let ctrl = Controller { manager: &manager };
    let mut app = App::new(panic_flag);
    app.guarded(|app| app.open_route(start, &ctrl));
    let result = app.run(&mut terminal, &ctrl);

    terminal.show_cursor()?;
    drop(restore);

    result
}
