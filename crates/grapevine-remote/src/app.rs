//! App: component-based event loop for the remote.
//!
//! Architecture:
//! - `App` owns every component, the `Synchronizer` and the transient message.
//! - A `tokio::mpsc` channel carries `AppMessage`s in from background tasks:
//!   terminal events, command outcomes, status snapshots and message expiry.
//! - The loop draws a frame, then awaits the next message.  All belief and
//!   message mutation happens on this one task.
//! - Input handlers return `Vec<Action>`; `apply` carries them out.  Every
//!   daemon request goes through `issue`.

use std::io;
use std::time::Duration;

use grapevine_proto::client::DaemonClient;
use grapevine_proto::config::RemoteConfig;
use grapevine_proto::protocol::{CommandOutcome, ControlIntent, StatusSnapshot};
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{
    action::{Action, Pane, PathTarget},
    app_state::{AppState, DaemonLink},
    component::Component,
    components::{controls::ControlPanel, header::Header},
    focus::FocusRing,
    keymap::{self, KeyContext},
    sync::{Synchronizer, Ticket},
    theme::C_BG,
    widgets::{
        pane_chrome::pane_chrome,
        path_input::{PathAction, PathInput},
        status_bar::{self, InputMode},
        toast::MessageSlot,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

pub enum AppMessage {
    Event(Event),
    /// A dispatched intent came back.
    Resolved {
        ticket: Option<Ticket>,
        outcome: CommandOutcome,
    },
    /// `/status` answered.
    Snapshot(StatusSnapshot),
    /// `/ping` answered; `None` when the daemon could not be reached.
    Linked(Option<String>),
    /// Deferred clear for the message of this generation.
    MessageExpired(u64),
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    client: DaemonClient,
    sync: Synchronizer,

    // ── Shared state (passed read-only to components) ─────────────────────────
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    transport: ControlPanel,
    enqueue: ControlPanel,
    path_input: PathInput,
    message: MessageSlot,

    focus: FocusRing,
    show_keys: bool,
    status_poll: Option<Duration>,

    /// Last-drawn path pane, for click-to-focus.
    path_area: Rect,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,

    /// Whether to quit on next iteration.
    should_quit: bool,
}

impl App {
    pub fn new(client: DaemonClient, config: &RemoteConfig) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(256);
        Self {
            client,
            sync: Synchronizer::new(),
            state: AppState::default(),
            header: Header::new(),
            transport: ControlPanel::transport(),
            enqueue: ControlPanel::enqueue(),
            path_input: PathInput::default(),
            message: MessageSlot::new(config.message_duration()),
            focus: FocusRing::default(),
            show_keys: true,
            status_poll: config.status_poll_interval(),
            path_area: Rect::default(),
            tx,
            rx: Some(rx),
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let Some(rx) = self.rx.take() else {
            anyhow::bail!("event loop already running");
        };

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || forward_events(event_tx, read_terminal));

        let result = self.event_loop(&mut terminal, rx).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("remote stopped");
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        mut rx: mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        self.start();

        let mut poll = self.status_poll.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }
            tokio::select! {
                Some(msg) = rx.recv() => self.handle_message(msg),
                _ = next_tick(&mut poll) => self.refresh_snapshot(),
            }
        }
        Ok(())
    }

    /// Startup probes: which daemon is behind the gateway, and what it is doing.
    fn start(&self) {
        info!("remote talking to {}", self.client.base_url());
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let linked = match client.ping().await {
                Ok(addr) => Some(addr),
                Err(e) => {
                    debug!("ping failed: {}", e);
                    None
                }
            };
            let _ = tx.send(AppMessage::Linked(linked)).await;
        });
        self.refresh_snapshot();
    }

    /// Ask for `/status`.  Failures are silent; the belief keeps its value.
    fn refresh_snapshot(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match client.status().await {
                Ok(snapshot) => {
                    let _ = tx.send(AppMessage::Snapshot(snapshot)).await;
                }
                Err(e) => debug!("status unavailable: {}", e),
            }
        });
    }

    // ── Message handling ──────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.apply(action);
                }
            }
            AppMessage::Event(Event::Mouse(mouse)) => {
                for action in self.handle_mouse(mouse) {
                    self.apply(action);
                }
            }
            AppMessage::Event(_) => {}
            AppMessage::Resolved { ticket, outcome } => {
                let resolution = self.sync.resolve(ticket, &outcome);
                if let Some(ticket) = ticket {
                    debug!("{:?}: {:?}", ticket.field(), resolution);
                }
                self.flash(&outcome);
            }
            AppMessage::Snapshot(snapshot) => {
                if snapshot.is_empty() {
                    debug!("status carried no transport fields");
                } else if self.sync.apply_snapshot(&snapshot) {
                    debug!("belief replaced by daemon status: {:?}", self.sync.belief());
                }
            }
            AppMessage::Linked(addr) => {
                self.state.daemon = match addr {
                    Some(addr) => {
                        info!("daemon at {}", addr);
                        DaemonLink::Linked(addr)
                    }
                    None => {
                        warn!("daemon unreachable via {}", self.client.base_url());
                        DaemonLink::Unreachable
                    }
                };
            }
            AppMessage::MessageExpired(generation) => {
                self.message.expire(generation);
            }
        }
        self.state.observe(&self.sync);
        self.state.path_ready = !self.path_input.is_empty();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let ctx = KeyContext {
            text_focused: self.focus.is_focused(Pane::PathInput),
            playing: self.sync.belief().playing,
        };
        if let Some(intent) = keymap::shortcut(&key, ctx) {
            return vec![Action::Issue(intent)];
        }
        if let Some(action) = keymap::ui_key(&key, ctx) {
            return vec![action];
        }
        if !ctx.text_focused {
            return vec![];
        }
        match self.path_input.handle_key(key) {
            PathAction::Submit(intent) => vec![Action::Issue(intent)],
            PathAction::Leave => vec![Action::FocusPane(Pane::Controls)],
            PathAction::None => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if !matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
            return vec![];
        }

        let mut actions = self.transport.handle_mouse(event, &self.state);
        if !actions.is_empty() {
            // Pressing a button takes focus away from the path field.
            actions.insert(0, Action::FocusPane(Pane::Controls));
            return actions;
        }
        let actions = self.enqueue.handle_mouse(event, &self.state);
        if !actions.is_empty() {
            return actions;
        }
        if self.path_area.contains(Position::new(event.column, event.row)) {
            return vec![Action::FocusPane(Pane::PathInput)];
        }
        vec![Action::FocusPane(Pane::Controls)]
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Issue(intent) => self.issue(intent),
            Action::SubmitPath(target) => {
                let intent = match target {
                    PathTarget::Song => self.path_input.song(),
                    PathTarget::Playlist => self.path_input.playlist(),
                };
                if let Some(intent) = intent {
                    self.issue(intent);
                }
            }
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPane(pane) => self.focus.set(pane),
            Action::ToggleHelp => self.show_keys = !self.show_keys,
            Action::Quit => self.should_quit = true,
        }
    }

    /// Single entry point for every daemon request.  Applies the optimistic
    /// transition now; the outcome comes back as `AppMessage::Resolved`.
    fn issue(&mut self, intent: ControlIntent) {
        let ticket = self.sync.begin(&intent);
        info!("issue {}", intent.label());
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = client.send(&intent).await;
            let _ = tx.send(AppMessage::Resolved { ticket, outcome }).await;
        });
    }

    /// Show an outcome and schedule its removal.
    fn flash(&mut self, outcome: &CommandOutcome) {
        let generation = self.message.show(outcome);
        let delay = self.message.duration();
        let tx = self.tx.clone();
        self.message.arm(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppMessage::MessageExpired(generation)).await;
        }));
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.draw(frame, outer[0], false, &self.state);

        let controls_focused = self.focus.is_focused(Pane::Controls);
        self.transport
            .draw(frame, outer[1], controls_focused, &self.state);

        // ── Path pane: input | enqueue buttons ────────────────────────────────
        let path_focused = self.focus.is_focused(Pane::PathInput);
        let block = pane_chrome("Path", path_focused, None);
        let inner = block.inner(outer[2]);
        frame.render_widget(block, outer[2]);
        self.path_area = outer[2];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(self.enqueue.width(&self.state)),
            ])
            .split(inner);
        self.path_input.draw(frame, cols[0], path_focused);
        self.enqueue.draw(frame, cols[2], path_focused, &self.state);

        let mode = if path_focused {
            InputMode::Path
        } else {
            InputMode::Control
        };
        status_bar::draw_keys_bar(frame, outer[4], mode, self.show_keys);

        // ── Transient message (topmost layer) ─────────────────────────────────
        self.message.draw(frame, area);
    }
}

/// How long the input thread blocks before checking whether the loop is gone.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Forward terminal events into the loop until its receiver is dropped.
fn forward_events<F>(tx: mpsc::Sender<AppMessage>, mut next: F)
where
    F: FnMut(Duration) -> io::Result<Option<Event>>,
{
    while !tx.is_closed() {
        match next(INPUT_POLL) {
            Ok(Some(ev)) => {
                if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("terminal input failed: {}", e);
                break;
            }
        }
    }
}

fn read_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Resolves on the next poll tick, or never when polling is off.
async fn next_tick(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{http::Uri, routing::any, Json, Router};
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyModifiers;
    use serde_json::{json, Value};

    use crate::components::controls::ControlButton;

    type Replies = HashMap<&'static str, Value>;

    /// Gateway stand-in.  Unlisted paths answer `{"status":"OK"}`; every hit
    /// is recorded.
    async fn mock_gateway(replies: Replies) -> (String, Arc<Mutex<Vec<String>>>) {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let seen = hits.clone();
        let replies = Arc::new(replies);
        let app = Router::new().route(
            "/api/*rest",
            any(move |uri: Uri| {
                let seen = seen.clone();
                let replies = replies.clone();
                async move {
                    let path = uri.path().trim_start_matches("/api").to_string();
                    seen.lock().unwrap().push(path.clone());
                    let reply = replies
                        .get(path.as_str())
                        .cloned()
                        .unwrap_or_else(|| json!({ "status": "OK" }));
                    Json(reply)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/api", addr), hits)
    }

    fn app_for(base_url: &str, message_ms: u64) -> App {
        let config = RemoteConfig {
            base_url: base_url.to_string(),
            message_duration_ms: message_ms,
            ..RemoteConfig::default()
        };
        let client = DaemonClient::new(&config.base_url, Some(Duration::from_secs(2))).unwrap();
        App::new(client, &config)
    }

    /// Receive and handle the next background message.
    async fn pump(app: &mut App) {
        let msg = tokio::time::timeout(Duration::from_secs(3), app.rx.as_mut().unwrap().recv())
            .await
            .expect("timed out waiting for a message")
            .expect("channel closed");
        app.handle_message(msg);
    }

    async fn nothing_arrives(app: &mut App) -> bool {
        tokio::time::timeout(Duration::from_millis(150), app.rx.as_mut().unwrap().recv())
            .await
            .is_err()
    }

    fn press(app: &mut App, code: event::KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        app.handle_message(AppMessage::Event(Event::Key(key)));
    }

    fn left_click(app: &mut App, rect: Rect) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: rect.x,
            row: rect.y,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_message(AppMessage::Event(Event::Mouse(mouse)));
    }

    fn draw(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }

    #[tokio::test]
    async fn test_pause_accepted() {
        let (url, hits) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 1800);

        press(&mut app, event::KeyCode::Char(' '));
        assert!(!app.state.belief.playing, "optimistic before the reply");

        pump(&mut app).await;
        assert!(!app.state.belief.playing);
        assert_eq!(app.message.text(), Some("OK"));
        assert_eq!(hits.lock().unwrap().as_slice(), ["/pause"]);
    }

    #[tokio::test]
    async fn test_pause_rejected_rolls_back() {
        let (url, _) = mock_gateway(Replies::from([(
            "/pause",
            json!({ "status": "ERR", "errmsg": "no song" }),
        )]))
        .await;
        let mut app = app_for(&url, 1800);

        press(&mut app, event::KeyCode::Char(' '));
        pump(&mut app).await;
        assert!(app.state.belief.playing);
        assert_eq!(app.message.text(), Some("no song"));
    }

    #[tokio::test]
    async fn test_unreachable_daemon_rolls_back_loop() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);
        let mut app = app_for(&url, 1800);

        press(&mut app, event::KeyCode::Char('l'));
        assert!(app.state.belief.loop_song);
        pump(&mut app).await;
        assert!(!app.state.belief.loop_song);
        assert_eq!(app.message.text(), Some("daemon unreachable"));
    }

    #[tokio::test]
    async fn test_startup_reads_status_and_ping() {
        let (url, _) = mock_gateway(Replies::from([
            (
                "/status",
                json!({ "status": "OK", "data": { "playing": false, "loop_song": true } }),
            ),
            (
                "/ping",
                json!({ "status": "OK", "data": { "daemon": "127.0.0.1:6991" } }),
            ),
        ]))
        .await;
        let mut app = app_for(&url, 1800);
        app.start();
        pump(&mut app).await;
        pump(&mut app).await;

        assert!(!app.state.belief.playing);
        assert!(app.state.belief.loop_song);
        assert!(!app.state.belief.loop_queue);
        assert_eq!(app.state.daemon, DaemonLink::Linked("127.0.0.1:6991".into()));
        assert_eq!(app.message.text(), None, "startup shows no message");
    }

    #[tokio::test]
    async fn test_typing_in_path_field_sends_nothing() {
        let (url, hits) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 1800);

        press(&mut app, event::KeyCode::Char('a'));
        assert!(app.focus.is_focused(Pane::PathInput));
        for c in " lq".chars() {
            press(&mut app, event::KeyCode::Char(c));
        }
        press(&mut app, event::KeyCode::Right);

        assert_eq!(app.path_input.text(), " lq");
        assert_eq!(app.state.belief, Default::default());
        assert!(nothing_arrives(&mut app).await);
        assert!(hits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enter_adds_song_then_escape_restores_shortcuts() {
        let (url, hits) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 1800);

        press(&mut app, event::KeyCode::Char('/'));
        for c in "/music/a.mp3".chars() {
            press(&mut app, event::KeyCode::Char(c));
        }
        press(&mut app, event::KeyCode::Enter);
        pump(&mut app).await;
        assert_eq!(app.message.text(), Some("OK"));

        press(&mut app, event::KeyCode::Esc);
        press(&mut app, event::KeyCode::Right);
        pump(&mut app).await;
        assert_eq!(hits.lock().unwrap().as_slice(), ["/queue", "/skip"]);
    }

    #[tokio::test]
    async fn test_empty_path_add_does_nothing() {
        let (url, hits) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 1800);

        app.apply(Action::SubmitPath(PathTarget::Playlist));
        assert!(nothing_arrives(&mut app).await);
        assert!(hits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_message_clears_after_duration() {
        let (url, _) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 30);

        press(&mut app, event::KeyCode::Right);
        pump(&mut app).await;
        assert_eq!(app.message.text(), Some("OK"));
        pump(&mut app).await;
        assert_eq!(app.message.text(), None);
    }

    #[tokio::test]
    async fn test_newer_message_survives_older_expiry() {
        let (url, _) = mock_gateway(Replies::from([(
            "/clear",
            json!({ "status": "ERR", "errmsg": "queue empty" }),
        )]))
        .await;
        let mut app = app_for(&url, 1800);

        app.handle_message(AppMessage::Resolved {
            ticket: None,
            outcome: CommandOutcome::Success,
        });
        app.apply(Action::Issue(ControlIntent::ClearQueue));
        pump(&mut app).await;
        assert_eq!(app.message.text(), Some("queue empty"));

        app.handle_message(AppMessage::MessageExpired(1));
        assert_eq!(app.message.text(), Some("queue empty"));
    }

    #[tokio::test]
    async fn test_click_loop_queue_button() {
        let (url, hits) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 1800);
        draw(&mut app);

        let button = app.transport.button_area(ControlButton::LoopQueue).unwrap();
        left_click(&mut app, button);
        assert!(app.state.belief.loop_queue);
        pump(&mut app).await;
        assert!(app.state.belief.loop_queue);
        assert_eq!(hits.lock().unwrap().as_slice(), ["/loop/queue"]);
    }

    #[tokio::test]
    async fn test_click_path_pane_focuses_and_button_leaves() {
        let (url, _) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 1800);
        draw(&mut app);

        let path = app.path_area;
        left_click(&mut app, Rect::new(path.x + 2, path.y + 1, 1, 1));
        assert!(app.focus.is_focused(Pane::PathInput));

        let skip = app.transport.button_area(ControlButton::Skip).unwrap();
        left_click(&mut app, skip);
        assert!(app.focus.is_focused(Pane::Controls));
        pump(&mut app).await;
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_even_in_path_field() {
        let (url, _) = mock_gateway(Replies::new()).await;
        let mut app = app_for(&url, 1800);
        press(&mut app, event::KeyCode::Tab);
        let ctrl_c = KeyEvent::new(event::KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.handle_message(AppMessage::Event(Event::Key(ctrl_c)));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_input_thread_forwards_then_stops_with_loop() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut first = Some(Event::FocusGained);
        let reader = tokio::task::spawn_blocking(move || {
            forward_events(tx, |timeout| match first.take() {
                Some(ev) => Ok(Some(ev)),
                None => {
                    std::thread::sleep(timeout);
                    Ok(None)
                }
            })
        });

        assert!(matches!(
            rx.recv().await,
            Some(AppMessage::Event(Event::FocusGained))
        ));
        // No further input arrives; dropping the receiver alone ends the thread.
        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), reader)
            .await
            .expect("input thread outlived the loop")
            .unwrap();
    }
}
