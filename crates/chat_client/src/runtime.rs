//! Single-threaded event loop.
//!
//! One `select!` drives transport events, stdin lines, fetch results and the
//! earliest pending timer. Nothing here runs concurrently with `App`; spawned
//! tasks only report back through channels.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Instant;

use agent_chat::config::EnvConfig;
use agent_chat::{Clock, IndicatorChange, IndicatorHandle, MarkdownConverter};
use chat_protocol::OutboundMessage;
use chat_transport::{
    ArtifactFetcher, ChatSocket, TransportConfig, TransportError, TransportEvent,
};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::{App, AppConfig, ConnectionState, FetchOutcome, HostOps, Modal, WaitingState};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Host side effects backed by the real transport.
pub struct RuntimeHost {
    base_url: String,
    socket: Option<ChatSocket>,
    fetcher: ArtifactFetcher,
    events: mpsc::UnboundedSender<TransportEvent>,
    fetches: mpsc::UnboundedSender<FetchOutcome>,
    render_requested: bool,
    stop_requested: bool,
}

impl RuntimeHost {
    pub fn new(
        config: TransportConfig,
        events: mpsc::UnboundedSender<TransportEvent>,
        fetches: mpsc::UnboundedSender<FetchOutcome>,
    ) -> Result<Self, TransportError> {
        let base_url = config.base_url.clone();
        let fetcher = ArtifactFetcher::new(config)?;
        Ok(Self {
            base_url,
            socket: None,
            fetcher,
            events,
            fetches,
            render_requested: false,
            stop_requested: false,
        })
    }

    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

impl HostOps for RuntimeHost {
    fn connect(&mut self, session_id: &str) -> Result<(), String> {
        if let Some(previous) = self.socket.take() {
            previous.close();
        }
        let socket = ChatSocket::connect(&self.base_url, session_id, self.events.clone())
            .map_err(|error| error.to_string())?;
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&mut self, message: &OutboundMessage) -> Result<(), String> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(TransportError::ChannelClosed.to_string());
        };
        socket.send(message).map_err(|error| error.to_string())
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            debug!(session_id = %socket.session_id(), "closing channel");
            socket.close();
        }
    }

    fn fetch_file_text(&mut self, file_id: &str) {
        let fetcher = self.fetcher.clone();
        let fetches = self.fetches.clone();
        let file_id = file_id.to_string();
        tokio::spawn(async move {
            let result = fetcher
                .fetch_text(&file_id)
                .await
                .map_err(|error| error.to_string());
            let _ = fetches.send(FetchOutcome::FileText { file_id, result });
        });
    }

    fn fetch_documentation(&mut self) {
        let fetcher = self.fetcher.clone();
        let fetches = self.fetches.clone();
        tokio::spawn(async move {
            let result = fetcher
                .fetch_documentation()
                .await
                .map_err(|error| error.to_string());
            let _ = fetches.send(FetchOutcome::Documentation(result));
        });
    }

    fn request_render(&mut self) {
        self.render_requested = true;
    }

    fn request_stop(&mut self) {
        self.stop_requested = true;
    }
}

/// Writes new transcript entries and status changes to stdout.
#[derive(Default)]
struct Printer {
    printed: usize,
    session_id: String,
    status: Option<ConnectionState>,
    waiting: Option<WaitingState>,
    modal: Option<Modal>,
    indicators: HashMap<IndicatorHandle, String>,
}

impl Printer {
    fn flush<C, K>(&mut self, app: &mut App<C, K>, out: &mut impl Write) -> io::Result<()>
    where
        C: MarkdownConverter,
        K: Clock,
    {
        if self.session_id != app.session_id() || app.transcript.len() < self.printed {
            self.session_id = app.session_id().to_string();
            self.printed = 0;
        }

        if self.status != Some(app.connection) {
            self.status = Some(app.connection);
            writeln!(out, "[status] {}", app.connection.status_text())?;
        }

        for message in &app.transcript[self.printed..] {
            writeln!(out, "{}", message.html)?;
        }
        self.printed = app.transcript.len();

        for change in app.drain_indicator_changes() {
            match change {
                IndicatorChange::Shown(view) => {
                    writeln!(out, "[tool] {} {} ({})", view.icon, view.label, view.key.agent)?;
                    self.indicators.insert(view.handle, view.label);
                }
                IndicatorChange::Fading(_) => {}
                IndicatorChange::Removed(handle) => {
                    if let Some(label) = self.indicators.remove(&handle) {
                        writeln!(out, "[tool] done: {label}")?;
                    }
                }
            }
        }

        if self.waiting != app.waiting {
            if let Some(waiting) = &app.waiting {
                writeln!(out, "[{}] {}", waiting.agent, waiting.label)?;
            }
            self.waiting = app.waiting.clone();
        }

        if self.modal != app.modal {
            if let Some(modal) = &app.modal {
                writeln!(out, "[{}]\n{}", modal.title, modal.html)?;
            }
            self.modal = app.modal.clone();
        }

        out.flush()
    }
}

/// Runs the client until `/quit` or end of input.
pub async fn run(config: EnvConfig) -> Result<(), RuntimeError> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel();
    let transport = TransportConfig::new(config.base_url.clone());
    let mut host = RuntimeHost::new(transport.clone(), events_tx, fetch_tx)?;

    let app_config = AppConfig {
        reconnect_delay: transport.reconnect_delay,
        reset_delay: transport.reset_delay,
        ..AppConfig::from(&config)
    };
    let renderer = agent_chat::MessageRenderer::default().with_debug_render(config.debug_render);
    let mut app = App::with_renderer(app_config, renderer);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut printer = Printer::default();

    info!(base_url = %config.base_url, "starting agent chat");
    app.start(Instant::now(), &mut host);
    printer.flush(&mut app, &mut stdout)?;

    loop {
        if host.take_render_request() {
            printer.flush(&mut app, &mut stdout)?;
        }
        if app.should_exit || host.stop_requested() {
            break;
        }

        let deadline = app.next_deadline();
        let timer = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            Some(event) = events_rx.recv() => {
                app.on_transport_event(event, Instant::now(), &mut host);
            }
            Some(outcome) = fetch_rx.recv() => {
                app.on_fetch(outcome, &mut host);
            }
            line = lines.next_line() => match line? {
                Some(line) => app.on_submit(&line, Instant::now(), &mut host),
                None => app.on_quit(&mut host),
            },
            () = timer => {
                app.tick(Instant::now(), &mut host);
            }
        }
    }

    host.close();
    printer.flush(&mut app, &mut stdout)?;
    Ok(())
}
