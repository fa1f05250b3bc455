//! Connection session state.
//!
//! `App` owns everything the event loop mutates: connection state, the
//! outbound queue, the transcript, the waiting display and the indicator
//! manager. Side effects go through [`HostOps`], and every timer-driven
//! method takes an explicit `now`.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use agent_chat::artifacts::media_type_for;
use agent_chat::config::EnvConfig;
use agent_chat::{
    documentation_error, render_documentation, Clock, DiagramContainers, FilePreview,
    GfmMarkdown, IndicatorChange, IndicatorManager, IndicatorTimings, LocalClock,
    MarkdownConverter, MessageRenderer, PreviewKind, PreviewRequest, RenderedMessage, Scheduler,
    TimerId,
};
use chat_protocol::{InboundEvent, OutboundMessage};
use chat_transport::config::{DEFAULT_RECONNECT_DELAY, DEFAULT_RESET_DELAY};
use chat_transport::{TransportEvent, TransportEventKind};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::commands::{parse_slash_command, SlashCommand};

const HELP_TEXT: &str =
    "Commands: /help, /reset, /docs, /preview <file_id> [type], /quit";
pub const QUEUED_NOTICE: &str = "Message queued. Waiting for connection...";
pub const THINKING_LABEL: &str = "Thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Open => "Connected",
            Self::Closed => "Disconnected",
            Self::Errored => "Connection Error",
        }
    }

    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// "Agent is working" display shown between a send and the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingState {
    pub agent: String,
    pub label: String,
}

/// Preview or documentation modal contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Queued,
    Ignored,
}

/// Result of a fetch the app asked the host to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    FileText {
        file_id: String,
        result: Result<String, String>,
    },
    Documentation(Result<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub default_agent: String,
    pub reconnect_delay: Duration,
    pub reset_delay: Duration,
    pub indicator_timings: IndicatorTimings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_agent: agent_chat::config::DEFAULT_AGENT.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            reset_delay: DEFAULT_RESET_DELAY,
            indicator_timings: IndicatorTimings::default(),
        }
    }
}

impl From<&EnvConfig> for AppConfig {
    fn from(config: &EnvConfig) -> Self {
        Self {
            default_agent: config.default_agent.clone(),
            ..Self::default()
        }
    }
}

pub trait HostOps {
    /// Opens the session channel for `session_id`. Progress arrives later as
    /// transport events tagged with the same id.
    fn connect(&mut self, session_id: &str) -> Result<(), String>;
    fn send(&mut self, message: &OutboundMessage) -> Result<(), String>;
    fn close(&mut self);
    fn fetch_file_text(&mut self, file_id: &str);
    fn fetch_documentation(&mut self);
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionTimer {
    Reconnect { session_id: String },
}

pub fn new_session_id() -> String {
    format!("session_{}", Uuid::new_v4().simple())
}

pub struct App<C = GfmMarkdown, K = LocalClock> {
    pub connection: ConnectionState,
    pub transcript: Vec<RenderedMessage>,
    pub waiting: Option<WaitingState>,
    pub current_agent: String,
    pub has_started_conversation: bool,
    pub modal: Option<Modal>,
    pub should_exit: bool,
    session_id: String,
    queue: VecDeque<OutboundMessage>,
    indicators: IndicatorManager,
    timers: Scheduler<SessionTimer>,
    reconnect: Option<TimerId>,
    renderer: MessageRenderer<C, K>,
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self::with_renderer(config, MessageRenderer::default())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl<C, K> App<C, K>
where
    C: MarkdownConverter,
    K: Clock,
{
    pub fn with_renderer(config: AppConfig, renderer: MessageRenderer<C, K>) -> Self {
        Self {
            connection: ConnectionState::Closed,
            transcript: Vec::new(),
            waiting: None,
            current_agent: config.default_agent.clone(),
            has_started_conversation: false,
            modal: None,
            should_exit: false,
            session_id: new_session_id(),
            queue: VecDeque::new(),
            indicators: IndicatorManager::new(config.indicator_timings),
            timers: Scheduler::new(),
            reconnect: None,
            renderer,
            config,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Messages waiting for the channel to open, oldest first.
    pub fn queued(&self) -> impl Iterator<Item = &OutboundMessage> {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn indicators(&self) -> &IndicatorManager {
        &self.indicators
    }

    pub fn drain_indicator_changes(&mut self) -> Vec<IndicatorChange> {
        self.indicators.drain_changes()
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect
            .is_some_and(|timer| self.timers.is_pending(timer))
    }

    /// Earliest instant at which [`App::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.timers.next_deadline(), self.indicators.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Opens the first connection.
    pub fn start(&mut self, now: Instant, host: &mut dyn HostOps) {
        self.begin_connect(now, host);
    }

    pub fn tick(&mut self, now: Instant, host: &mut dyn HostOps) {
        for (timer, action) in self.timers.pop_due(now) {
            match action {
                SessionTimer::Reconnect { session_id } => {
                    if self.reconnect == Some(timer) {
                        self.reconnect = None;
                    }
                    if session_id != self.session_id {
                        debug!(%session_id, "dropping reconnect for a replaced session");
                        continue;
                    }
                    if matches!(
                        self.connection,
                        ConnectionState::Open | ConnectionState::Connecting
                    ) {
                        continue;
                    }
                    self.begin_connect(now, host);
                }
            }
        }
        self.indicators.tick(now);
        host.request_render();
    }

    pub fn on_submit(&mut self, input: &str, now: Instant, host: &mut dyn HostOps) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }

        let Some(command) = parse_slash_command(text) else {
            self.send_user_message(text, host);
            return;
        };

        match command {
            SlashCommand::Help => {
                self.push_system(HELP_TEXT);
                host.request_render();
            }
            SlashCommand::Reset => self.reset(now, host),
            SlashCommand::Quit => self.on_quit(host),
            SlashCommand::Docs => {
                host.fetch_documentation();
            }
            SlashCommand::Preview {
                file_id,
                media_type,
            } => self.open_preview(&file_id, media_type.as_deref(), host),
            SlashCommand::Unknown(command) => {
                self.push_system(&format!("Unknown command: {command}"));
                host.request_render();
            }
        }
    }

    /// Sends `text` if the channel is open, otherwise queues it and posts a
    /// local notice.
    pub fn send_user_message(&mut self, text: &str, host: &mut dyn HostOps) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }
        let message = OutboundMessage::chat(text);

        if !self.connection.accepts_input() {
            self.queue.push_back(message);
            self.push_system(QUEUED_NOTICE);
            host.request_render();
            return SendOutcome::Queued;
        }

        let outcome = match self.send_now(&message, host) {
            Ok(()) => SendOutcome::Sent,
            Err(error) => {
                warn!("send_error: {error}");
                self.queue.push_back(message);
                self.push_system(QUEUED_NOTICE);
                SendOutcome::Queued
            }
        };
        host.request_render();
        outcome
    }

    pub fn on_transport_event(
        &mut self,
        event: TransportEvent,
        now: Instant,
        host: &mut dyn HostOps,
    ) {
        if event.session_id != self.session_id {
            debug!(
                session_id = %event.session_id,
                current = %self.session_id,
                "dropping event for a replaced session"
            );
            return;
        }

        match event.kind {
            TransportEventKind::Opened => self.on_opened(host),
            TransportEventKind::Message(text) => self.on_frame(&text, now),
            TransportEventKind::Errored(error) => self.on_errored(&error),
            TransportEventKind::Closed => self.on_closed(now),
        }
        host.request_render();
    }

    /// Applies one decoded inbound event.
    pub fn dispatch(&mut self, event: InboundEvent, now: Instant) {
        match event {
            InboundEvent::System { content } => {
                let message = self.renderer.render_system(&content);
                self.transcript.push(message);
            }
            InboundEvent::UserMessage { content } => {
                let message = self.renderer.render_user(&content);
                self.transcript.push(message);
            }
            InboundEvent::AgentMessage {
                agent,
                content,
                files,
                widgets,
            } => {
                self.set_current_agent(&agent);
                let message = self
                    .renderer
                    .render_agent(&agent, &content, &files, &widgets);
                if let Some(agent) = message.completes_agent() {
                    self.indicators.clear_for_agent(agent, now);
                }
                self.transcript.push(message);
                self.waiting = None;
            }
            InboundEvent::ToolStart { agent, tool } => {
                self.set_current_agent(&agent);
                self.indicators.start(&agent, &tool);
            }
            InboundEvent::ToolComplete { agent, tool } => {
                self.indicators.complete(&agent, &tool, now);
            }
            InboundEvent::AgentWorking { agent, content } => {
                self.set_current_agent(&agent);
                let label = if content.trim().is_empty() {
                    THINKING_LABEL.to_string()
                } else {
                    content
                };
                self.waiting = Some(WaitingState {
                    agent: self.current_agent.clone(),
                    label,
                });
            }
            InboundEvent::Error { content } => {
                let message = self.renderer.render_error(&content);
                self.transcript.push(message);
                self.waiting = None;
            }
            InboundEvent::Unknown { event_type, .. } => {
                warn!(%event_type, "unknown inbound event type");
            }
        }
    }

    pub fn on_fetch(&mut self, outcome: FetchOutcome, host: &mut dyn HostOps) {
        match outcome {
            FetchOutcome::FileText { file_id, result } => {
                let preview = match result {
                    Ok(text) => FilePreview::table(&file_id, &text),
                    Err(error) => {
                        warn!(%file_id, "preview_fetch_error: {error}");
                        FilePreview::failed(&file_id, PreviewKind::Tabular)
                    }
                };
                self.show_preview(&preview);
            }
            FetchOutcome::Documentation(result) => {
                let html = match result {
                    Ok(markdown) => {
                        let converter = self.renderer.converter();
                        render_documentation(&markdown, converter, &DiagramContainers).html
                    }
                    Err(error) => {
                        warn!("documentation_fetch_error: {error}");
                        documentation_error(&error)
                    }
                };
                self.modal = Some(Modal {
                    title: "Architecture".to_string(),
                    html,
                });
            }
        }
        host.request_render();
    }

    /// Starts a fresh conversation under a new session id.
    pub fn reset(&mut self, now: Instant, host: &mut dyn HostOps) {
        info!(old_session = %self.session_id, "resetting session");
        self.cancel_reconnect();
        self.queue.clear();
        self.indicators.clear_all();
        self.transcript.clear();
        self.waiting = None;
        self.modal = None;
        self.has_started_conversation = false;
        self.current_agent = self.config.default_agent.clone();

        host.close();
        self.connection = ConnectionState::Closed;
        self.session_id = new_session_id();
        self.schedule_reconnect(now + self.config.reset_delay);
        host.request_render();
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        self.should_exit = true;
        self.cancel_reconnect();
        host.close();
        host.request_stop();
        host.request_render();
    }

    fn begin_connect(&mut self, now: Instant, host: &mut dyn HostOps) {
        self.connection = ConnectionState::Connecting;
        if let Err(error) = host.connect(&self.session_id) {
            warn!(session_id = %self.session_id, "connect_error: {error}");
            self.on_errored(&error);
            self.on_closed(now);
        }
    }

    fn on_opened(&mut self, host: &mut dyn HostOps) {
        info!(session_id = %self.session_id, "connected");
        self.connection = ConnectionState::Open;
        self.cancel_reconnect();
        self.flush_queue(host);
    }

    fn flush_queue(&mut self, host: &mut dyn HostOps) {
        while let Some(message) = self.queue.pop_front() {
            if let Err(error) = self.send_now(&message, host) {
                warn!("send_error while flushing queue: {error}");
                self.queue.push_front(message);
                break;
            }
        }
    }

    fn on_frame(&mut self, text: &str, now: Instant) {
        match InboundEvent::parse(text) {
            Ok(event) => self.dispatch(event, now),
            Err(error) => warn!("ignoring undecodable frame: {error}"),
        }
    }

    fn on_errored(&mut self, error: &str) {
        warn!(session_id = %self.session_id, "connection error: {error}");
        self.connection = ConnectionState::Errored;
        self.waiting = None;
    }

    fn on_closed(&mut self, now: Instant) {
        self.connection = ConnectionState::Closed;
        self.waiting = None;
        self.schedule_reconnect(now + self.config.reconnect_delay);
    }

    fn schedule_reconnect(&mut self, at: Instant) {
        self.cancel_reconnect();
        info!(session_id = %self.session_id, "reconnect scheduled");
        let timer = self.timers.schedule(
            at,
            SessionTimer::Reconnect {
                session_id: self.session_id.clone(),
            },
        );
        self.reconnect = Some(timer);
    }

    fn cancel_reconnect(&mut self) {
        if let Some(timer) = self.reconnect.take() {
            self.timers.cancel(timer);
        }
    }

    fn send_now(
        &mut self,
        message: &OutboundMessage,
        host: &mut dyn HostOps,
    ) -> Result<(), String> {
        host.send(message)?;
        self.has_started_conversation = true;
        self.waiting = Some(WaitingState {
            agent: self.current_agent.clone(),
            label: THINKING_LABEL.to_string(),
        });
        Ok(())
    }

    fn open_preview(&mut self, file_id: &str, media_type: Option<&str>, host: &mut dyn HostOps) {
        let media_type = media_type
            .map(str::to_string)
            .unwrap_or_else(|| media_type_for(file_id));
        match FilePreview::request(file_id, &media_type) {
            PreviewRequest::FetchText => host.fetch_file_text(file_id),
            PreviewRequest::Ready(preview) => {
                self.show_preview(&preview);
                host.request_render();
            }
        }
    }

    fn show_preview(&mut self, preview: &FilePreview) {
        self.modal = Some(Modal {
            title: preview.title(),
            html: preview.to_html(),
        });
    }

    fn set_current_agent(&mut self, agent: &str) {
        if !agent.trim().is_empty() {
            self.current_agent = agent.to_string();
        }
    }

    fn push_system(&mut self, text: &str) {
        let message = self.renderer.render_system(text);
        self.transcript.push(message);
    }
}
