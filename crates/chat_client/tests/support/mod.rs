#![allow(dead_code)]

use agent_chat::render::FixedClock;
use agent_chat::{GfmMarkdown, MessageRenderer};
use chat_client::app::{App, AppConfig, HostOps};
use chat_protocol::OutboundMessage;
use chat_transport::{TransportEvent, TransportEventKind};
use time::OffsetDateTime;

pub type TestApp = App<GfmMarkdown, FixedClock>;

#[derive(Default)]
pub struct HostSpy {
    pub connects: Vec<String>,
    pub sent: Vec<OutboundMessage>,
    pub close_calls: usize,
    pub file_fetches: Vec<String>,
    pub documentation_fetches: usize,
    pub render_requests: usize,
    pub stop_requests: usize,
    pub fail_sends: bool,
    pub fail_connect: Option<String>,
}

impl HostSpy {
    pub fn sent_contents(&self) -> Vec<&str> {
        self.sent.iter().map(OutboundMessage::content).collect()
    }
}

impl HostOps for HostSpy {
    fn connect(&mut self, session_id: &str) -> Result<(), String> {
        self.connects.push(session_id.to_string());
        match &self.fail_connect {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn send(&mut self, message: &OutboundMessage) -> Result<(), String> {
        if self.fail_sends {
            return Err("connection is closed".to_string());
        }
        self.sent.push(message.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.close_calls += 1;
    }

    fn fetch_file_text(&mut self, file_id: &str) {
        self.file_fetches.push(file_id.to_string());
    }

    fn fetch_documentation(&mut self) {
        self.documentation_fetches += 1;
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn request_stop(&mut self) {
        self.stop_requests += 1;
    }
}

pub fn test_app() -> TestApp {
    let at = OffsetDateTime::from_unix_timestamp(10 * 3600 + 15 * 60).expect("valid timestamp");
    App::with_renderer(
        AppConfig::default(),
        MessageRenderer::new(GfmMarkdown, FixedClock(at)),
    )
}

pub fn event(app: &TestApp, kind: TransportEventKind) -> TransportEvent {
    TransportEvent::new(app.session_id(), kind)
}

pub fn frame(app: &TestApp, json: &str) -> TransportEvent {
    event(app, TransportEventKind::Message(json.to_string()))
}
