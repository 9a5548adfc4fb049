// Voice agent sessions.
//
// The conversational service is reached through `AgentTransport`. Starting a
// session returns a `VoiceSession` handle owned by the caller; the system
// prompt override is fixed at start, so switching charts means ending one
// handle and starting another.
use crate::config::AgentSettings;
use crate::error::{Error, Result};
use crate::metadata::ChartMetadata;
use crate::prompt::{build_voice_prompt, PromptComposer};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub agent_id: String,
    /// Replaces the agent's configured system prompt for this session.
    pub prompt_override: Option<String>,
}

/// A live conversation on the transport side.
pub trait Conversation {
    fn end(&mut self) -> Result<()>;
}

pub trait AgentTransport {
    fn start(&self, request: &SessionRequest) -> Result<Box<dyn Conversation>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Speaking,
    Listening,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub connected: bool,
    pub speaking: bool,
    pub listening: bool,
    pub error: Option<String>,
}

pub struct VoiceSession {
    request: SessionRequest,
    conversation: Option<Box<dyn Conversation>>,
    state: SessionState,
}

impl VoiceSession {
    pub fn start(
        transport: &dyn AgentTransport,
        agent_id: &str,
        prompt_override: Option<String>,
    ) -> Result<Self> {
        if agent_id.trim().is_empty() {
            return Err(Error::Session("no agent id configured".to_string()));
        }
        let request = SessionRequest {
            agent_id: agent_id.to_string(),
            prompt_override,
        };
        let conversation = transport.start(&request)?;
        info!(
            agent_id,
            with_prompt = request.prompt_override.is_some(),
            "voice session started"
        );
        Ok(Self {
            request,
            conversation: Some(conversation),
            state: SessionState::default(),
        })
    }

    /// Starts a session briefed on one chart.
    pub fn start_for_chart(
        transport: &dyn AgentTransport,
        settings: &AgentSettings,
        widget: &ChartMetadata,
        indicator_title: Option<&str>,
    ) -> Result<Self> {
        let composer = PromptComposer::new(settings);
        let prompt = build_voice_prompt(widget, indicator_title, &composer);
        Self::start(transport, &settings.agent_id, Some(prompt))
    }

    pub fn request(&self) -> &SessionRequest {
        &self.request
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn on_connect(&mut self) {
        self.state.connected = true;
    }

    pub fn on_disconnect(&mut self) {
        self.state.connected = false;
        self.state.speaking = false;
        self.state.listening = false;
    }

    pub fn on_mode_change(&mut self, mode: Mode) {
        self.state.speaking = mode == Mode::Speaking;
        self.state.listening = mode == Mode::Listening;
    }

    pub fn on_error(&mut self, message: &str) {
        warn!(message, "voice session error");
        self.state.error = Some(message.to_string());
    }

    /// Ends the conversation and consumes the handle.
    pub fn end(mut self) -> Result<()> {
        self.close()
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut conversation) = self.conversation.take() else {
            return Ok(());
        };
        self.on_disconnect();
        conversation.end()?;
        info!(agent_id = %self.request.agent_id, "voice session ended");
        Ok(())
    }
}

impl Drop for VoiceSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to end voice session on drop");
        }
    }
}
