//! Turn dispatcher shared by every host.
//!
//! Holds the active flow for one user and routes each turn either to the
//! flow engine or to the interpreter. Turns are processed one at a time
//! (`&mut self`), so no two commits of a session overlap.

use pocketpilot_core::{UserId, is_exit};
use tracing::{info, warn};

use crate::assistant::Assistant;
use crate::flows::{FlowKind, FlowState, start_flow};
use crate::suggestions::suggestions;

/// Shown when a collaborator error carries no text.
const FALLBACK_ERROR: &str = "I ran into an issue handling that request.";

/// Everything a host needs to render after one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    pub messages: Vec<String>,
    pub suggestions: Vec<String>,
    /// The user asked the assistant to go away
    pub closed: bool,
    /// Collaborator failure text, also present in `messages`
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    assistant: Assistant,
    user: UserId,
    flow: Option<FlowState>,
}

impl Session {
    pub fn new(assistant: Assistant, user: UserId) -> Self {
        Self {
            assistant,
            user,
            flow: None,
        }
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn active_flow(&self) -> Option<FlowKind> {
        self.flow.as_ref().map(FlowState::kind)
    }

    pub fn flow_state(&self) -> Option<&FlowState> {
        self.flow.as_ref()
    }

    pub fn suggestions(&self) -> Vec<String> {
        suggestions(self.flow.as_ref())
    }

    /// Start a flow directly (quick actions), replacing any active one.
    pub fn start_flow(&mut self, kind: FlowKind) -> Vec<String> {
        if self.user.is_anonymous() {
            return vec!["Sign in to start that task.".to_string()];
        }
        let init = start_flow(kind);
        info!(user = %self.user, flow = %kind, "flow started");
        self.flow = Some(init.state);
        vec![init.intro]
    }

    pub async fn submit(&mut self, text: &str) -> Turn {
        let text = text.trim();
        if text.is_empty() {
            return self.turn(Vec::new());
        }

        if is_exit(text) || (self.flow.is_none() && text.eq_ignore_ascii_case("no")) {
            let message = match self.flow.take() {
                Some(state) => {
                    info!(user = %self.user, flow = %state.kind(), step = state.step_name(), "flow cancelled");
                    "No problem, cancelling that."
                }
                None => "Understood. I'll hide for now.",
            };
            return Turn {
                closed: true,
                ..self.turn(vec![message.to_string()])
            };
        }

        match self.dispatch(text).await {
            Ok(messages) => self.turn(messages),
            Err(err) => {
                let text = err.to_string();
                let text = if text.trim().is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    text
                };
                if let Some(state) = self.flow.take() {
                    warn!(user = %self.user, flow = %state.kind(), error = %text, "flow discarded after error");
                } else {
                    warn!(user = %self.user, error = %text, "command failed");
                }
                Turn {
                    error: Some(text.clone()),
                    ..self.turn(vec![text])
                }
            }
        }
    }

    async fn dispatch(&mut self, text: &str) -> anyhow::Result<Vec<String>> {
        if let Some(state) = self.flow.clone() {
            let result = self.assistant.advance_flow(&self.user, state, text).await?;
            self.flow = result.next_state;
            return Ok(result.messages);
        }

        let command = self.assistant.interpret(&self.user, text).await?;
        let mut messages = vec![command.message];
        let Some(kind) = command.start_flow else {
            return Ok(messages);
        };

        let init = start_flow(kind);
        info!(user = %self.user, flow = %kind, "flow started by command");
        match command.flow_input {
            Some(input) => {
                self.flow = Some(init.state.clone());
                let result = self.assistant.advance_flow(&self.user, init.state, &input).await?;
                self.flow = result.next_state;
                messages.extend(result.messages);
            }
            None => {
                self.flow = Some(init.state);
                messages.push(init.intro);
            }
        }
        Ok(messages)
    }

    fn turn(&self, messages: Vec<String>) -> Turn {
        Turn {
            messages,
            suggestions: self.suggestions(),
            closed: false,
            error: None,
        }
    }
}
