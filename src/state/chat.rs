use super::{Flow, Mutation, require_session};
use crate::client::ApiClient;
use crate::types::{GREETING, Message, MessageRole, PlanType, SEND_FAILURE_REPLY};
use std::time::Duration;

/// Conversation with the coach.
///
/// Sending is optimistic: the user's message is shown at once, and after the
/// backend answers the whole list is replaced by the re-fetched history.
#[derive(Debug)]
pub struct ChatPage {
    messages: Vec<Message>,
    loading_history: bool,
    sending: bool,
    /// Text in the input box
    pub draft: String,
    save_plan: Mutation,
}

impl Default for ChatPage {
    fn default() -> Self {
        Self::new(super::BANNER_DURATION)
    }
}

impl ChatPage {
    pub fn new(banner_duration: Duration) -> Self {
        Self {
            messages: Vec::new(),
            loading_history: true,
            sending: false,
            draft: String::new(),
            save_plan: Mutation::new(banner_duration),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading_history(&self) -> bool {
        self.loading_history
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// State of the save-as-plan action.
    pub fn save_plan_state(&self) -> &Mutation {
        &self.save_plan
    }

    pub fn save_plan_state_mut(&mut self) -> &mut Mutation {
        &mut self.save_plan
    }

    /// Load the history; an empty or unavailable history shows the greeting.
    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }

        self.loading_history = true;
        self.messages = match client.chat().history().await {
            Ok(history) if !history.is_empty() => history,
            Ok(_) => vec![Message::assistant(GREETING)],
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load chat history");
                vec![Message::assistant(GREETING)]
            }
        };
        self.loading_history = false;
        Flow::Stay
    }

    /// Send the draft. Blank drafts are ignored.
    pub async fn send(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.draft.trim().is_empty() || self.sending {
            return Flow::Stay;
        }

        let content = std::mem::take(&mut self.draft);
        self.messages.push(Message::user(content.clone()));
        self.sending = true;

        match client.chat().send(&content).await {
            Ok(reply) => match client.chat().history().await {
                Ok(history) => self.messages = history,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to refresh chat history after send");
                    self.messages.push(Message {
                        id: reply.message_id,
                        role: MessageRole::Assistant,
                        content: reply.response,
                        timestamp: reply.timestamp,
                        is_plan: false,
                        plan_type: None,
                        user_id: None,
                    });
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send chat message");
                self.messages.push(Message::assistant(SEND_FAILURE_REPLY));
            }
        }

        self.sending = false;
        Flow::Stay
    }

    /// Store the message's text as a plan and flag the message locally.
    pub async fn save_as_plan(
        &mut self,
        client: &ApiClient,
        message_id: &str,
        plan_type: PlanType,
    ) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        let Some(message) = self.messages.iter().find(|m| m.id == message_id).cloned() else {
            self.save_plan.fail("Message not found");
            return Flow::Stay;
        };
        if !matches!(plan_type, PlanType::Workout | PlanType::Diet) {
            self.save_plan
                .fail("Chat messages can only be saved as workout or diet plans");
            return Flow::Stay;
        }
        if self.save_plan.begin().is_err() {
            return Flow::Stay;
        }

        match client.chat().save_plan_from_message(&message, plan_type).await {
            Ok(_) => {
                if let Some(local) = self.messages.iter_mut().find(|m| m.id == message_id) {
                    local.is_plan = true;
                    local.plan_type = Some(plan_type);
                }
                // Local copies were never stored, so there is nothing to flag upstream.
                if !message.is_local() {
                    if let Err(e) = client.chat().mark_plan(message_id, plan_type).await {
                        tracing::warn!(error = %e, message_id, "Failed to mark message as plan");
                    }
                }
                self.save_plan
                    .succeed(format!("Successfully saved as {} plan!", plan_type));
            }
            Err(e) => self.save_plan.fail(e.user_message()),
        }
        Flow::Stay
    }
}
