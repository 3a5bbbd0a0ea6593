use super::ApiClient;
use crate::types::{
    Acknowledgement, ChatHistory, ChatResponse, ChatSendRequest, MarkPlanRequest, Message,
    MessageRole, Plan, PlanCreate, PlanType, Result,
};
use reqwest::Method;

pub struct ChatApi<'a> {
    pub(super) client: &'a ApiClient,
}

impl ChatApi<'_> {
    /// Send a user message and receive the coach's reply.
    pub async fn send(&self, content: &str) -> Result<ChatResponse> {
        let body = ChatSendRequest {
            content: content.to_string(),
            role: MessageRole::User,
        };
        let request = self.client.authorized(Method::POST, "/chat/send")?.json(&body);
        self.client.execute(request).await
    }

    pub async fn history(&self) -> Result<Vec<Message>> {
        let request = self.client.authorized(Method::GET, "/chat/history")?;
        let history: ChatHistory = self.client.execute(request).await?;
        Ok(history.messages)
    }

    /// Flag a stored message as a plan of the given type.
    pub async fn mark_plan(&self, message_id: &str, plan_type: PlanType) -> Result<Acknowledgement> {
        let body = MarkPlanRequest {
            is_plan: true,
            plan_type,
        };
        let path = format!("/chat/message/{}/mark-plan", message_id);
        let request = self.client.authorized(Method::PUT, &path)?.json(&body);
        self.client.execute(request).await
    }

    /// Create a plan whose content is the message's text.
    pub async fn save_plan_from_message(&self, message: &Message, plan_type: PlanType) -> Result<Plan> {
        let body = PlanCreate {
            plan_type,
            content: message.content.clone(),
        };
        let request = self.client.authorized(Method::POST, "/plans/")?.json(&body);
        self.client
            .execute_or(request, Some("Failed to save plan"))
            .await
    }
}
