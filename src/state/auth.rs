use super::{Flow, Route};
use crate::client::ApiClient;

/// Username/password sign-in form.
#[derive(Debug, Default)]
pub struct LoginPage {
    pub username: String,
    pub password: String,
    error: Option<String>,
    submitting: bool,
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Sign in; on success the token is stored and the user goes to chat.
    pub async fn submit(&mut self, client: &ApiClient) -> Flow {
        if self.submitting {
            return Flow::Stay;
        }
        self.error = None;

        if self.username.trim().is_empty() || self.password.is_empty() {
            self.error = Some("Username and password are required".to_string());
            return Flow::Stay;
        }

        self.submitting = true;
        let result = client.auth().login(self.username.trim(), &self.password).await;
        self.submitting = false;

        match result {
            Ok(_) => Flow::Redirect(Route::Chat),
            Err(e) => {
                self.error = Some(e.user_message());
                Flow::Stay
            }
        }
    }
}

/// Account creation form.
#[derive(Debug, Default)]
pub struct RegisterPage {
    pub username: String,
    pub email: String,
    pub password: String,
    error: Option<String>,
    submitting: bool,
}

impl RegisterPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn validate(&self) -> Option<&'static str> {
        if self.username.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Some("Username, email and password are required");
        }
        if !self.email.contains('@') {
            return Some("Please enter a valid email address");
        }
        if self.password.chars().count() < 8 {
            return Some("Password must be at least 8 characters long");
        }
        None
    }

    /// Create the account and send the user to the login page.
    pub async fn submit(&mut self, client: &ApiClient) -> Flow {
        if self.submitting {
            return Flow::Stay;
        }
        self.error = self.validate().map(str::to_string);
        if self.error.is_some() {
            return Flow::Stay;
        }

        self.submitting = true;
        let result = client
            .auth()
            .register(self.username.trim(), self.email.trim(), &self.password)
            .await;
        self.submitting = false;

        match result {
            Ok(_) => Flow::Redirect(Route::Login),
            Err(e) => {
                self.error = Some(e.user_message());
                Flow::Stay
            }
        }
    }
}
