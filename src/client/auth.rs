use super::ApiClient;
use crate::types::{LoginRequest, RegisterRequest, Result, TokenResponse, UserAccount};
use reqwest::Method;

/// Sign-in, sign-up and sign-out. The only operations that change the session.
pub struct AuthApi<'a> {
    pub(super) client: &'a ApiClient,
}

impl AuthApi<'_> {
    /// Exchange credentials for a token and store it in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let form = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.client.public(Method::POST, "/auth/token").form(&form);
        let token: TokenResponse = self.client.execute_or(request, Some("Login failed")).await?;

        self.client.session.sign_in(&token.access_token)?;
        tracing::info!(username, "Signed in");
        Ok(token)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<UserAccount> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.client.public(Method::POST, "/auth/register").json(&body);
        self.client
            .execute_or(request, Some("Registration failed"))
            .await
    }

    /// Forget the stored token. No backend call is made.
    pub fn logout(&self) -> Result<()> {
        self.client.session.sign_out()?;
        tracing::info!("Signed out");
        Ok(())
    }
}
