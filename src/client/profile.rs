use super::ApiClient;
use crate::types::{Acknowledgement, Result, UserProfile};
use reqwest::Method;

pub struct ProfileApi<'a> {
    pub(super) client: &'a ApiClient,
}

impl ProfileApi<'_> {
    /// The signed-in user's profile, or an empty one if none exists yet.
    pub async fn get(&self) -> Result<UserProfile> {
        let request = self.client.authorized(Method::GET, "/profiles/me")?;
        match self.client.execute(request).await {
            Err(e) if e.is_not_found() => Ok(UserProfile::default()),
            other => other,
        }
    }

    pub async fn create(&self, profile: &UserProfile) -> Result<UserProfile> {
        let request = self.client.authorized(Method::POST, "/profiles/")?.json(profile);
        self.client.execute(request).await
    }

    pub async fn update(&self, profile: &UserProfile) -> Result<UserProfile> {
        let request = self.client.authorized(Method::PUT, "/profiles/")?.json(profile);
        self.client.execute(request).await
    }

    /// Upsert: update the existing profile, creating it when the backend has none.
    pub async fn save(&self, profile: &UserProfile) -> Result<UserProfile> {
        match self.update(profile).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!("No profile to update, creating one");
                self.create(profile).await
            }
            other => other,
        }
    }

    pub async fn delete(&self) -> Result<Acknowledgement> {
        let request = self.client.authorized(Method::DELETE, "/profiles/")?;
        self.client.execute(request).await
    }
}
