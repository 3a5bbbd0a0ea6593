use super::{Flow, Load, Mutation, require_session};
use crate::client::ApiClient;
use crate::types::{AppError, Result, UserProfile};
use std::time::Duration;

/// Field names accepted by [`ProfilePage::set_field`].
pub const PROFILE_FIELDS: [&str; 9] = [
    "height",
    "weight",
    "age",
    "fitness_level",
    "fitness_goal",
    "dietary_preferences",
    "workout_preferences",
    "available_equipment",
    "health_conditions",
];

/// Fitness profile form. Saving is an upsert.
#[derive(Debug)]
pub struct ProfilePage {
    loaded: Load<()>,
    form: UserProfile,
    save: Mutation,
}

impl Default for ProfilePage {
    fn default() -> Self {
        Self::new(super::BANNER_DURATION)
    }
}

impl ProfilePage {
    pub fn new(banner_duration: Duration) -> Self {
        Self {
            loaded: Load::Loading,
            form: UserProfile::default(),
            save: Mutation::new(banner_duration),
        }
    }

    pub fn loaded(&self) -> &Load<()> {
        &self.loaded
    }

    pub fn form(&self) -> &UserProfile {
        &self.form
    }

    pub fn save_state(&self) -> &Mutation {
        &self.save
    }

    /// Load the profile. A user without one gets an empty form.
    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        match client.profile().get().await {
            Ok(profile) => {
                self.form = profile;
                self.loaded = Load::Ready(());
            }
            Err(e) => self.loaded = Load::Failed(e.user_message()),
        }
        Flow::Stay
    }

    /// Set one form field from text. An empty value clears the field.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        let text = (!value.is_empty()).then(|| value.to_string());

        match key {
            "height" => self.form.height = parse_number(key, value)?,
            "weight" => self.form.weight = parse_number(key, value)?,
            "age" => self.form.age = parse_number(key, value)?,
            "fitness_level" => {
                self.form.fitness_level = text.as_deref().map(str::parse).transpose()?
            }
            "fitness_goal" => {
                self.form.fitness_goal = text.as_deref().map(str::parse).transpose()?
            }
            "dietary_preferences" => self.form.dietary_preferences = text,
            "workout_preferences" => self.form.workout_preferences = text,
            "available_equipment" => self.form.available_equipment = text,
            "health_conditions" => self.form.health_conditions = text,
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Unknown profile field '{}'. Expected one of: {}",
                    other,
                    PROFILE_FIELDS.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub async fn save(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.save.begin().is_err() {
            return Flow::Stay;
        }

        let result = client.profile().save(&self.form).await;
        self.save.settle(&result, "Fitness profile updated successfully");
        if let Ok(saved) = result {
            self.form = saved;
        }
        Flow::Stay
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<Option<T>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid number for {}", value, key)))
}
