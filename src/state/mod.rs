//! Page state controllers
//!
//! Each page owns its local state and talks to the backend only through
//! [`ApiClient`](crate::client::ApiClient). Two lifecycles recur everywhere:
//!
//! - [`Load`]: `Loading → Ready(data) | Failed(message)` for mount-time fetches
//! - [`Mutation`]: `Idle → InFlight → Done(banner)`, back to `Idle` once the
//!   banner has been visible for its duration
//!
//! A protected page checks the session before anything else and answers
//! [`Flow::Redirect`]`(`[`Route::Login`]`)` without calling the backend when
//! no token is present.
//!
//! Banner expiry is driven by [`Mutation::tick`] with an explicit instant, so
//! callers decide when time advances.

mod auth;
mod chat;
mod plans;
mod profile;
mod progress;

pub use auth::{LoginPage, RegisterPage};
pub use chat::ChatPage;
pub use plans::{
    ExerciseItem, MealItem, PlanComposer, PlanDetailPage, PlanEditor, PlanTab, PlansPage,
    quick_plan_content,
};
pub use profile::{PROFILE_FIELDS, ProfilePage};
pub use progress::{
    AnalysisPage, ChangeTone, METRICS, Metric, MetricCategory, ProgressDetailPage, ProgressForm,
    ProgressPage, TREND_RANGES, TrendsView, change_tone, format_change, metric,
};

use crate::session::Session;
use crate::types::{AppError, Result};
use std::time::{Duration, Instant};

/// Default banner display time.
pub const BANNER_DURATION: Duration = Duration::from_millis(3000);

/// Pages a controller can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Chat,
    Plans,
    Plan(i64),
    Profile,
    Progress,
}

/// What the caller should do after a controller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Stay,
    Redirect(Route),
}

impl Flow {
    pub fn is_redirect_to_login(&self) -> bool {
        matches!(self, Flow::Redirect(Route::Login))
    }
}

/// Returns the login redirect when the session holds no token.
pub(crate) fn require_session(session: &Session) -> Option<Flow> {
    if session.is_authenticated() {
        None
    } else {
        tracing::debug!("No session token, redirecting to login");
        Some(Flow::Redirect(Route::Login))
    }
}

// ============= Load Lifecycle =============

#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Load<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Load::Ready(data),
            Err(e) => Load::Failed(e.user_message()),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Load::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Load::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Load::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }
}

// ============= Mutation Lifecycle =============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Dismissible status message shown after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    shown_at: Instant,
    duration: Duration,
}

impl Banner {
    pub fn is_success(&self) -> bool {
        self.kind == BannerKind::Success
    }

    pub fn expires_at(&self) -> Instant {
        self.shown_at + self.duration
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.expires_at()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationState {
    Idle,
    InFlight,
    Done(Banner),
}

/// Guards a page's write operations: one at a time, each ending in a banner.
#[derive(Debug, Clone)]
pub struct Mutation {
    state: MutationState,
    duration: Duration,
}

impl Default for Mutation {
    fn default() -> Self {
        Self::new(BANNER_DURATION)
    }
}

impl Mutation {
    pub fn new(duration: Duration) -> Self {
        Self {
            state: MutationState::Idle,
            duration,
        }
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == MutationState::InFlight
    }

    pub fn banner(&self) -> Option<&Banner> {
        match &self.state {
            MutationState::Done(banner) => Some(banner),
            _ => None,
        }
    }

    /// Enter `InFlight`. A mutation already in flight is rejected.
    pub fn begin(&mut self) -> Result<()> {
        if self.is_in_flight() {
            return Err(AppError::InvalidInput(
                "Another request is still in progress".to_string(),
            ));
        }
        self.state = MutationState::InFlight;
        Ok(())
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.finish(BannerKind::Success, message.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.finish(BannerKind::Error, message.into());
    }

    /// Settle an in-flight mutation from its result.
    pub fn settle<T>(&mut self, result: &Result<T>, success: impl Into<String>) {
        match result {
            Ok(_) => self.succeed(success),
            Err(e) => self.fail(e.user_message()),
        }
    }

    /// Return to `Idle` once the banner has expired.
    pub fn tick(&mut self, now: Instant) {
        if let MutationState::Done(banner) = &self.state {
            if !banner.is_visible(now) {
                self.state = MutationState::Idle;
            }
        }
    }

    pub fn dismiss(&mut self) {
        if !self.is_in_flight() {
            self.state = MutationState::Idle;
        }
    }

    fn finish(&mut self, kind: BannerKind, message: String) {
        self.state = MutationState::Done(Banner {
            kind,
            message,
            shown_at: Instant::now(),
            duration: self.duration,
        });
    }
}
