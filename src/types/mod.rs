use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Greeting shown when the chat history is empty or cannot be loaded.
pub const GREETING: &str = "Hello! I'm your AI Gym Coach. How can I help you today? You can ask me about workout routines, diet plans, or fitness advice.";

/// Assistant message appended locally when sending a chat message fails.
pub const SEND_FAILURE_REPLY: &str = "Sorry, I encountered an error. Please try again later.";

// ============= Authentication Types =============

/// Form-encoded body for `POST /auth/token`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

// ============= Chat Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Kind of plan. Chat messages can only be saved as workout or diet plans;
/// the backend's adaptive plan generator also produces meditation plans.
///
/// The backend stores the type as a free string, so anything unrecognised
/// reads as `Other` instead of failing the whole plan list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Workout,
    Diet,
    Meditation,
    #[serde(other)]
    Other,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Workout => "workout",
            PlanType::Diet => "diet",
            PlanType::Meditation => "meditation",
            PlanType::Other => "other",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "workout" => Ok(PlanType::Workout),
            "diet" => Ok(PlanType::Diet),
            "meditation" => Ok(PlanType::Meditation),
            other => Err(AppError::InvalidInput(format!(
                "Invalid plan type '{}'. Must be one of: workout, diet, meditation",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_plan: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<PlanType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl Message {
    /// A user message built locally before the backend has seen it.
    pub fn user(content: impl Into<String>) -> Self {
        Self::local(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::local(MessageRole::Assistant, content)
    }

    fn local(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: format!("local-{}", uuid::Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_plan: false,
            plan_type: None,
            user_id: None,
        }
    }

    /// Whether this message exists only on the client.
    pub fn is_local(&self) -> bool {
        self.id.starts_with("local-")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSendRequest {
    pub content: String,
    pub role: MessageRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message_id: String,
    pub response: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkPlanRequest {
    pub is_plan: bool,
    pub plan_type: PlanType,
}

// ============= Plan Types =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanList {
    #[serde(default)]
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanCreate {
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub content: String,
}

/// Partial plan update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub plan_type: Option<PlanType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanAnalysis {
    pub analysis_id: String,
    pub plan_id: i64,
    pub analysis: String,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Acknowledgement body returned by delete and mark-plan endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
    /// Set when marking a message as a plan also created one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<i64>,
}

// ============= Profile Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    pub const ALL: [FitnessLevel; 3] = [
        FitnessLevel::Beginner,
        FitnessLevel::Intermediate,
        FitnessLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "Beginner",
            FitnessLevel::Intermediate => "Intermediate",
            FitnessLevel::Advanced => "Advanced",
        }
    }
}

impl FromStr for FitnessLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        FitnessLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s.trim())
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown fitness level '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Endurance,
    GeneralFitness,
    Strength,
    Flexibility,
}

impl FitnessGoal {
    pub const ALL: [FitnessGoal; 6] = [
        FitnessGoal::WeightLoss,
        FitnessGoal::MuscleGain,
        FitnessGoal::Endurance,
        FitnessGoal::GeneralFitness,
        FitnessGoal::Strength,
        FitnessGoal::Flexibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "weight_loss",
            FitnessGoal::MuscleGain => "muscle_gain",
            FitnessGoal::Endurance => "endurance",
            FitnessGoal::GeneralFitness => "general_fitness",
            FitnessGoal::Strength => "strength",
            FitnessGoal::Flexibility => "flexibility",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "Weight Loss",
            FitnessGoal::MuscleGain => "Muscle Gain",
            FitnessGoal::Endurance => "Endurance",
            FitnessGoal::GeneralFitness => "General Fitness",
            FitnessGoal::Strength => "Strength",
            FitnessGoal::Flexibility => "Flexibility",
        }
    }
}

impl FromStr for FitnessGoal {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        FitnessGoal::ALL
            .into_iter()
            .find(|goal| goal.as_str() == s.trim())
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown fitness goal '{}'", s)))
    }
}

/// Physical attributes and training preferences of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_level: Option<FitnessLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_goal: Option<FitnessGoal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_preferences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_conditions: Option<String>,
}

// ============= Progress Types =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub body_fat: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measurements: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workout_performance: BTreeMap<String, f64>,
    #[serde(default)]
    pub energy_level: Option<u8>,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default)]
    pub sleep_quality: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating or updating a progress entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(default)]
    pub measurements: BTreeMap<String, f64>,
    #[serde(default)]
    pub workout_performance: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&ProgressEntry> for ProgressInput {
    fn from(entry: &ProgressEntry) -> Self {
        Self {
            weight: entry.weight,
            body_fat: entry.body_fat,
            measurements: entry.measurements.clone(),
            workout_performance: entry.workout_performance.clone(),
            energy_level: entry.energy_level,
            mood: entry.mood,
            sleep_quality: entry.sleep_quality,
            notes: entry.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressList {
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "timestamp")]
    pub date: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressTrend {
    pub metric: String,
    #[serde(default)]
    pub data: Vec<TrendPoint>,
    #[serde(default)]
    pub change: Option<f64>,
    pub period_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanAdjustments {
    #[serde(default, deserialize_with = "null_as_default")]
    pub workout: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub diet: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub analysis_summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub insights: Vec<Insight>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<Insight>,
    #[serde(default)]
    pub plan_adjustments: Option<PlanAdjustments>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdaptivePlanRequest {
    pub plan_type: PlanType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_plan_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptivePlanResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub plan: Option<Plan>,
}

// ============= Error Types =============

/// Error body returned by the backend. FastAPI puts a string (or, for
/// validation failures, a list of objects) under `detail`; the proxy routes
/// use the same key, older routes used `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(serde_json::Value::Array(items)) => {
                let parts: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !parts.is_empty() {
                    return Some(parts.join("; "));
                }
            }
            _ => {}
        }
        self.error.clone().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Proxy relay failure, carrying the route's fixed message.
    #[error("{0}")]
    Relay(&'static str),
}

impl AppError {
    /// Text shown to the user in a banner or inline message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Auth(msg)
            | AppError::InvalidInput(msg)
            | AppError::Backend { message: msg, .. } => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Backend { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Network(_) | AppError::Decode(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Storage(_) | AppError::Relay(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "detail": self.user_message()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// ============= Serde Helpers =============

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The backend emits naive ISO-8601 datetimes (no offset) for most fields;
/// those are read as UTC. RFC 3339 values are accepted as well.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn naive_backend_timestamps_are_read_as_utc() {
        let msg: Message = serde_json::from_value(json!({
            "id": "abc",
            "user_id": 1,
            "role": "assistant",
            "content": "Try squats",
            "timestamp": "2024-03-01T10:15:30.123456",
            "is_plan": false,
            "plan_type": null
        }))
        .unwrap();

        assert_eq!(msg.timestamp.to_rfc3339(), "2024-03-01T10:15:30.123456+00:00");
        assert_eq!(msg.plan_type, None);
        assert!(!msg.is_local());
    }

    #[test]
    fn progress_entry_tolerates_null_maps_and_missing_audit_fields() {
        let entry: ProgressEntry = serde_json::from_value(json!({
            "id": 7,
            "user_id": 1,
            "date": "2024-03-01T08:00:00",
            "weight": 80.5,
            "measurements": null,
            "notes": "test"
        }))
        .unwrap();

        assert!(entry.measurements.is_empty());
        assert!(entry.workout_performance.is_empty());
        assert_eq!(entry.created_at, None);
        assert_eq!(entry.weight, Some(80.5));
    }

    #[test]
    fn plan_type_uses_the_type_key() {
        let body = serde_json::to_value(PlanCreate {
            plan_type: PlanType::Diet,
            content: "Eat more protein".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"type": "diet", "content": "Eat more protein"}));

        let patch = serde_json::to_value(PlanUpdate {
            title: Some("Cut".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch, json!({"title": "Cut"}));
    }

    #[test]
    fn error_body_prefers_detail_then_error() {
        let body: ApiErrorBody = serde_json::from_value(json!({"detail": "Plan not found"})).unwrap();
        assert_eq!(body.message().as_deref(), Some("Plan not found"));

        let body: ApiErrorBody =
            serde_json::from_value(json!({"error": "Failed to send message"})).unwrap();
        assert_eq!(body.message().as_deref(), Some("Failed to send message"));

        let body: ApiErrorBody = serde_json::from_value(json!({
            "detail": [{"loc": ["body", "content"], "msg": "field required", "type": "missing"}]
        }))
        .unwrap();
        assert_eq!(body.message().as_deref(), Some("field required"));

        let body: ApiErrorBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(body.message(), None);
    }

    #[test]
    fn backend_errors_display_the_message_verbatim() {
        let err = AppError::Backend {
            status: 403,
            message: "Not authorized to delete this plan".to_string(),
        };
        assert_eq!(err.to_string(), "Not authorized to delete this plan");
        assert_eq!(err.user_message(), "Not authorized to delete this plan");
        assert_eq!(err.status(), Some(403));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn errors_render_as_detail_responses() {
        use axum::response::IntoResponse;

        async fn render(err: AppError) -> (u16, serde_json::Value) {
            let response = err.into_response();
            let status = response.status().as_u16();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        assert_eq!(
            render(AppError::Auth("Authorization header is required".into())).await,
            (401, json!({"detail": "Authorization header is required"}))
        );
        assert_eq!(
            render(AppError::Relay("Failed to generate adaptive plan")).await,
            (500, json!({"detail": "Failed to generate adaptive plan"}))
        );
        assert_eq!(
            render(AppError::Backend { status: 404, message: "Plan not found".into() }).await,
            (404, json!({"detail": "Plan not found"}))
        );
        assert_eq!(render(AppError::Network("refused".into())).await.0, 502);
    }

    #[test]
    fn unknown_plan_types_do_not_break_decoding() {
        let list: PlanList = serde_json::from_value(json!({
            "plans": [
                {"id": 1, "type": "workout", "content": "Squats", "created_at": "2024-03-05T10:15:00"},
                {"id": 2, "type": "yoga", "content": "Flow", "created_at": "2024-03-05T10:15:00"}
            ]
        }))
        .unwrap();
        assert_eq!(list.plans[0].plan_type, PlanType::Workout);
        assert_eq!(list.plans[1].plan_type, PlanType::Other);
        assert!("other".parse::<PlanType>().is_err());
    }

    #[test]
    fn plan_type_parses_case_insensitively() {
        assert_eq!("Workout".parse::<PlanType>().unwrap(), PlanType::Workout);
        assert!("cardio".parse::<PlanType>().is_err());
    }

    #[test]
    fn profile_enums_round_trip_through_snake_case() {
        let profile: UserProfile = serde_json::from_value(json!({
            "fitness_level": "intermediate",
            "fitness_goal": "muscle_gain",
            "age": 31
        }))
        .unwrap();
        assert_eq!(profile.fitness_level, Some(FitnessLevel::Intermediate));
        assert_eq!(profile.fitness_goal, Some(FitnessGoal::MuscleGain));
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({"fitness_level": "intermediate", "fitness_goal": "muscle_gain", "age": 31})
        );
    }
}
