use super::{Flow, Load, Mutation, Route, require_session};
use crate::client::ApiClient;
use crate::client::{DEFAULT_ANALYSIS_DAYS, DEFAULT_TREND_DAYS};
use crate::types::{
    AdaptivePlanRequest, AppError, Plan, PlanType, ProgressAnalysis, ProgressEntry, ProgressInput,
    ProgressTrend, Result,
};
use std::collections::BTreeMap;
use std::time::Duration;

// ============= Metric Catalog =============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    Physical,
    Subjective,
    Measurement,
    Performance,
}

/// A trackable value with its display unit and accepted range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub category: MetricCategory,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Metric {
    const fn new(
        key: &'static str,
        label: &'static str,
        unit: Option<&'static str>,
        category: MetricCategory,
        range: Option<(f64, f64)>,
    ) -> Self {
        let (min, max) = match range {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };
        Self {
            key,
            label,
            unit,
            category,
            min,
            max,
        }
    }

    /// Whether a falling value is progress.
    pub fn lower_is_better(&self) -> bool {
        matches!(self.key, "weight" | "body_fat")
    }

    pub fn unit(&self) -> &'static str {
        self.unit.unwrap_or("")
    }

    fn check_range(&self, value: f64) -> Result<()> {
        let below = self.min.is_some_and(|min| value < min);
        let above = self.max.is_some_and(|max| value > max);
        if below || above || !value.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "{} must be between {} and {}",
                self.label,
                self.min.unwrap_or(0.0),
                self.max.map(|m| m.to_string()).unwrap_or_else(|| "any".to_string())
            )));
        }
        Ok(())
    }
}

use MetricCategory::{Measurement, Performance, Physical, Subjective};

/// Known metrics. Measurement and performance maps also accept other names.
pub const METRICS: [Metric; 15] = [
    Metric::new("weight", "Weight", Some("kg"), Physical, Some((30.0, 300.0))),
    Metric::new("body_fat", "Body Fat", Some("%"), Physical, Some((3.0, 50.0))),
    Metric::new("energy_level", "Energy Level", None, Subjective, Some((1.0, 10.0))),
    Metric::new("mood", "Mood", None, Subjective, Some((1.0, 10.0))),
    Metric::new("sleep_quality", "Sleep Quality", None, Subjective, Some((1.0, 10.0))),
    Metric::new("measurement.chest", "Chest", Some("cm"), Measurement, None),
    Metric::new("measurement.waist", "Waist", Some("cm"), Measurement, None),
    Metric::new("measurement.hips", "Hips", Some("cm"), Measurement, None),
    Metric::new("measurement.thighs", "Thighs", Some("cm"), Measurement, None),
    Metric::new("measurement.arms", "Arms", Some("cm"), Measurement, None),
    Metric::new("workout.bench_press", "Bench Press", Some("kg"), Performance, None),
    Metric::new("workout.squat", "Squat", Some("kg"), Performance, None),
    Metric::new("workout.deadlift", "Deadlift", Some("kg"), Performance, None),
    Metric::new("workout.pull_ups", "Pull-ups", Some("reps"), Performance, None),
    Metric::new("workout.push_ups", "Push-ups", Some("reps"), Performance, None),
];

pub fn metric(key: &str) -> Option<&'static Metric> {
    METRICS.iter().find(|m| m.key == key)
}

/// Time windows offered by the trends view, in days.
pub const TREND_RANGES: [(u32, &str); 4] = [
    (30, "Last 30 days"),
    (90, "Last 90 days"),
    (180, "Last 6 months"),
    (365, "Last year"),
];

/// `+1.5kg`, `-0.3%` or `No change`.
pub fn format_change(change: Option<f64>, unit: &str) -> String {
    match change {
        Some(change) if change != 0.0 => {
            let sign = if change > 0.0 { "+" } else { "" };
            format!("{}{:.1}{}", sign, change, unit)
        }
        _ => "No change".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTone {
    Improving,
    Declining,
    Neutral,
}

pub fn change_tone(metric_key: &str, change: Option<f64>) -> ChangeTone {
    let Some(change) = change.filter(|c| *c != 0.0) else {
        return ChangeTone::Neutral;
    };
    let lower_is_better = metric(metric_key).is_some_and(Metric::lower_is_better);
    if (change < 0.0) == lower_is_better {
        ChangeTone::Improving
    } else {
        ChangeTone::Declining
    }
}

// ============= Progress List =============

#[derive(Debug)]
pub struct ProgressPage {
    entries: Load<Vec<ProgressEntry>>,
    /// Only show entries from the last N days
    pub days: Option<u32>,
    delete: Mutation,
}

impl Default for ProgressPage {
    fn default() -> Self {
        Self::new(super::BANNER_DURATION)
    }
}

impl ProgressPage {
    pub fn new(banner_duration: Duration) -> Self {
        Self {
            entries: Load::Loading,
            days: None,
            delete: Mutation::new(banner_duration),
        }
    }

    pub fn entries(&self) -> &Load<Vec<ProgressEntry>> {
        &self.entries
    }

    pub fn delete_state(&self) -> &Mutation {
        &self.delete
    }

    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.entries = Load::Loading;
        self.entries = Load::from_result(client.progress().list(self.days).await);
        Flow::Stay
    }

    pub async fn delete(&mut self, client: &ApiClient, id: i64) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.delete.begin().is_err() {
            return Flow::Stay;
        }
        let result = client.progress().delete(id).await;
        self.delete
            .settle(&result, "Progress entry deleted successfully!");
        if result.is_ok() {
            if let Some(entries) = self.entries.data_mut() {
                entries.retain(|e| e.id != id);
            }
        }
        Flow::Stay
    }
}

// ============= Progress Detail =============

/// One progress entry with a delete action.
#[derive(Debug)]
pub struct ProgressDetailPage {
    id: i64,
    entry: Load<ProgressEntry>,
    delete: Mutation,
}

impl ProgressDetailPage {
    pub fn new(id: i64, banner_duration: Duration) -> Self {
        Self {
            id,
            entry: Load::Loading,
            delete: Mutation::new(banner_duration),
        }
    }

    pub fn entry(&self) -> &Load<ProgressEntry> {
        &self.entry
    }

    pub fn delete_state(&self) -> &Mutation {
        &self.delete
    }

    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.entry = Load::from_result(client.progress().get(self.id).await);
        Flow::Stay
    }

    /// Delete the entry and return to the list on success.
    pub async fn delete(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.delete.begin().is_err() {
            return Flow::Stay;
        }
        let result = client.progress().delete(self.id).await;
        self.delete
            .settle(&result, "Progress entry deleted successfully!");
        if result.is_ok() {
            Flow::Redirect(Route::Progress)
        } else {
            Flow::Stay
        }
    }
}

// ============= Progress Form =============

const DEFAULT_SLIDER: u8 = 5;

/// Create or edit form for a progress entry.
#[derive(Debug)]
pub struct ProgressForm {
    id: Option<i64>,
    loaded: Load<()>,
    pub weight: Option<f64>,
    pub body_fat: Option<f64>,
    measurements: BTreeMap<String, Option<f64>>,
    workout_performance: BTreeMap<String, Option<f64>>,
    pub energy_level: u8,
    pub mood: u8,
    pub sleep_quality: u8,
    pub notes: String,
    submit: Mutation,
}

impl ProgressForm {
    /// Blank form for a new entry.
    pub fn create(banner_duration: Duration) -> Self {
        Self {
            id: None,
            loaded: Load::Ready(()),
            weight: None,
            body_fat: None,
            measurements: BTreeMap::new(),
            workout_performance: BTreeMap::new(),
            energy_level: DEFAULT_SLIDER,
            mood: DEFAULT_SLIDER,
            sleep_quality: DEFAULT_SLIDER,
            notes: String::new(),
            submit: Mutation::new(banner_duration),
        }
    }

    /// Form for an existing entry; call [`mount`](Self::mount) to load it.
    pub fn edit(id: i64, banner_duration: Duration) -> Self {
        Self {
            id: Some(id),
            loaded: Load::Loading,
            ..Self::create(banner_duration)
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn loaded(&self) -> &Load<()> {
        &self.loaded
    }

    pub fn submit_state(&self) -> &Mutation {
        &self.submit
    }

    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        let Some(id) = self.id else {
            return Flow::Stay;
        };
        match client.progress().get(id).await {
            Ok(entry) => {
                self.fill(&entry);
                self.loaded = Load::Ready(());
            }
            Err(e) => self.loaded = Load::Failed(e.user_message()),
        }
        Flow::Stay
    }

    fn fill(&mut self, entry: &ProgressEntry) {
        let slider = |v: Option<u8>| v.filter(|v| *v > 0).unwrap_or(DEFAULT_SLIDER);
        self.weight = entry.weight;
        self.body_fat = entry.body_fat;
        self.measurements = entry
            .measurements
            .iter()
            .map(|(k, v)| (k.clone(), Some(*v)))
            .collect();
        self.workout_performance = entry
            .workout_performance
            .iter()
            .map(|(k, v)| (k.clone(), Some(*v)))
            .collect();
        self.energy_level = slider(entry.energy_level);
        self.mood = slider(entry.mood);
        self.sleep_quality = slider(entry.sleep_quality);
        self.notes = entry.notes.clone().unwrap_or_default();
    }

    /// Set a field from text.
    ///
    /// Keys are `weight`, `body_fat`, `energy_level`, `mood`, `sleep_quality`,
    /// `notes`, `measurement.<name>` and `workout.<name>`. An empty value
    /// clears the field.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if key == "notes" {
            self.notes = value.to_string();
            return Ok(());
        }

        let number = if value.is_empty() {
            None
        } else {
            Some(value.parse::<f64>().map_err(|_| {
                AppError::InvalidInput(format!("'{}' is not a valid number for {}", value, key))
            })?)
        };
        if let (Some(n), Some(m)) = (number, metric(key)) {
            m.check_range(n)?;
        }

        match key {
            "weight" => self.weight = number,
            "body_fat" => self.body_fat = number,
            "energy_level" | "mood" | "sleep_quality" => {
                let level = number.map(|n| n.round() as u8).unwrap_or(DEFAULT_SLIDER);
                match key {
                    "energy_level" => self.energy_level = level,
                    "mood" => self.mood = level,
                    _ => self.sleep_quality = level,
                }
            }
            _ => {
                if number.is_some_and(|n| n < 0.0 || !n.is_finite()) {
                    return Err(AppError::InvalidInput(format!(
                        "{} must not be negative",
                        key
                    )));
                }
                let (map, name) = if let Some(name) = key.strip_prefix("measurement.") {
                    (&mut self.measurements, name)
                } else if let Some(name) = key.strip_prefix("workout.") {
                    (&mut self.workout_performance, name)
                } else {
                    return Err(AppError::InvalidInput(format!(
                        "Unknown progress field '{}'",
                        key
                    )));
                };
                if name.is_empty() {
                    return Err(AppError::InvalidInput(format!(
                        "Missing name in progress field '{}'",
                        key
                    )));
                }
                map.insert(name.to_string(), number);
            }
        }
        Ok(())
    }

    /// Request body; unset map values are dropped.
    pub fn to_input(&self) -> ProgressInput {
        let present = |map: &BTreeMap<String, Option<f64>>| {
            map.iter()
                .filter_map(|(k, v)| v.map(|v| (k.clone(), v)))
                .collect()
        };
        ProgressInput {
            weight: self.weight,
            body_fat: self.body_fat,
            measurements: present(&self.measurements),
            workout_performance: present(&self.workout_performance),
            energy_level: Some(self.energy_level),
            mood: Some(self.mood),
            sleep_quality: Some(self.sleep_quality),
            notes: (!self.notes.is_empty()).then(|| self.notes.clone()),
        }
    }

    fn reset(&mut self) {
        let submit = std::mem::take(&mut self.submit);
        *self = Self {
            submit,
            ..Self::create(super::BANNER_DURATION)
        };
    }

    /// Create or update the entry and return to the progress list.
    pub async fn submit(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.submit.begin().is_err() {
            return Flow::Stay;
        }

        let input = self.to_input();
        let result = match self.id {
            Some(id) => {
                let result = client.progress().update(id, &input).await;
                self.submit
                    .settle(&result, "Progress entry updated successfully!");
                result
            }
            None => {
                let result = client.progress().create(&input).await;
                self.submit
                    .settle(&result, "Progress entry created successfully!");
                if result.is_ok() {
                    self.reset();
                }
                result
            }
        };

        match result {
            Ok(_) => Flow::Redirect(Route::Progress),
            Err(_) => Flow::Stay,
        }
    }
}

// ============= Trends =============

#[derive(Debug)]
pub struct TrendsView {
    metric: String,
    days: u32,
    trend: Option<Load<ProgressTrend>>,
}

impl Default for TrendsView {
    fn default() -> Self {
        Self {
            metric: "weight".to_string(),
            days: DEFAULT_TREND_DAYS,
            trend: None,
        }
    }
}

impl TrendsView {
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn trend(&self) -> Option<&Load<ProgressTrend>> {
        self.trend.as_ref()
    }

    pub fn select_metric(&mut self, key: &str) -> Result<()> {
        let known = metric(key).is_some();
        let custom = ["measurement.", "workout."]
            .iter()
            .any(|prefix| key.strip_prefix(prefix).is_some_and(|name| !name.is_empty()));
        if !known && !custom {
            return Err(AppError::InvalidInput(format!("Unknown metric '{}'", key)));
        }
        self.metric = key.to_string();
        Ok(())
    }

    pub fn select_days(&mut self, days: u32) -> Result<()> {
        if days == 0 {
            return Err(AppError::InvalidInput("Time range must be at least one day".to_string()));
        }
        self.days = days;
        Ok(())
    }

    pub fn unit(&self) -> &'static str {
        metric(&self.metric).map(Metric::unit).unwrap_or("")
    }

    pub fn label(&self) -> String {
        metric(&self.metric)
            .map(|m| m.label.to_string())
            .unwrap_or_else(|| self.metric.clone())
    }

    pub async fn fetch(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.trend = Some(Load::Loading);
        let result = client.progress().trends(&self.metric, self.days).await;
        self.trend = Some(Load::from_result(result));
        Flow::Stay
    }

    fn change(&self) -> Option<f64> {
        self.trend
            .as_ref()
            .and_then(Load::data)
            .and_then(|t| t.change)
    }

    pub fn change_text(&self) -> String {
        format_change(self.change(), self.unit())
    }

    pub fn tone(&self) -> ChangeTone {
        change_tone(&self.metric, self.change())
    }
}

// ============= Analysis =============

#[derive(Debug)]
pub struct AnalysisPage {
    pub days: u32,
    analysis: Option<Load<ProgressAnalysis>>,
    generate: Mutation,
    generated: Option<Plan>,
}

impl Default for AnalysisPage {
    fn default() -> Self {
        Self::new(super::BANNER_DURATION)
    }
}

impl AnalysisPage {
    pub fn new(banner_duration: Duration) -> Self {
        Self {
            days: DEFAULT_ANALYSIS_DAYS,
            analysis: None,
            generate: Mutation::new(banner_duration),
            generated: None,
        }
    }

    pub fn analysis(&self) -> Option<&Load<ProgressAnalysis>> {
        self.analysis.as_ref()
    }

    pub fn generate_state(&self) -> &Mutation {
        &self.generate
    }

    pub fn generated(&self) -> Option<&Plan> {
        self.generated.as_ref()
    }

    pub async fn fetch(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.analysis = Some(Load::Loading);
        self.analysis = Some(Load::from_result(client.progress().analysis(self.days).await));
        Flow::Stay
    }

    /// Generate an adapted plan and open it.
    pub async fn generate_plan(
        &mut self,
        client: &ApiClient,
        plan_type: PlanType,
        original_plan_id: Option<i64>,
    ) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.generate.begin().is_err() {
            return Flow::Stay;
        }

        let request = AdaptivePlanRequest {
            plan_type,
            original_plan_id,
        };
        match client.progress().adaptive_plan(&request).await {
            Ok(response) => match response.plan.filter(|_| response.success) {
                Some(plan) => {
                    let id = plan.id;
                    self.generate.succeed(
                        response
                            .message
                            .unwrap_or_else(|| "Adaptive plan created successfully".to_string()),
                    );
                    self.generated = Some(plan);
                    return Flow::Redirect(Route::Plan(id));
                }
                None => self.generate.fail(
                    response
                        .message
                        .unwrap_or_else(|| "Failed to generate adaptive plan".to_string()),
                ),
            },
            Err(e) => self.generate.fail(e.user_message()),
        }
        Flow::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some(1.5), "kg", "+1.5kg")]
    #[case(Some(-0.34), "%", "-0.3%")]
    #[case(Some(0.0), "kg", "No change")]
    #[case(None, "", "No change")]
    #[case(Some(12.0), "reps", "+12.0reps")]
    fn change_formatting(#[case] change: Option<f64>, #[case] unit: &str, #[case] expected: &str) {
        assert_eq!(format_change(change, unit), expected);
    }

    #[rstest]
    #[case("weight", Some(-2.0), ChangeTone::Improving)]
    #[case("weight", Some(2.0), ChangeTone::Declining)]
    #[case("body_fat", Some(-0.5), ChangeTone::Improving)]
    #[case("workout.squat", Some(5.0), ChangeTone::Improving)]
    #[case("workout.squat", Some(-5.0), ChangeTone::Declining)]
    #[case("mood", None, ChangeTone::Neutral)]
    fn trend_tone(#[case] key: &str, #[case] change: Option<f64>, #[case] tone: ChangeTone) {
        assert_eq!(change_tone(key, change), tone);
    }

    #[test]
    fn new_form_has_neutral_sliders_and_empty_maps() {
        let input = ProgressForm::create(Duration::from_millis(1500)).to_input();
        assert_eq!(input.energy_level, Some(5));
        assert_eq!(input.mood, Some(5));
        assert_eq!(input.sleep_quality, Some(5));
        assert!(input.measurements.is_empty());
        assert!(input.workout_performance.is_empty());
        assert_eq!(input.notes, None);
    }

    #[test]
    fn cleared_map_values_are_dropped_before_submit() {
        let mut form = ProgressForm::create(Duration::from_millis(1500));
        form.set_field("measurement.waist", "82.5").unwrap();
        form.set_field("measurement.chest", "100").unwrap();
        form.set_field("measurement.chest", "").unwrap();
        form.set_field("workout.running", "5").unwrap();

        let input = form.to_input();
        assert_eq!(input.measurements.len(), 1);
        assert_eq!(input.measurements.get("waist"), Some(&82.5));
        assert_eq!(input.workout_performance.get("running"), Some(&5.0));
    }

    #[rstest]
    #[case("weight", "25")]
    #[case("weight", "301")]
    #[case("body_fat", "60")]
    #[case("mood", "11")]
    #[case("energy_level", "0")]
    #[case("measurement.arms", "-3")]
    #[case("workout.", "10")]
    #[case("calories", "2000")]
    #[case("weight", "eighty")]
    fn out_of_range_or_unknown_fields_are_rejected(#[case] key: &str, #[case] value: &str) {
        let mut form = ProgressForm::create(Duration::from_millis(1500));
        assert!(form.set_field(key, value).is_err());
    }

    #[test]
    fn trends_view_defaults_and_metric_selection() {
        let mut view = TrendsView::default();
        assert_eq!(view.metric(), "weight");
        assert_eq!(view.days(), 90);
        assert_eq!(view.change_text(), "No change");

        view.select_metric("measurement.calves").unwrap();
        assert_eq!(view.unit(), "");
        assert!(view.select_metric("steps").is_err());
        assert!(view.select_days(0).is_err());
    }

    #[test]
    fn editing_fills_missing_sliders_with_default() {
        let mut form = ProgressForm::edit(4, Duration::from_millis(1500));
        let entry: ProgressEntry = serde_json::from_value(serde_json::json!({
            "id": 4,
            "user_id": 1,
            "date": "2024-03-01T08:00:00",
            "weight": 79.0,
            "measurements": {"waist": 80.0},
            "workout_performance": null,
            "energy_level": 8,
            "mood": null,
            "notes": null
        }))
        .unwrap();
        form.fill(&entry);

        assert!(form.is_edit());
        let input = form.to_input();
        assert_eq!(input.weight, Some(79.0));
        assert_eq!(input.energy_level, Some(8));
        assert_eq!(input.mood, Some(5));
        assert_eq!(input.measurements.get("waist"), Some(&80.0));
    }
}
