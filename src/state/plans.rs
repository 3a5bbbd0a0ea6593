use super::{Flow, Load, Mutation, Route, require_session};
use crate::client::ApiClient;
use crate::types::{AppError, Plan, PlanAnalysis, PlanCreate, PlanType, PlanUpdate, Result};
use std::fmt::Write as _;
use std::time::Duration;

/// Filter tabs on the plans list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanTab {
    #[default]
    All,
    Workout,
    Diet,
}

impl PlanTab {
    pub fn matches(&self, plan: &Plan) -> bool {
        match self {
            PlanTab::All => true,
            PlanTab::Workout => plan.plan_type == PlanType::Workout,
            PlanTab::Diet => plan.plan_type == PlanType::Diet,
        }
    }
}

impl std::str::FromStr for PlanTab {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PlanTab::All),
            "workout" => Ok(PlanTab::Workout),
            "diet" => Ok(PlanTab::Diet),
            other => Err(AppError::InvalidInput(format!(
                "Unknown tab '{}'. Use all, workout or diet",
                other
            ))),
        }
    }
}

/// Content of a plan created with one click from the list page.
pub fn quick_plan_content(plan_type: PlanType, date: chrono::NaiveDate) -> String {
    format!("New {} plan created on {}", plan_type, date.format("%-m/%-d/%Y"))
}

// ============= Plans List =============

#[derive(Debug)]
pub struct PlansPage {
    plans: Load<Vec<Plan>>,
    pub tab: PlanTab,
    mutation: Mutation,
    analysis: Option<(i64, Load<PlanAnalysis>)>,
}

impl Default for PlansPage {
    fn default() -> Self {
        Self::new(super::BANNER_DURATION)
    }
}

impl PlansPage {
    pub fn new(banner_duration: Duration) -> Self {
        Self {
            plans: Load::Loading,
            tab: PlanTab::All,
            mutation: Mutation::new(banner_duration),
            analysis: None,
        }
    }

    pub fn plans(&self) -> &Load<Vec<Plan>> {
        &self.plans
    }

    /// Plans shown under the current tab.
    pub fn visible(&self) -> Vec<&Plan> {
        self.plans
            .data()
            .map(|plans| plans.iter().filter(|p| self.tab.matches(p)).collect())
            .unwrap_or_default()
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn mutation_mut(&mut self) -> &mut Mutation {
        &mut self.mutation
    }

    pub fn analysis(&self) -> Option<&(i64, Load<PlanAnalysis>)> {
        self.analysis.as_ref()
    }

    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.refresh(client).await;
        Flow::Stay
    }

    async fn refresh(&mut self, client: &ApiClient) {
        self.plans = Load::Loading;
        self.plans = Load::from_result(client.plans().list().await);
    }

    /// Create a placeholder plan dated today, then reload the list.
    pub async fn quick_create(&mut self, client: &ApiClient, plan_type: PlanType) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.mutation.begin().is_err() {
            return Flow::Stay;
        }

        let input = PlanCreate {
            plan_type,
            content: quick_plan_content(plan_type, chrono::Local::now().date_naive()),
        };
        let result = client.plans().create(&input).await;
        self.mutation.settle(&result, "Plan created successfully!");
        if result.is_ok() {
            self.refresh(client).await;
        }
        Flow::Stay
    }

    /// Delete a plan; it leaves the local list only once the backend confirms.
    pub async fn delete(&mut self, client: &ApiClient, id: i64) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.mutation.begin().is_err() {
            return Flow::Stay;
        }

        let result = client.plans().delete(id).await;
        self.mutation.settle(&result, "Plan deleted successfully!");
        if result.is_ok() {
            if let Some(plans) = self.plans.data_mut() {
                plans.retain(|p| p.id != id);
            }
        }
        Flow::Stay
    }

    pub async fn analyze(&mut self, client: &ApiClient, id: i64) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.analysis = Some((id, Load::Loading));
        let result = client.plans().analyze(id).await;
        self.analysis = Some((id, Load::from_result(result)));
        Flow::Stay
    }
}

// ============= Plan Detail =============

#[derive(Debug)]
pub struct PlanDetailPage {
    id: i64,
    plan: Load<Plan>,
    delete: Mutation,
    analysis: Option<Load<PlanAnalysis>>,
}

impl PlanDetailPage {
    pub fn new(id: i64, banner_duration: Duration) -> Self {
        Self {
            id,
            plan: Load::Loading,
            delete: Mutation::new(banner_duration),
            analysis: None,
        }
    }

    pub fn plan(&self) -> &Load<Plan> {
        &self.plan
    }

    pub fn delete_state(&self) -> &Mutation {
        &self.delete
    }

    pub fn analysis(&self) -> Option<&Load<PlanAnalysis>> {
        self.analysis.as_ref()
    }

    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.plan = Load::from_result(client.plans().get(self.id).await);
        Flow::Stay
    }

    /// Delete the plan and return to the list on success.
    pub async fn delete(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.delete.begin().is_err() {
            return Flow::Stay;
        }
        let result = client.plans().delete(self.id).await;
        self.delete.settle(&result, "Plan deleted successfully!");
        if result.is_ok() {
            Flow::Redirect(Route::Plans)
        } else {
            Flow::Stay
        }
    }

    pub async fn analyze(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        self.analysis = Some(Load::Loading);
        self.analysis = Some(Load::from_result(client.plans().analyze(self.id).await));
        Flow::Stay
    }
}

// ============= Plan Editor =============

/// Edit form for an existing plan.
#[derive(Debug)]
pub struct PlanEditor {
    id: i64,
    loaded: Load<()>,
    pub title: String,
    pub content: String,
    pub plan_type: PlanType,
    save: Mutation,
}

impl PlanEditor {
    pub fn new(id: i64, banner_duration: Duration) -> Self {
        Self {
            id,
            loaded: Load::Loading,
            title: String::new(),
            content: String::new(),
            plan_type: PlanType::Workout,
            save: Mutation::new(banner_duration),
        }
    }

    pub fn loaded(&self) -> &Load<()> {
        &self.loaded
    }

    pub fn save_state(&self) -> &Mutation {
        &self.save
    }

    pub async fn mount(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        match client.plans().get(self.id).await {
            Ok(plan) => {
                self.title = plan.title.unwrap_or_default();
                self.content = plan.content;
                self.plan_type = plan.plan_type;
                self.loaded = Load::Ready(());
            }
            Err(e) => {
                tracing::warn!(error = %e, id = self.id, "Failed to load plan");
                self.loaded = Load::Failed("Failed to load plan. Please try again later.".to_string());
            }
        }
        Flow::Stay
    }

    /// Save the edits and go back to the plan.
    pub async fn save(&mut self, client: &ApiClient) -> Flow {
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.content.trim().is_empty() {
            self.save.fail("Content is required");
            return Flow::Stay;
        }
        if self.save.begin().is_err() {
            return Flow::Stay;
        }

        let patch = PlanUpdate {
            title: Some(self.title.clone()),
            // An unrecognised stored type is left as the backend has it.
            plan_type: (self.plan_type != PlanType::Other).then_some(self.plan_type),
            content: Some(self.content.clone()),
        };
        let result = client.plans().update(self.id, &patch).await;
        self.save.settle(&result, "Plan updated successfully!");
        match result {
            Ok(_) => Flow::Redirect(Route::Plan(self.id)),
            Err(_) => Flow::Stay,
        }
    }
}

// ============= Plan Composer =============

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseItem {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub notes: String,
}

impl Default for ExerciseItem {
    fn default() -> Self {
        Self {
            name: String::new(),
            sets: 3,
            reps: "10-12".to_string(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealItem {
    pub name: String,
    pub calories: String,
    pub ingredients: String,
    pub notes: String,
}

/// Builds a new structured plan from a title and a list of exercises or meals.
#[derive(Debug)]
pub struct PlanComposer {
    pub title: String,
    pub description: String,
    pub plan_type: PlanType,
    exercises: Vec<ExerciseItem>,
    meals: Vec<MealItem>,
    submit: Mutation,
}

impl PlanComposer {
    pub fn new(plan_type: PlanType, banner_duration: Duration) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            plan_type,
            exercises: Vec::new(),
            meals: Vec::new(),
            submit: Mutation::new(banner_duration),
        }
    }

    pub fn exercises(&self) -> &[ExerciseItem] {
        &self.exercises
    }

    pub fn meals(&self) -> &[MealItem] {
        &self.meals
    }

    pub fn submit_state(&self) -> &Mutation {
        &self.submit
    }

    pub fn add_exercise(&mut self, exercise: ExerciseItem) -> Result<()> {
        if exercise.name.trim().is_empty() {
            return Err(AppError::InvalidInput("Please enter an exercise name".to_string()));
        }
        self.exercises.push(exercise);
        Ok(())
    }

    pub fn remove_exercise(&mut self, index: usize) -> Option<ExerciseItem> {
        (index < self.exercises.len()).then(|| self.exercises.remove(index))
    }

    pub fn add_meal(&mut self, meal: MealItem) -> Result<()> {
        if meal.name.trim().is_empty() {
            return Err(AppError::InvalidInput("Please enter a meal name".to_string()));
        }
        self.meals.push(meal);
        Ok(())
    }

    pub fn remove_meal(&mut self, index: usize) -> Option<MealItem> {
        (index < self.meals.len()).then(|| self.meals.remove(index))
    }

    pub fn validate(&self) -> Result<()> {
        let message = if self.title.trim().is_empty() {
            "Please enter a title for your plan"
        } else {
            match self.plan_type {
                PlanType::Workout if self.exercises.is_empty() => {
                    "Please add at least one exercise to your workout plan"
                }
                PlanType::Diet if self.meals.is_empty() => {
                    "Please add at least one meal to your diet plan"
                }
                PlanType::Meditation | PlanType::Other => {
                    "Only workout and diet plans can be composed"
                }
                _ => return Ok(()),
            }
        };
        Err(AppError::InvalidInput(message.to_string()))
    }

    /// Markdown body sent as the plan's content.
    pub fn render(&self) -> String {
        let mut content = format!("# {}\n\n", self.title);
        if !self.description.is_empty() {
            let _ = write!(content, "{}\n\n", self.description);
        }

        if self.plan_type == PlanType::Workout {
            content.push_str("## Workout Plan\n\n");
            for (i, exercise) in self.exercises.iter().enumerate() {
                let _ = writeln!(content, "### {}. {}", i + 1, exercise.name);
                let _ = writeln!(content, "- Sets: {}", exercise.sets);
                let _ = writeln!(content, "- Reps: {}", exercise.reps);
                if !exercise.notes.is_empty() {
                    let _ = writeln!(content, "- Notes: {}", exercise.notes);
                }
                content.push('\n');
            }
        } else {
            content.push_str("## Diet Plan\n\n");
            for (i, meal) in self.meals.iter().enumerate() {
                let _ = writeln!(content, "### {}. {}", i + 1, meal.name);
                for (label, value) in [
                    ("Calories", &meal.calories),
                    ("Ingredients", &meal.ingredients),
                    ("Notes", &meal.notes),
                ] {
                    if !value.is_empty() {
                        let _ = writeln!(content, "- {}: {}", label, value);
                    }
                }
                content.push('\n');
            }
        }
        content
    }

    /// Create the plan and open it.
    pub async fn submit(&mut self, client: &ApiClient) -> Flow {
        if let Err(e) = self.validate() {
            self.submit.fail(e.user_message());
            return Flow::Stay;
        }
        if let Some(redirect) = require_session(client.session()) {
            return redirect;
        }
        if self.submit.begin().is_err() {
            return Flow::Stay;
        }

        let input = PlanCreate {
            plan_type: self.plan_type,
            content: self.render(),
        };
        let result = client.plans().create(&input).await;
        self.submit.settle(&result, "Plan created successfully!");
        match result {
            Ok(plan) => Flow::Redirect(Route::Plan(plan.id)),
            Err(_) => Flow::Stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn plan(id: i64, plan_type: PlanType) -> Plan {
        Plan {
            id,
            user_id: 1,
            plan_type,
            content: format!("plan {}", id),
            created_at: Utc::now(),
            title: None,
        }
    }

    #[test]
    fn tabs_filter_by_type() {
        let mut page = PlansPage::default();
        page.plans = Load::Ready(vec![
            plan(1, PlanType::Workout),
            plan(2, PlanType::Diet),
            plan(3, PlanType::Workout),
        ]);

        assert_eq!(page.visible().len(), 3);
        page.tab = PlanTab::Workout;
        let ids: Vec<i64> = page.visible().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        page.tab = PlanTab::Diet;
        assert_eq!(page.visible().len(), 1);
    }

    #[test]
    fn quick_plan_content_uses_us_date_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            quick_plan_content(PlanType::Diet, date),
            "New diet plan created on 3/5/2024"
        );
    }

    #[test]
    fn composer_renders_workout_markdown() {
        let mut composer = PlanComposer::new(PlanType::Workout, Duration::from_millis(1500));
        composer.title = "Push Day".to_string();
        composer.description = "Chest and triceps".to_string();
        composer
            .add_exercise(ExerciseItem {
                name: "Bench Press".to_string(),
                notes: "Pause at the bottom".to_string(),
                ..Default::default()
            })
            .unwrap();
        composer
            .add_exercise(ExerciseItem {
                name: "Dips".to_string(),
                sets: 4,
                reps: "8".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert!(composer.validate().is_ok());
        assert_eq!(
            composer.render(),
            "# Push Day\n\nChest and triceps\n\n## Workout Plan\n\n\
             ### 1. Bench Press\n- Sets: 3\n- Reps: 10-12\n- Notes: Pause at the bottom\n\n\
             ### 2. Dips\n- Sets: 4\n- Reps: 8\n\n"
        );
    }

    #[test]
    fn composer_requires_a_title_and_items() {
        let mut composer = PlanComposer::new(PlanType::Diet, Duration::from_millis(1500));
        assert_eq!(
            composer.validate().unwrap_err().user_message(),
            "Please enter a title for your plan"
        );

        composer.title = "Cutting".to_string();
        assert_eq!(
            composer.validate().unwrap_err().user_message(),
            "Please add at least one meal to your diet plan"
        );

        assert!(composer.add_meal(MealItem::default()).is_err());
        composer
            .add_meal(MealItem {
                name: "Oats".to_string(),
                calories: "350".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert!(composer.render().contains("### 1. Oats\n- Calories: 350\n\n"));
        assert_eq!(composer.remove_meal(5), None);
        assert!(composer.remove_meal(0).is_some());
    }
}
