//! Subcommand handlers
//!
//! Each handler drives the matching page controller and renders its state.
//! A controller that redirects to login turns into an error telling the user
//! to sign in; error banners become a non-zero exit.

use super::output::{Output, truncate};
use super::{ChatCommands, Commands, PlanCommands, ProfileCommands, ProgressCommands};
use crate::AppState;
use crate::client::ApiClient;
use crate::session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
use crate::state::{
    AnalysisPage, ChatPage, ExerciseItem, Flow, Load, LoginPage, MealItem, Mutation,
    PlanComposer, PlanDetailPage, PlanEditor, PlansPage, ProfilePage, ProgressDetailPage,
    ProgressForm, ProgressPage, RegisterPage, Route, TrendsView,
};
use crate::types::{Insight, MessageRole, Plan, PlanType, ProgressEntry, UserProfile};
use crate::utils::toml_config::FitcoachConfig;
use anyhow::{Context as _, bail};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Everything a client-side subcommand needs.
pub struct Context {
    pub config: FitcoachConfig,
    pub client: ApiClient,
    pub out: Output,
}

impl Context {
    /// Restore the session from the configured token file.
    pub fn new(config: FitcoachConfig, out: Output) -> anyhow::Result<Self> {
        let store: Arc<dyn TokenStore> = match config.token_file() {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => {
                tracing::warn!("No config directory found, the session will not be kept");
                Arc::new(MemoryTokenStore::new())
            }
        };
        let session = Session::restore(store)?;
        let client = ApiClient::new(config.backend_url(), session);
        Ok(Self {
            config,
            client,
            out,
        })
    }

    fn banner(&self) -> Duration {
        Duration::from_millis(self.config.ui.banner_ms)
    }

    fn form_banner(&self) -> Duration {
        Duration::from_millis(self.config.ui.form_banner_ms)
    }
}

/// Run the proxy server until Ctrl-C.
pub async fn serve(config: FitcoachConfig, out: &Output) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let backend = config.backend_url().to_string();
    let state = AppState::new(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    out.banner();
    out.kv("Listening", &format!("http://{}", addr));
    out.kv("Backend", &backend);
    out.newline();
    tracing::info!(%addr, %backend, "Proxy server started");

    axum::serve(listener, crate::api::routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Proxy server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

/// Print the resolved configuration.
pub fn show_config(
    config: &FitcoachConfig,
    path: &Path,
    full: bool,
    validate: bool,
    out: &Output,
) -> anyhow::Result<()> {
    out.header("Configuration");
    out.kv("File", &path.display().to_string());
    if !path.exists() {
        out.warning("Config file not found, using defaults");
    }

    if validate {
        config.validate()?;
        out.success("Configuration is valid");
    }

    if full {
        out.newline();
        out.body(&toml::to_string_pretty(config).context("Failed to render configuration")?);
        return Ok(());
    }

    out.kv("Backend", config.backend_url());
    out.kv("Listen", &config.bind_address());
    out.kv("Log level", &config.server.log_level);
    out.kv(
        "Token file",
        &config
            .token_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(memory only)".to_string()),
    );
    Ok(())
}

/// Dispatch a client-side subcommand.
pub async fn run(command: Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => login(ctx, username, password).await,
        Commands::Register {
            username,
            email,
            password,
        } => register(ctx, username, email, password).await,
        Commands::Logout => {
            ctx.client.auth().logout()?;
            ctx.out.success("Signed out");
            Ok(())
        }
        Commands::Chat(cmd) => chat(ctx, cmd).await,
        Commands::Plans(cmd) => plans(ctx, cmd).await,
        Commands::Profile(cmd) => profile(ctx, cmd).await,
        Commands::Progress(cmd) => progress(ctx, cmd).await,
        Commands::Serve | Commands::Config { .. } => {
            bail!("This command is handled before a session is opened")
        }
    }
}

// ============= Shared Helpers =============

fn follow(flow: Flow) -> anyhow::Result<()> {
    if flow.is_redirect_to_login() {
        bail!("Not signed in. Run `fitcoach login <username>` first");
    }
    Ok(())
}

fn ready<T>(load: Option<&Load<T>>) -> anyhow::Result<&T> {
    match load {
        Some(Load::Ready(data)) => Ok(data),
        Some(Load::Failed(message)) => bail!("{}", message),
        Some(Load::Loading) | None => bail!("Request did not complete"),
    }
}

/// Print a mutation's banner; an error banner fails the command.
fn report(out: &Output, mutation: &Mutation) -> anyhow::Result<()> {
    match mutation.banner() {
        Some(banner) if banner.is_success() => {
            out.status(banner);
            Ok(())
        }
        Some(banner) => bail!("{}", banner.message),
        None => Ok(()),
    }
}

fn password_or_prompt(out: &Output, password: Option<String>) -> String {
    password
        .or_else(|| out.prompt("Password"))
        .unwrap_or_default()
}

fn split_pair(pair: &str) -> anyhow::Result<(&str, &str)> {
    pair.split_once('=')
        .with_context(|| format!("Expected field=value, got '{}'", pair))
}

fn date(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn number(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{:.1}{}", v, unit))
        .unwrap_or_else(|| "-".to_string())
}

// ============= Auth =============

async fn login(ctx: &Context, username: String, password: Option<String>) -> anyhow::Result<()> {
    let mut page = LoginPage::new();
    page.username = username;
    page.password = password_or_prompt(&ctx.out, password);

    let flow = page.submit(&ctx.client).await;
    if let Some(error) = page.error() {
        bail!("{}", error);
    }
    if flow == Flow::Redirect(Route::Chat) {
        ctx.out.success(&format!("Signed in as {}", page.username));
        ctx.out.hint("Talk to your coach with:");
        ctx.out.command("fitcoach chat send \"What should I train today?\"");
    }
    Ok(())
}

async fn register(
    ctx: &Context,
    username: String,
    email: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    let mut page = RegisterPage::new();
    page.username = username;
    page.email = email;
    page.password = password_or_prompt(&ctx.out, password);

    let flow = page.submit(&ctx.client).await;
    if let Some(error) = page.error() {
        bail!("{}", error);
    }
    if flow == Flow::Redirect(Route::Login) {
        ctx.out.success("Account created");
        ctx.out.hint("Sign in with:");
        ctx.out.command(&format!("fitcoach login {}", page.username));
    }
    Ok(())
}

// ============= Chat =============

async fn chat(ctx: &Context, cmd: ChatCommands) -> anyhow::Result<()> {
    let mut page = ChatPage::new(ctx.banner());
    follow(page.mount(&ctx.client).await)?;

    match cmd {
        ChatCommands::History => {
            ctx.out.header("Chat");
            print_messages(&ctx.out, &page, 0);
        }
        ChatCommands::Send { message } => {
            page.draft = message.join(" ");
            follow(page.send(&ctx.client).await)?;
            let from = page
                .messages()
                .iter()
                .rposition(|m| m.role == MessageRole::User)
                .unwrap_or(0);
            print_messages(&ctx.out, &page, from);
        }
        ChatCommands::SavePlan {
            message_id,
            plan_type,
        } => {
            follow(page.save_as_plan(&ctx.client, &message_id, plan_type).await)?;
            report(&ctx.out, page.save_plan_state())?;
        }
    }
    Ok(())
}

fn print_messages(out: &Output, page: &ChatPage, from: usize) {
    for message in page.messages().iter().skip(from) {
        let mut tag = if message.is_local() {
            String::new()
        } else {
            format!("#{}", message.id)
        };
        if let (true, Some(plan_type)) = (message.is_plan, message.plan_type) {
            if !tag.is_empty() {
                tag.push(' ');
            }
            tag.push_str(&format!("{} plan", plan_type));
        }
        let tag = (!tag.is_empty()).then_some(tag.as_str());
        out.message(message.role, &message.content, tag);
    }
}

// ============= Plans =============

async fn plans(ctx: &Context, cmd: PlanCommands) -> anyhow::Result<()> {
    match cmd {
        PlanCommands::List { tab } => {
            let mut page = PlansPage::new(ctx.banner());
            page.tab = tab.parse()?;
            follow(page.mount(&ctx.client).await)?;
            ready(Some(page.plans()))?;

            let visible = page.visible();
            ctx.out.header("Plans");
            if visible.is_empty() {
                ctx.out.info("No plans yet");
                ctx.out.hint("Create one with:");
                ctx.out.command("fitcoach plans create workout");
                return Ok(());
            }
            ctx.out.table_header(&["ID", "Type", "Title", "Created"]);
            for plan in visible {
                ctx.out.table_row(&[
                    &plan.id.to_string(),
                    plan.plan_type.as_str(),
                    &plan_title(plan),
                    &date(&plan.created_at),
                ]);
            }
        }
        PlanCommands::Show { id } => {
            let mut page = PlanDetailPage::new(id, ctx.banner());
            follow(page.mount(&ctx.client).await)?;
            print_plan(&ctx.out, ready(Some(page.plan()))?);
        }
        PlanCommands::Create {
            plan_type,
            title,
            description,
            exercises,
            meals,
        } => {
            if title.is_none() && exercises.is_empty() && meals.is_empty() {
                let mut page = PlansPage::new(ctx.banner());
                follow(page.quick_create(&ctx.client, plan_type).await)?;
                report(&ctx.out, page.mutation())?;
            } else {
                compose(ctx, plan_type, title, description, exercises, meals).await?;
            }
        }
        PlanCommands::Edit {
            id,
            title,
            content,
            plan_type,
        } => {
            let mut editor = PlanEditor::new(id, ctx.banner());
            follow(editor.mount(&ctx.client).await)?;
            ready(Some(editor.loaded()))?;

            if let Some(title) = title {
                editor.title = title;
            }
            if let Some(content) = content {
                editor.content = match content.strip_prefix('@') {
                    Some(path) => std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path))?,
                    None => content,
                };
            }
            if let Some(plan_type) = plan_type {
                editor.plan_type = plan_type;
            }
            follow(editor.save(&ctx.client).await)?;
            report(&ctx.out, editor.save_state())?;
        }
        PlanCommands::Delete { id, yes } => {
            if !yes && !ctx.out.confirm(&format!("Delete plan {}?", id)) {
                ctx.out.info("Cancelled");
                return Ok(());
            }
            let mut page = PlanDetailPage::new(id, ctx.banner());
            follow(page.delete(&ctx.client).await)?;
            report(&ctx.out, page.delete_state())?;
        }
        PlanCommands::Analyze { id } => {
            let mut page = PlanDetailPage::new(id, ctx.banner());
            follow(page.analyze(&ctx.client).await)?;
            let analysis = ready(page.analysis())?;
            ctx.out.header(&format!("Analysis of plan {}", analysis.plan_id));
            ctx.out.body(&analysis.analysis);
        }
    }
    Ok(())
}

async fn compose(
    ctx: &Context,
    plan_type: PlanType,
    title: Option<String>,
    description: String,
    exercises: Vec<String>,
    meals: Vec<String>,
) -> anyhow::Result<()> {
    let mut composer = PlanComposer::new(plan_type, ctx.form_banner());
    composer.title = title.unwrap_or_default();
    composer.description = description;
    for item in &exercises {
        composer.add_exercise(parse_exercise(item))?;
    }
    for item in &meals {
        composer.add_meal(parse_meal(item))?;
    }

    let flow = composer.submit(&ctx.client).await;
    follow(flow)?;
    report(&ctx.out, composer.submit_state())?;
    if let Flow::Redirect(Route::Plan(id)) = flow {
        ctx.out.hint("Open it with:");
        ctx.out.command(&format!("fitcoach plans show {}", id));
    }
    Ok(())
}

/// `name[;sets[;reps[;notes]]]`
fn parse_exercise(raw: &str) -> ExerciseItem {
    let mut parts = raw.split(';').map(str::trim);
    let mut item = ExerciseItem {
        name: parts.next().unwrap_or_default().to_string(),
        ..ExerciseItem::default()
    };
    if let Some(sets) = parts.next().and_then(|s| s.parse().ok()) {
        item.sets = sets;
    }
    if let Some(reps) = parts.next().filter(|r| !r.is_empty()) {
        item.reps = reps.to_string();
    }
    item.notes = parts.next().unwrap_or_default().to_string();
    item
}

/// `name[;calories[;ingredients[;notes]]]`
fn parse_meal(raw: &str) -> MealItem {
    let mut parts = raw.split(';').map(str::trim);
    let mut field = || parts.next().unwrap_or_default().to_string();
    MealItem {
        name: field(),
        calories: field(),
        ingredients: field(),
        notes: field(),
    }
}

fn plan_title(plan: &Plan) -> String {
    plan.title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| plan.content.clone())
}

fn print_plan(out: &Output, plan: &Plan) {
    let title = plan
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| format!("{} plan", plan.plan_type));
    out.header(&title);
    out.kv("ID", &plan.id.to_string());
    out.kv("Type", plan.plan_type.as_str());
    out.kv("Created", &date(&plan.created_at));
    out.newline();
    out.body(&plan.content);
}

// ============= Profile =============

async fn profile(ctx: &Context, cmd: ProfileCommands) -> anyhow::Result<()> {
    let mut page = ProfilePage::new(ctx.banner());
    follow(page.mount(&ctx.client).await)?;
    ready(Some(page.loaded()))?;

    if let ProfileCommands::Set { fields } = cmd {
        for pair in &fields {
            let (key, value) = split_pair(pair)?;
            page.set_field(key.trim(), value)?;
        }
        follow(page.save(&ctx.client).await)?;
        report(&ctx.out, page.save_state())?;
    }

    ctx.out.header("Fitness Profile");
    for (key, value) in profile_rows(page.form()) {
        ctx.out.kv(key, &value);
    }
    Ok(())
}

fn profile_rows(profile: &UserProfile) -> Vec<(&'static str, String)> {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    vec![
        ("Height", number(profile.height, " cm")),
        ("Weight", number(profile.weight, " kg")),
        (
            "Age",
            profile
                .age
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Fitness level",
            profile
                .fitness_level
                .map(|l| l.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Fitness goal",
            profile
                .fitness_goal
                .map(|g| g.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Dietary preferences", text(&profile.dietary_preferences)),
        ("Workout preferences", text(&profile.workout_preferences)),
        ("Available equipment", text(&profile.available_equipment)),
        ("Health conditions", text(&profile.health_conditions)),
    ]
}

// ============= Progress =============

async fn progress(ctx: &Context, cmd: ProgressCommands) -> anyhow::Result<()> {
    match cmd {
        ProgressCommands::List { days } => {
            let mut page = ProgressPage::new(ctx.banner());
            page.days = days;
            follow(page.mount(&ctx.client).await)?;
            let entries = ready(Some(page.entries()))?;

            ctx.out.header("Progress");
            if entries.is_empty() {
                ctx.out.info("No progress entries yet");
                ctx.out.hint("Record one with:");
                ctx.out.command("fitcoach progress add weight=80.5 energy_level=7");
                return Ok(());
            }
            ctx.out
                .table_header(&["ID", "Date", "Weight", "Body fat", "Energy/Mood/Sleep"]);
            for entry in entries {
                ctx.out.table_row(&[
                    &entry.id.to_string(),
                    &date(&entry.date),
                    &number(entry.weight, " kg"),
                    &number(entry.body_fat, "%"),
                    &wellbeing(entry),
                ]);
            }
        }
        ProgressCommands::Show { id } => {
            let mut page = ProgressDetailPage::new(id, ctx.banner());
            follow(page.mount(&ctx.client).await)?;
            print_entry(&ctx.out, ready(Some(page.entry()))?);
        }
        ProgressCommands::Add { fields } => {
            let mut form = ProgressForm::create(ctx.form_banner());
            submit_form(ctx, &mut form, &fields).await?;
        }
        ProgressCommands::Edit { id, fields } => {
            let mut form = ProgressForm::edit(id, ctx.form_banner());
            follow(form.mount(&ctx.client).await)?;
            ready(Some(form.loaded()))?;
            submit_form(ctx, &mut form, &fields).await?;
        }
        ProgressCommands::Delete { id, yes } => {
            if !yes && !ctx.out.confirm(&format!("Delete progress entry {}?", id)) {
                ctx.out.info("Cancelled");
                return Ok(());
            }
            let mut page = ProgressDetailPage::new(id, ctx.banner());
            follow(page.delete(&ctx.client).await)?;
            report(&ctx.out, page.delete_state())?;
        }
        ProgressCommands::Trends { metric, days } => {
            let mut view = TrendsView::default();
            view.select_metric(&metric)?;
            view.select_days(days)?;
            follow(view.fetch(&ctx.client).await)?;
            let trend = ready(view.trend())?;

            ctx.out
                .header(&format!("{} over {} days", view.label(), trend.period_days));
            if trend.data.is_empty() {
                ctx.out.info("No data for this period");
                return Ok(());
            }
            let values: Vec<f64> = trend.data.iter().map(|p| p.value).collect();
            ctx.out.chart(&values);
            ctx.out.change(&view.change_text(), view.tone());
            ctx.out.newline();
            for point in &trend.data {
                ctx.out.kv(&date(&point.date), &format!("{}{}", point.value, view.unit()));
            }
        }
        ProgressCommands::Analysis { days } => {
            let mut page = AnalysisPage::new(ctx.banner());
            page.days = days;
            follow(page.fetch(&ctx.client).await)?;
            let analysis = ready(page.analysis())?;

            ctx.out.header(&format!("Progress analysis ({} days)", page.days));
            if !analysis.success {
                ctx.out.warning(
                    analysis
                        .message
                        .as_deref()
                        .unwrap_or("Not enough data for an analysis yet"),
                );
                return Ok(());
            }
            if let Some(summary) = &analysis.analysis_summary {
                ctx.out.body(summary);
            }
            print_insights(&ctx.out, "Insights", &analysis.insights);
            print_insights(&ctx.out, "Recommendations", &analysis.recommendations);
            if let Some(adjustments) = &analysis.plan_adjustments {
                for (name, items) in [("Workout", &adjustments.workout), ("Diet", &adjustments.diet)]
                {
                    if !items.is_empty() {
                        ctx.out.subheader(&format!("{} adjustments", name));
                        items.iter().for_each(|i| ctx.out.list_item(i));
                    }
                }
            }
        }
        ProgressCommands::AdaptivePlan {
            plan_type,
            original_plan_id,
        } => {
            let mut page = AnalysisPage::new(ctx.banner());
            follow(
                page.generate_plan(&ctx.client, plan_type, original_plan_id)
                    .await,
            )?;
            report(&ctx.out, page.generate_state())?;
            if let Some(plan) = page.generated() {
                print_plan(&ctx.out, plan);
            }
        }
    }
    Ok(())
}

async fn submit_form(ctx: &Context, form: &mut ProgressForm, fields: &[String]) -> anyhow::Result<()> {
    for pair in fields {
        let (key, value) = split_pair(pair)?;
        form.set_field(key.trim(), value)?;
    }
    follow(form.submit(&ctx.client).await)?;
    report(&ctx.out, form.submit_state())
}

fn wellbeing(entry: &ProgressEntry) -> String {
    let level = |v: Option<u8>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    format!(
        "{}/{}/{}",
        level(entry.energy_level),
        level(entry.mood),
        level(entry.sleep_quality)
    )
}

fn print_entry(out: &Output, entry: &ProgressEntry) {
    out.header(&format!("Progress entry {}", entry.id));
    out.kv("Date", &date(&entry.date));
    out.kv("Weight", &number(entry.weight, " kg"));
    out.kv("Body fat", &number(entry.body_fat, "%"));
    out.kv("Energy/Mood/Sleep", &wellbeing(entry));
    if !entry.measurements.is_empty() {
        out.subheader("Measurements");
        for (name, value) in &entry.measurements {
            out.kv(name, &format!("{} cm", value));
        }
    }
    if !entry.workout_performance.is_empty() {
        out.subheader("Workout performance");
        for (name, value) in &entry.workout_performance {
            out.kv(name, &value.to_string());
        }
    }
    if let Some(notes) = entry.notes.as_deref().filter(|n| !n.is_empty()) {
        out.subheader("Notes");
        out.body(&truncate(notes, 500));
    }
}

fn print_insights(out: &Output, title: &str, items: &[Insight]) {
    if items.is_empty() {
        return;
    }
    out.subheader(title);
    for item in items {
        out.list_item(&format!("{}: {}", item.title, item.description));
    }
}
