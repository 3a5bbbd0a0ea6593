use super::ApiClient;
use crate::types::{
    Acknowledgement, AdaptivePlanRequest, AdaptivePlanResponse, ProgressAnalysis, ProgressEntry,
    ProgressInput, ProgressList, ProgressTrend, Result,
};
use reqwest::Method;

/// Default window for metric trends.
pub const DEFAULT_TREND_DAYS: u32 = 90;
/// Default window for the progress analysis.
pub const DEFAULT_ANALYSIS_DAYS: u32 = 30;

pub struct ProgressApi<'a> {
    pub(super) client: &'a ApiClient,
}

impl ProgressApi<'_> {
    pub async fn create(&self, input: &ProgressInput) -> Result<ProgressEntry> {
        let request = self.client.authorized(Method::POST, "/progress/")?.json(input);
        self.client.execute(request).await
    }

    /// All entries, or only those from the last `days` days.
    pub async fn list(&self, days: Option<u32>) -> Result<Vec<ProgressEntry>> {
        let mut request = self.client.authorized(Method::GET, "/progress/")?;
        if let Some(days) = days {
            request = request.query(&[("days", days)]);
        }
        let list: ProgressList = self.client.execute(request).await?;
        Ok(list.progress)
    }

    pub async fn get(&self, id: i64) -> Result<ProgressEntry> {
        let request = self
            .client
            .authorized(Method::GET, &format!("/progress/{}", id))?;
        self.client.execute(request).await
    }

    pub async fn update(&self, id: i64, input: &ProgressInput) -> Result<ProgressEntry> {
        let request = self
            .client
            .authorized(Method::PUT, &format!("/progress/{}", id))?
            .json(input);
        self.client.execute(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<Acknowledgement> {
        let request = self
            .client
            .authorized(Method::DELETE, &format!("/progress/{}", id))?;
        self.client.execute(request).await
    }

    /// Time series for one metric, e.g. `weight` or `measurement.waist`.
    pub async fn trends(&self, metric: &str, days: u32) -> Result<ProgressTrend> {
        let request = self
            .client
            .authorized(Method::GET, &format!("/progress/trends/{}", metric))?
            .query(&[("days", days)]);
        self.client.execute(request).await
    }

    pub async fn analysis(&self, days: u32) -> Result<ProgressAnalysis> {
        let request = self
            .client
            .authorized(Method::GET, "/progress/analysis")?
            .query(&[("days", days)]);
        self.client.execute(request).await
    }

    /// Generate a plan adapted to recent progress.
    ///
    /// The backend reads `plan_type` and `original_plan_id` from the query
    /// string; they are sent in the JSON body too.
    pub async fn adaptive_plan(&self, req: &AdaptivePlanRequest) -> Result<AdaptivePlanResponse> {
        let request = self
            .client
            .authorized(Method::POST, "/progress/adaptive-plan")?
            .query(req)
            .json(req);
        self.client.execute(request).await
    }
}
