use super::ApiClient;
use crate::types::{Acknowledgement, Plan, PlanAnalysis, PlanCreate, PlanList, PlanUpdate, Result};
use reqwest::Method;

pub struct PlansApi<'a> {
    pub(super) client: &'a ApiClient,
}

impl PlansApi<'_> {
    pub async fn list(&self) -> Result<Vec<Plan>> {
        let request = self.client.authorized(Method::GET, "/plans/")?;
        let list: PlanList = self.client.execute(request).await?;
        Ok(list.plans)
    }

    pub async fn get(&self, id: i64) -> Result<Plan> {
        let request = self.client.authorized(Method::GET, &format!("/plans/{}", id))?;
        self.client.execute(request).await
    }

    pub async fn create(&self, input: &PlanCreate) -> Result<Plan> {
        let request = self.client.authorized(Method::POST, "/plans/")?.json(input);
        self.client.execute(request).await
    }

    pub async fn update(&self, id: i64, patch: &PlanUpdate) -> Result<Plan> {
        let request = self
            .client
            .authorized(Method::PUT, &format!("/plans/{}", id))?
            .json(patch);
        self.client.execute(request).await
    }

    pub async fn delete(&self, id: i64) -> Result<Acknowledgement> {
        let request = self
            .client
            .authorized(Method::DELETE, &format!("/plans/{}", id))?;
        self.client.execute(request).await
    }

    /// Ask the coach to review a stored plan.
    pub async fn analyze(&self, id: i64) -> Result<PlanAnalysis> {
        let request = self
            .client
            .authorized(Method::GET, &format!("/plans/{}/analyze", id))?;
        self.client.execute(request).await
    }
}
