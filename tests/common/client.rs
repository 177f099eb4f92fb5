//! HTTP client wrapper for end-to-end tests
//!
//! Every request carries the identity headers of the actor the client was
//! built for. Route paths live here so tests never spell them out.

use super::constants::*;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    client: reqwest::Client,
    pub base_url: String,
    user_id: Option<String>,
    role: Option<String>,
    tenant_id: Option<String>,
}

impl TestClient {
    fn build(base_url: &str, user_id: Option<&str>, role: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url: base_url.to_string(),
            user_id: user_id.map(str::to_string),
            role: role.map(str::to_string),
            tenant_id: user_id.map(|_| TENANT.to_string()),
        }
    }

    pub fn new(base_url: &str, user_id: &str, role: &str) -> Self {
        Self::build(base_url, Some(user_id), Some(role))
    }

    pub fn recruiter(base_url: &str) -> Self {
        Self::new(base_url, RECRUITER, "recruiter")
    }

    pub fn other_recruiter(base_url: &str) -> Self {
        Self::new(base_url, OTHER_RECRUITER, "recruiter")
    }

    pub fn admin(base_url: &str) -> Self {
        Self::new(base_url, ADMIN, "admin")
    }

    pub fn viewer(base_url: &str) -> Self {
        Self::new(base_url, VIEWER, "viewer")
    }

    /// Sends no identity headers at all.
    pub fn anonymous(base_url: &str) -> Self {
        Self::build(base_url, None, None)
    }

    pub fn with_tenant(mut self, tenant_id: &str) -> Self {
        self.tenant_id = Some(tenant_id.to_string());
        self
    }

    fn with_identity(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder;
        if let Some(user_id) = &self.user_id {
            builder = builder.header("x-user-id", user_id);
        }
        if let Some(role) = &self.role {
            builder = builder.header("x-user-role", role);
        }
        if let Some(tenant_id) = &self.tenant_id {
            builder = builder.header("x-tenant-id", tenant_id);
        }
        builder
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.with_identity(self.client.get(self.url(path)))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Response {
        self.with_identity(self.client.get(self.url(path)).query(query))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Response {
        let mut builder = self.client.post(self.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.with_identity(builder)
            .send()
            .await
            .expect("POST request failed")
    }

    // ========================================================================
    // Job content
    // ========================================================================

    pub async fn create_job(&self, body: &Value) -> Response {
        self.post("/v1/jobs", Some(body)).await
    }

    /// Create a job with filler description and position; panics on failure.
    pub async fn create_job_ok(&self, title: &str) -> Value {
        let response = self
            .create_job(&json!({
                "title": title,
                "description": format!("{} description", title),
                "position": "Engineering",
                "general_requirements": [{"title": "Rust", "description": "3+ years"}],
                "benefits": [{"title": "Remote"}],
            }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("Invalid job JSON")
    }

    pub async fn get_job(&self, id: &str) -> Response {
        self.get(&format!("/v1/jobs/{}", id)).await
    }

    pub async fn update_job(&self, id: &str, body: &Value) -> Response {
        self.with_identity(self.client.put(self.url(&format!("/v1/jobs/{}", id))).json(body))
            .send()
            .await
            .expect("PUT request failed")
    }

    pub async fn delete_job(&self, id: &str) -> Response {
        self.with_identity(self.client.delete(self.url(&format!("/v1/jobs/{}", id))))
            .send()
            .await
            .expect("DELETE request failed")
    }

    pub async fn job_stats(&self, id: &str) -> Response {
        self.get(&format!("/v1/jobs/{}/stats", id)).await
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub async fn transition(&self, id: &str, action: &str) -> Response {
        self.post(&format!("/v1/jobs/{}/{}", id, action), None).await
    }

    pub async fn publish(&self, id: &str) -> Response {
        self.transition(id, "publish").await
    }

    pub async fn unpublish(&self, id: &str) -> Response {
        self.transition(id, "unpublish").await
    }

    pub async fn close(&self, id: &str) -> Response {
        self.transition(id, "close").await
    }

    pub async fn archive(&self, id: &str) -> Response {
        self.transition(id, "archive").await
    }

    pub async fn unarchive(&self, id: &str) -> Response {
        self.transition(id, "unarchive").await
    }

    pub async fn bulk_publish(&self, ids: &[&str], tenant_id: &str) -> Response {
        let body = json!({ "ids": ids, "tenant_id": tenant_id });
        self.post("/v1/jobs/bulk/publish", Some(&body)).await
    }

    pub async fn bulk_archive(&self, ids: &[&str], tenant_id: &str) -> Response {
        let body = json!({ "ids": ids, "tenant_id": tenant_id });
        self.post("/v1/jobs/bulk/archive", Some(&body)).await
    }

    // ========================================================================
    // Listings
    // ========================================================================

    fn page_query(page: Option<u32>, page_size: Option<u32>) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        if let Some(page_size) = page_size {
            query.push(("page_size", page_size.to_string()));
        }
        query
    }

    pub async fn list_jobs(&self, page: Option<u32>, page_size: Option<u32>) -> Response {
        self.get_with_query("/v1/jobs", &Self::page_query(page, page_size))
            .await
    }

    pub async fn list_published(&self) -> Response {
        self.get("/v1/jobs/published").await
    }

    pub async fn list_archived(&self) -> Response {
        self.get("/v1/jobs/archived").await
    }

    pub async fn list_mine(&self) -> Response {
        self.get("/v1/jobs/mine").await
    }

    pub async fn search(&self, criteria: &[(&str, &str)]) -> Response {
        let query: Vec<(&str, String)> = criteria
            .iter()
            .map(|(key, value)| (*key, value.to_string()))
            .collect();
        self.get_with_query("/v1/jobs/search", &query).await
    }
}

/// Read the `code` field of an error body.
pub async fn error_code(response: Response) -> String {
    let body: Value = response.json().await.expect("Invalid error JSON");
    body["code"].as_str().unwrap_or_default().to_string()
}
