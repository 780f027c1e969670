use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

use trackfit_core::errors::RemoteStoreError;
use trackfit_core::sync::RemoteWorkoutStore;
use trackfit_core::workouts::{Category, Workout, WorkoutDraft, WorkoutStats};

use crate::types::{ApiErrorResponse, CreateWorkoutResponse};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the workout REST API.
///
/// One logical collection per category, addressed by path segment. The
/// bearer token is fixed at construction; callers rebuild the client on
/// re-authentication.
#[derive(Debug, Clone)]
pub struct WorkoutApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl WorkoutApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the API (e.g., "https://api.trackfit.app")
    /// * `token` - Bearer token for the authenticated user
    pub fn new(base_url: &str, token: &str) -> Result<Self, RemoteStoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|err| RemoteStoreError::transport(format!("client build failed: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, RemoteStoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| RemoteStoreError::payload("invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    fn log_response(status: StatusCode, body: &str) {
        if status.is_success() {
            debug!("[WorkoutApi] response status: {status}");
            return;
        }
        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("[WorkoutApi] response error ({status}): {preview}");
    }

    fn api_error(status: StatusCode, body: &str) -> RemoteStoreError {
        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(body) {
            return RemoteStoreError::api(
                status.as_u16(),
                format!("{}: {}", error.code, error.message),
            );
        }
        RemoteStoreError::api(status.as_u16(), format!("request failed: {body}"))
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteStoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RemoteStoreError::transport(err.to_string()))?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|err| {
            log::error!("[WorkoutApi] failed to deserialize response: {err}");
            RemoteStoreError::payload(format!("failed to parse response: {err}"))
        })
    }

    /// Consume a response where only the status matters.
    async fn expect_success(response: reqwest::Response) -> Result<(), RemoteStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .map_err(|err| RemoteStoreError::transport(err.to_string()))?;
        Self::log_response(status, &body);
        Err(Self::api_error(status, &body))
    }

    fn transport(err: reqwest::Error) -> RemoteStoreError {
        RemoteStoreError::transport(err.to_string())
    }
}

#[async_trait]
impl RemoteWorkoutStore for WorkoutApiClient {
    /// POST /api/v1/workouts/{category}
    async fn create(&self, draft: &WorkoutDraft) -> Result<String, RemoteStoreError> {
        let url = format!("{}/api/v1/workouts/{}", self.base_url, draft.category());
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(draft)
            .send()
            .await
            .map_err(Self::transport)?;

        let created: CreateWorkoutResponse = Self::parse_response(response).await?;
        Ok(created.id)
    }

    /// GET /api/v1/workouts/{category}?ownerId={owner}&limit={cap}
    async fn query_by_owner(
        &self,
        category: Category,
        owner_id: &str,
        cap: usize,
    ) -> Result<Vec<Workout>, RemoteStoreError> {
        let url = format!("{}/api/v1/workouts/{category}", self.base_url);
        let limit = cap.to_string();
        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&[("ownerId", owner_id), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(Self::transport)?;

        Self::parse_response(response).await
    }

    /// DELETE /api/v1/workouts/{category}/{id}
    ///
    /// A 404 means the record is already gone, which is the caller's
    /// desired end state.
    async fn delete(&self, category: Category, id: &str) -> Result<(), RemoteStoreError> {
        let url = format!("{}/api/v1/workouts/{category}/{id}", self.base_url);
        let response = self
            .client
            .delete(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("[WorkoutApi] delete of {id} found nothing, treating as done");
            return Ok(());
        }
        Self::expect_success(response).await
    }

    /// PUT /api/v1/stats/{category}
    async fn update_aggregate(&self, workout: &Workout) -> Result<(), RemoteStoreError> {
        let url = format!("{}/api/v1/stats/{}", self.base_url, workout.category());
        let response = self
            .client
            .put(&url)
            .headers(self.headers()?)
            .json(workout)
            .send()
            .await
            .map_err(Self::transport)?;

        Self::expect_success(response).await
    }

    /// GET /api/v1/stats/{category}?ownerId={owner}
    ///
    /// A 404 means no aggregate exists yet for this owner.
    async fn fetch_stats(
        &self,
        category: Category,
        owner_id: &str,
    ) -> Result<Option<WorkoutStats>, RemoteStoreError> {
        let url = format!("{}/api/v1/stats/{category}", self.base_url);
        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&[("ownerId", owner_id)])
            .send()
            .await
            .map_err(Self::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }
}
