//! reqwest-backed `EveryQaApi` implementation.
//!
//! Calls are blocking: the client owns a current-thread Tokio runtime and
//! drives each request to completion with `block_on`, so there is never more
//! than one request in flight.

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::runtime::Runtime;
use url::Url;

use super::{
    AddActionToTestDto, ApiError, ApiResult, AuthContext, CreateTestDto, CreateTestRunDto,
    EveryQaApi, TestAction, TestCase, TestExecution, TestRun, User,
};
use crate::config::ClientSettings;
use crate::{log_debug, log_trace};

pub struct HttpClient {
    runtime: Runtime,
    http: Client,
    base_url: Url,
}

impl HttpClient {
    /// Build the runtime and HTTP client. No request is sent here.
    pub fn connect(settings: &ClientSettings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create Tokio runtime")?;
        let http = Client::builder()
            .user_agent(concat!("everyqa-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        log_debug!("api client ready: base_url={}", settings.base_url);
        Ok(Self {
            runtime,
            http,
            base_url: settings.base_url.clone(),
        })
    }

    fn get<T: DeserializeOwned>(&self, auth: &AuthContext, segments: &[&str]) -> ApiResult<T> {
        let req = self.request(Method::GET, auth, segments)?;
        self.runtime.block_on(execute(req))
    }

    fn post<B, T>(&self, auth: &AuthContext, segments: &[&str], body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut req = self.request(Method::POST, auth, segments)?;
        if let Some(body) = body {
            req = req.json(body);
        }
        self.runtime.block_on(execute(req))
    }

    fn request(
        &self,
        method: Method,
        auth: &AuthContext,
        segments: &[&str],
    ) -> ApiResult<RequestBuilder> {
        let url = endpoint(&self.base_url, segments)?;
        log_debug!("{method} {url}");
        Ok(self.http.request(method, url).bearer_auth(auth.token()))
    }
}

/// Append percent-encoded path segments to the base URL.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::generic(format!("base url cannot carry a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn execute<T: DeserializeOwned>(req: RequestBuilder) -> ApiResult<T> {
    let resp = req
        .send()
        .await
        .map_err(|e| ApiError::generic(format!("request failed: {e}")))?;
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| ApiError::generic(format!("failed to read response body: {e}")))?;
    log_trace!("response {status}: {} bytes", body.len());
    interpret(status, &body)
}

/// Turn a status + body into the typed value or a tagged error.
pub(crate) fn interpret<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ApiResult<T> {
    if !status.is_success() {
        let model = serde_json::from_slice::<Value>(body).ok();
        return Err(ApiError::api(status.to_string(), model));
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::generic(format!("failed to decode response: {e}")))
}

impl EveryQaApi for HttpClient {
    fn current_user(&self, auth: &AuthContext) -> ApiResult<User> {
        self.get(auth, &["user"])
    }

    fn cases_by_project(&self, auth: &AuthContext, project_id: &str) -> ApiResult<Vec<TestCase>> {
        self.get(auth, &["projects", project_id, "cases"])
    }

    fn runs_by_project(&self, auth: &AuthContext, project_id: &str) -> ApiResult<Vec<TestRun>> {
        self.get(auth, &["projects", project_id, "runs"])
    }

    fn create_run(
        &self,
        auth: &AuthContext,
        project_id: &str,
        dto: &CreateTestRunDto,
    ) -> ApiResult<TestRun> {
        self.post(auth, &["projects", project_id, "runs"], Some(dto))
    }

    fn close_run(&self, auth: &AuthContext, project_id: &str, run_id: i32) -> ApiResult<TestRun> {
        let run = run_id.to_string();
        self.post::<(), _>(auth, &["projects", project_id, "runs", &run, "close"], None)
    }

    fn create_test_by_case(
        &self,
        auth: &AuthContext,
        project_id: &str,
        run_id: i32,
        dto: &CreateTestDto,
    ) -> ApiResult<TestExecution> {
        let run = run_id.to_string();
        self.post(
            auth,
            &["projects", project_id, "runs", &run, "tests"],
            Some(dto),
        )
    }

    fn create_action_by_test(
        &self,
        auth: &AuthContext,
        project_id: &str,
        run_id: i32,
        test_id: i32,
        dto: &AddActionToTestDto,
    ) -> ApiResult<TestAction> {
        let run = run_id.to_string();
        let test = test_id.to_string();
        self.post(
            auth,
            &["projects", project_id, "runs", &run, "tests", &test, "actions"],
            Some(dto),
        )
    }
}
