//! EveryQA API boundary.
//!
//! EveryQaApi -> one blocking method per remote operation
//! AuthContext -> bearer token carrier passed to every call
//! ApiError    -> Api { message, model } | Generic(message)
//!
//! `HttpClient` (http.rs) is the production implementation.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub mod http;
pub mod model;

pub use http::HttpClient;
pub use model::{
    AddActionToTestDto, CreateTestDto, CreateTestRunDto, TestAction, TestCase, TestExecution,
    TestRun, User,
};

/// Authorization metadata attached to each request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    token: String,
}

impl AuthContext {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    /// `model` echoes the decoded response body when it is JSON.
    #[error("api error:\n\t Error: {message},\n\t Model: {}", render_model(.model))]
    Api {
        message: String,
        model: Option<Value>,
    },

    /// Transport, decoding or client setup failure.
    #[error("{0}")]
    Generic(String),
}

impl ApiError {
    pub fn api(message: impl Into<String>, model: Option<Value>) -> Self {
        ApiError::Api {
            message: message.into(),
            model,
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        ApiError::Generic(message.into())
    }
}

fn render_model(model: &Option<Value>) -> String {
    match model {
        Some(v) => v.to_string(),
        None => "<none>".to_string(),
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Typed operations of the remote test-management service.
///
/// Every method issues exactly one request and blocks until it completes.
pub trait EveryQaApi {
    fn current_user(&self, auth: &AuthContext) -> ApiResult<User>;

    fn cases_by_project(&self, auth: &AuthContext, project_id: &str) -> ApiResult<Vec<TestCase>>;

    fn runs_by_project(&self, auth: &AuthContext, project_id: &str) -> ApiResult<Vec<TestRun>>;

    fn create_run(
        &self,
        auth: &AuthContext,
        project_id: &str,
        dto: &CreateTestRunDto,
    ) -> ApiResult<TestRun>;

    fn close_run(&self, auth: &AuthContext, project_id: &str, run_id: i32) -> ApiResult<TestRun>;

    fn create_test_by_case(
        &self,
        auth: &AuthContext,
        project_id: &str,
        run_id: i32,
        dto: &CreateTestDto,
    ) -> ApiResult<TestExecution>;

    fn create_action_by_test(
        &self,
        auth: &AuthContext,
        project_id: &str,
        run_id: i32,
        test_id: i32,
        dto: &AddActionToTestDto,
    ) -> ApiResult<TestAction>;
}

impl<T: EveryQaApi + ?Sized> EveryQaApi for &T {
    fn current_user(&self, auth: &AuthContext) -> ApiResult<User> {
        (**self).current_user(auth)
    }

    fn cases_by_project(&self, auth: &AuthContext, project_id: &str) -> ApiResult<Vec<TestCase>> {
        (**self).cases_by_project(auth, project_id)
    }

    fn runs_by_project(&self, auth: &AuthContext, project_id: &str) -> ApiResult<Vec<TestRun>> {
        (**self).runs_by_project(auth, project_id)
    }

    fn create_run(
        &self,
        auth: &AuthContext,
        project_id: &str,
        dto: &CreateTestRunDto,
    ) -> ApiResult<TestRun> {
        (**self).create_run(auth, project_id, dto)
    }

    fn close_run(&self, auth: &AuthContext, project_id: &str, run_id: i32) -> ApiResult<TestRun> {
        (**self).close_run(auth, project_id, run_id)
    }

    fn create_test_by_case(
        &self,
        auth: &AuthContext,
        project_id: &str,
        run_id: i32,
        dto: &CreateTestDto,
    ) -> ApiResult<TestExecution> {
        (**self).create_test_by_case(auth, project_id, run_id, dto)
    }

    fn create_action_by_test(
        &self,
        auth: &AuthContext,
        project_id: &str,
        run_id: i32,
        test_id: i32,
        dto: &AddActionToTestDto,
    ) -> ApiResult<TestAction> {
        (**self).create_action_by_test(auth, project_id, run_id, test_id, dto)
    }
}
