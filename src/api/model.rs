//! Wire models for the EveryQA public API.
//!
//! Entities are read-only views of what the service returns. The `*Dto`
//! structs are the minimal request payloads this tool ever sends.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub user_id: String,
    pub last_name: String,
    pub first_name: String,
}

/// A test case in a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCase {
    pub id: i32,
    pub name: String,
}

/// A test run (a sprint-scoped execution of cases).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestRun {
    pub id: i32,
    pub name: String,
    pub assigned_to: String,
    pub sprint_id: String,
    pub status: String,
}

/// A test created inside a run from a case.
///
/// Fields the service adds beyond the known ones are kept in `extra` so the
/// key-value dump shows the full returned structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestExecution {
    #[serde(default)]
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A result (action) recorded against a test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAction {
    #[serde(default)]
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST projects/{project}/runs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestRunDto {
    pub assign_to: String,
    pub name: String,
    pub sprint_id: String,
}

/// Payload for `POST projects/{project}/runs/{run}/tests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestDto {
    pub case_id: i32,
}

/// Payload for `POST projects/{project}/runs/{run}/tests/{test}/actions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddActionToTestDto {
    pub notes: String,
    pub status_id: i32,
}
