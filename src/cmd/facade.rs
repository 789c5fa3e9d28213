/*!
Service facade: one operation per action.

Each operation builds its payload from the caller's validated arguments,
issues exactly one API call, and renders the result to the injected
writer. Failures are returned, never printed here.
*/

use std::io::{self, Write};

use serde::Serialize;

use crate::api::{
    AddActionToTestDto, AuthContext, CreateTestDto, CreateTestRunDto, EveryQaApi, TestRun,
};
use crate::cmd::action::Request;
use crate::cmd::format::{StyleOptions, table};
use crate::config::InvocationContext;
use crate::error::CliResult;
use crate::{log_debug, log_info};

pub struct EveryQa<'a, A, W> {
    api: A,
    ctx: &'a InvocationContext,
    auth: AuthContext,
    out: &'a mut W,
    style: StyleOptions,
}

impl<'a, A: EveryQaApi, W: Write> EveryQa<'a, A, W> {
    pub fn new(api: A, ctx: &'a InvocationContext, out: &'a mut W, style: StyleOptions) -> Self {
        Self {
            api,
            auth: AuthContext::bearer(ctx.token.clone()),
            ctx,
            out,
            style,
        }
    }

    /// Run the facade operation matching `request`.
    pub fn execute(&mut self, request: Request) -> CliResult<()> {
        match request {
            Request::CurrentUser => self.get_current_user(),
            Request::ListCases => self.get_cases(),
            Request::ListRuns => self.get_runs(),
            Request::CreateRun { assignee, name } => self.create_run(&assignee, &name),
            Request::CloseRun { run_id } => self.close_run(run_id),
            Request::CreateTest { run_id, case_id } => self.create_test(run_id, case_id),
            Request::CreateTestAction {
                run_id,
                test_id,
                notes,
                status_id,
            } => self.create_test_action(run_id, test_id, &notes, status_id),
        }
    }

    pub fn get_current_user(&mut self) -> CliResult<()> {
        let user = self.api.current_user(&self.auth)?;
        write!(
            self.out,
            "Current user: \nID: {}\nLast name: {}\nFirst name: {}\n",
            user.user_id, user.last_name, user.first_name
        )?;
        Ok(())
    }

    pub fn get_cases(&mut self) -> CliResult<()> {
        let cases = self.api.cases_by_project(&self.auth, &self.ctx.project_id)?;
        log_info!("fetched {} case(s)", cases.len());
        let rows = cases
            .iter()
            .map(|c| vec![c.id.to_string(), c.name.clone()])
            .collect::<Vec<_>>();
        self.print_id_name_table(&rows)
    }

    pub fn get_runs(&mut self) -> CliResult<()> {
        let runs = self.api.runs_by_project(&self.auth, &self.ctx.project_id)?;
        log_info!("fetched {} run(s)", runs.len());
        let rows = runs
            .iter()
            .map(|r| vec![r.id.to_string(), r.name.clone()])
            .collect::<Vec<_>>();
        self.print_id_name_table(&rows)
    }

    pub fn create_run(&mut self, assignee: &str, name: &str) -> CliResult<()> {
        let dto = CreateTestRunDto {
            assign_to: assignee.to_string(),
            name: name.to_string(),
            sprint_id: self.ctx.sprint_id.clone(),
        };
        log_debug!("create run payload: {dto:?}");
        let run = self.api.create_run(&self.auth, &self.ctx.project_id, &dto)?;
        print_run(&mut *self.out, "Created run", &run)
    }

    pub fn close_run(&mut self, run_id: i32) -> CliResult<()> {
        let run = self
            .api
            .close_run(&self.auth, &self.ctx.project_id, run_id)?;
        print_run(&mut *self.out, "Closed run", &run)
    }

    pub fn create_test(&mut self, run_id: i32, case_id: i32) -> CliResult<()> {
        let dto = CreateTestDto { case_id };
        let exec = self
            .api
            .create_test_by_case(&self.auth, &self.ctx.project_id, run_id, &dto)?;
        dump(&mut *self.out, "Execution", &exec)
    }

    pub fn create_test_action(
        &mut self,
        run_id: i32,
        test_id: i32,
        notes: &str,
        status_id: i32,
    ) -> CliResult<()> {
        let dto = AddActionToTestDto {
            notes: notes.to_string(),
            status_id,
        };
        let action = self.api.create_action_by_test(
            &self.auth,
            &self.ctx.project_id,
            run_id,
            test_id,
            &dto,
        )?;
        dump(&mut *self.out, "Action", &action)
    }

    fn print_id_name_table(&mut self, rows: &[Vec<String>]) -> CliResult<()> {
        let tbl = table(&["Id", "Name"], rows, &self.style);
        writeln!(self.out, "{tbl}")?;
        Ok(())
    }
}

fn print_run(out: &mut impl Write, heading: &str, run: &TestRun) -> CliResult<()> {
    write!(
        out,
        "{heading}: \n\tID: {}\n\tName: {}\n\tAssignTo: {}\n\tSprintId: {}\n\tStatus: {}\n",
        run.id, run.name, run.assigned_to, run.sprint_id, run.status
    )?;
    Ok(())
}

/// Generic key-value dump of a returned structure.
fn dump(out: &mut impl Write, heading: &str, value: &impl Serialize) -> CliResult<()> {
    let body = serde_yaml::to_string(value).map_err(io::Error::other)?;
    write!(out, "{heading}: \n{body}")?;
    Ok(())
}

/* ---- Tests ---- */
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{ApiError, ApiResult, TestAction, TestCase, TestExecution, User};
    use serde_json::json;
    use std::cell::RefCell;

    /// One recorded API call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        CurrentUser,
        Cases(String),
        Runs(String),
        CreateRun(String, CreateTestRunDto),
        CloseRun(String, i32),
        CreateTest(String, i32, CreateTestDto),
        CreateAction(String, i32, i32, AddActionToTestDto),
    }

    /// In-memory API that records calls and answers from canned values.
    #[derive(Default)]
    pub struct StubApi {
        pub calls: RefCell<Vec<Call>>,
        pub tokens: RefCell<Vec<String>>,
        pub user: User,
        pub cases: Vec<TestCase>,
        pub runs: Vec<TestRun>,
        pub run: TestRun,
        pub execution: TestExecution,
        pub action: TestAction,
        pub fail_with: RefCell<Option<ApiError>>,
    }

    impl StubApi {
        pub fn failing(err: ApiError) -> Self {
            Self {
                fail_with: RefCell::new(Some(err)),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn answer<T: Clone>(&self, auth: &AuthContext, call: Call, value: &T) -> ApiResult<T> {
            self.calls.borrow_mut().push(call);
            self.tokens.borrow_mut().push(auth.token().to_string());
            match self.fail_with.borrow_mut().take() {
                Some(err) => Err(err),
                None => Ok(value.clone()),
            }
        }
    }

    impl EveryQaApi for StubApi {
        fn current_user(&self, auth: &AuthContext) -> ApiResult<User> {
            self.answer(auth, Call::CurrentUser, &self.user)
        }

        fn cases_by_project(
            &self,
            auth: &AuthContext,
            project_id: &str,
        ) -> ApiResult<Vec<TestCase>> {
            self.answer(auth, Call::Cases(project_id.into()), &self.cases)
        }

        fn runs_by_project(&self, auth: &AuthContext, project_id: &str) -> ApiResult<Vec<TestRun>> {
            self.answer(auth, Call::Runs(project_id.into()), &self.runs)
        }

        fn create_run(
            &self,
            auth: &AuthContext,
            project_id: &str,
            dto: &CreateTestRunDto,
        ) -> ApiResult<TestRun> {
            self.answer(
                auth,
                Call::CreateRun(project_id.into(), dto.clone()),
                &self.run,
            )
        }

        fn close_run(
            &self,
            auth: &AuthContext,
            project_id: &str,
            run_id: i32,
        ) -> ApiResult<TestRun> {
            self.answer(auth, Call::CloseRun(project_id.into(), run_id), &self.run)
        }

        fn create_test_by_case(
            &self,
            auth: &AuthContext,
            project_id: &str,
            run_id: i32,
            dto: &CreateTestDto,
        ) -> ApiResult<TestExecution> {
            self.answer(
                auth,
                Call::CreateTest(project_id.into(), run_id, dto.clone()),
                &self.execution,
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
            self.answer(
                auth,
                Call::CreateAction(project_id.into(), run_id, test_id, dto.clone()),
                &self.action,
            )
        }
    }

    pub fn context() -> InvocationContext {
        InvocationContext {
            token: "t".into(),
            project_id: "p1".into(),
            sprint_id: "s1".into(),
        }
    }

    pub fn smoke_run() -> TestRun {
        TestRun {
            id: 42,
            name: "Smoke test".into(),
            assigned_to: "alice".into(),
            sprint_id: "s1".into(),
            status: "open".into(),
        }
    }

    fn run_request(stub: &StubApi, request: Request) -> (CliResult<()>, String) {
        let ctx = context();
        let mut buf = Vec::new();
        let result = EveryQa::new(stub, &ctx, &mut buf, StyleOptions::plain()).execute(request);
        (result, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn current_user_labeled_lines() {
        let stub = StubApi {
            user: User {
                user_id: "u-17".into(),
                last_name: "Lovelace".into(),
                first_name: "Ada".into(),
            },
            ..StubApi::default()
        };
        let (res, out) = run_request(&stub, Request::CurrentUser);
        res.unwrap();
        assert_eq!(
            out,
            "Current user: \nID: u-17\nLast name: Lovelace\nFirst name: Ada\n"
        );
        assert_eq!(*stub.calls.borrow(), vec![Call::CurrentUser]);
        assert_eq!(*stub.tokens.borrow(), vec!["t".to_string()]);
    }

    #[test]
    fn cases_render_as_table_in_api_order() {
        let stub = StubApi {
            cases: vec![
                TestCase {
                    id: 1,
                    name: "Login".into(),
                },
                TestCase {
                    id: 2,
                    name: "Logout".into(),
                },
            ],
            ..StubApi::default()
        };
        let (res, out) = run_request(&stub, Request::ListCases);
        res.unwrap();
        assert_eq!(out, "Id  Name\n--  ------\n1   Login\n2   Logout\n");
        assert_eq!(*stub.calls.borrow(), vec![Call::Cases("p1".into())]);
    }

    #[test]
    fn runs_render_as_table() {
        let stub = StubApi {
            runs: vec![
                TestRun {
                    id: 10,
                    name: "nightly".into(),
                    ..TestRun::default()
                },
                TestRun {
                    id: 3,
                    name: "release".into(),
                    ..TestRun::default()
                },
            ],
            ..StubApi::default()
        };
        let (res, out) = run_request(&stub, Request::ListRuns);
        res.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Id  Name");
        assert_eq!(lines[2], "10  nightly");
        assert_eq!(lines[3], "3   release");
        assert_eq!(stub.call_count(), 1);
    }

    #[test]
    fn create_run_payload_and_block() {
        let stub = StubApi {
            run: smoke_run(),
            ..StubApi::default()
        };
        let (res, out) = run_request(
            &stub,
            Request::CreateRun {
                assignee: "alice".into(),
                name: "Smoke test".into(),
            },
        );
        res.unwrap();
        assert_eq!(
            *stub.calls.borrow(),
            vec![Call::CreateRun(
                "p1".into(),
                CreateTestRunDto {
                    assign_to: "alice".into(),
                    name: "Smoke test".into(),
                    sprint_id: "s1".into(),
                }
            )]
        );
        assert_eq!(
            out,
            "Created run: \n\tID: 42\n\tName: Smoke test\n\tAssignTo: alice\n\tSprintId: s1\n\tStatus: open\n"
        );
    }

    #[test]
    fn close_run_block() {
        let stub = StubApi {
            run: TestRun {
                status: "closed".into(),
                ..smoke_run()
            },
            ..StubApi::default()
        };
        let (res, out) = run_request(&stub, Request::CloseRun { run_id: 42 });
        res.unwrap();
        assert!(out.starts_with("Closed run: \n"));
        assert!(out.contains("\tStatus: closed\n"));
        assert_eq!(*stub.calls.borrow(), vec![Call::CloseRun("p1".into(), 42)]);
    }

    #[test]
    fn create_test_dumps_execution() {
        let mut extra = serde_json::Map::new();
        extra.insert("caseName".into(), json!("Login"));
        let stub = StubApi {
            execution: TestExecution {
                id: 77,
                case_id: Some(5),
                run_id: Some(42),
                status: None,
                extra,
            },
            ..StubApi::default()
        };
        let (res, out) = run_request(
            &stub,
            Request::CreateTest {
                run_id: 42,
                case_id: 5,
            },
        );
        res.unwrap();
        assert!(out.starts_with("Execution: \n"));
        assert!(out.contains("id: 77"));
        assert!(out.contains("caseId: 5"));
        assert!(out.contains("caseName: Login"));
        assert_eq!(
            *stub.calls.borrow(),
            vec![Call::CreateTest("p1".into(), 42, CreateTestDto { case_id: 5 })]
        );
    }

    #[test]
    fn create_action_dumps_every_field() {
        let stub = StubApi {
            action: TestAction {
                id: 8,
                test_id: Some(9),
                status_id: Some(1),
                notes: Some("all green".into()),
                extra: serde_json::Map::new(),
            },
            ..StubApi::default()
        };
        let (res, out) = run_request(
            &stub,
            Request::CreateTestAction {
                run_id: 3,
                test_id: 9,
                notes: "all green".into(),
                status_id: 1,
            },
        );
        res.unwrap();
        assert!(out.starts_with("Action: \n"));
        for needle in ["id: 8", "testId: 9", "statusId: 1", "notes: all green"] {
            assert!(out.contains(needle), "missing {needle} in {out}");
        }
        assert_eq!(
            *stub.calls.borrow(),
            vec![Call::CreateAction(
                "p1".into(),
                3,
                9,
                AddActionToTestDto {
                    notes: "all green".into(),
                    status_id: 1
                }
            )]
        );
    }

    #[test]
    fn api_failure_returns_error_and_prints_nothing() {
        let stub = StubApi::failing(ApiError::api("not found", Some(json!({"id": 5}))));
        let (res, out) = run_request(&stub, Request::CloseRun { run_id: 5 });
        let err = res.unwrap_err();
        assert!(out.is_empty());
        assert!(err.to_string().contains("not found"));
        assert_eq!(stub.call_count(), 1);
    }
}
