/*!
Action table: the fixed set of subcommands, their flags, and validation.

Each action is a clap subcommand named by its action string. Flags are
declared with an explicit zero/empty default; `Action::into_request`
treats those defaults as "missing" and yields a validated `Request`.

Helpers:
  - Action::name()
  - Action::into_request()
  - usage_text()
*/

use clap::{Args, Subcommand};

/// One supported action, as parsed from the command line.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Get current user info
    #[command(name = "user:current")]
    UserCurrent,

    /// Get a list of test cases
    #[command(name = "case:get")]
    CaseGet,

    /// Get test runs
    #[command(name = "run:get")]
    RunGet,

    /// Create test run
    #[command(name = "run:create")]
    RunCreate(RunCreateArgs),

    /// Close test run
    #[command(name = "run:close")]
    RunClose(RunCloseArgs),

    /// Create test for selected test case
    #[command(name = "test:create")]
    TestCreate(TestCreateArgs),

    /// Create result for selected test
    #[command(name = "test:create-action")]
    TestCreateAction(TestCreateActionArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunCreateArgs {
    /// User to assign test run to
    #[arg(
        short = 'a',
        long = "assignee",
        value_name = "ASSIGNEE",
        allow_hyphen_values = true,
        default_value = "",
        hide_default_value = true
    )]
    pub assignee: String,

    /// Name of test run
    #[arg(
        short = 'n',
        long = "name",
        value_name = "NAME",
        allow_hyphen_values = true,
        default_value = "",
        hide_default_value = true
    )]
    pub name: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunCloseArgs {
    /// Run id to close
    #[arg(
        short = 'r',
        long = "run",
        value_name = "RUN_ID",
        default_value_t = 0,
        hide_default_value = true
    )]
    pub run_id: i32,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TestCreateArgs {
    /// Run id to create test in
    #[arg(
        short = 'r',
        long = "run",
        value_name = "RUN_ID",
        default_value_t = 0,
        hide_default_value = true
    )]
    pub run_id: i32,

    /// Case id to create test from
    #[arg(
        short = 'c',
        long = "case",
        value_name = "CASE_ID",
        default_value_t = 0,
        hide_default_value = true
    )]
    pub case_id: i32,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TestCreateActionArgs {
    /// Run id to create action for
    #[arg(
        short = 'r',
        long = "run",
        value_name = "RUN_ID",
        default_value_t = 0,
        hide_default_value = true
    )]
    pub run_id: i32,

    /// Test id to create action for
    #[arg(
        short = 't',
        long = "test",
        value_name = "TEST_ID",
        default_value_t = 0,
        hide_default_value = true
    )]
    pub test_id: i32,

    /// Notes for action
    #[arg(
        short = 'n',
        long = "notes",
        value_name = "NOTES",
        allow_hyphen_values = true,
        default_value = "",
        hide_default_value = true
    )]
    pub notes: String,

    /// Status id for action
    #[arg(
        short = 's',
        long = "status",
        value_name = "STATUS_ID",
        default_value_t = 0,
        hide_default_value = true
    )]
    pub status_id: i32,
}

/// A validated command request: exactly one per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CurrentUser,
    ListCases,
    ListRuns,
    CreateRun {
        assignee: String,
        name: String,
    },
    CloseRun {
        run_id: i32,
    },
    CreateTest {
        run_id: i32,
        case_id: i32,
    },
    CreateTestAction {
        run_id: i32,
        test_id: i32,
        notes: String,
        status_id: i32,
    },
}

/// (action name, description) in the order shown by `usage_text`.
pub const ACTIONS: &[(&str, &str)] = &[
    ("user:current", "Get current user info"),
    ("case:get", "Get a list of test cases"),
    ("run:get", "Get test runs"),
    ("run:create", "Create test run"),
    ("run:close", "Close test run"),
    ("test:create", "Create test for selected test case"),
    ("test:create-action", "Create result for selected test"),
];

/// Global usage listing printed for a missing or unknown action.
pub fn usage_text() -> String {
    let mut s = String::from("Usage:\n");
    for (name, about) in ACTIONS {
        s.push_str(&format!("    {name} - {about}\n"));
    }
    s
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::UserCurrent => "user:current",
            Action::CaseGet => "case:get",
            Action::RunGet => "run:get",
            Action::RunCreate(_) => "run:create",
            Action::RunClose(_) => "run:close",
            Action::TestCreate(_) => "test:create",
            Action::TestCreateAction(_) => "test:create-action",
        }
    }

    /// Validate required flags. On failure returns the flags that were
    /// missing (left at their zero/empty default or out of range).
    pub fn into_request(self) -> Result<Request, Vec<&'static str>> {
        let mut missing = Vec::new();
        let request = match self {
            Action::UserCurrent => Request::CurrentUser,
            Action::CaseGet => Request::ListCases,
            Action::RunGet => Request::ListRuns,
            Action::RunCreate(a) => {
                require_text(&a.assignee, "-a", &mut missing);
                require_text(&a.name, "-n", &mut missing);
                Request::CreateRun {
                    assignee: a.assignee,
                    name: a.name,
                }
            }
            Action::RunClose(a) => {
                require_id(a.run_id, "-r", &mut missing);
                Request::CloseRun { run_id: a.run_id }
            }
            Action::TestCreate(a) => {
                require_id(a.run_id, "-r", &mut missing);
                require_id(a.case_id, "-c", &mut missing);
                Request::CreateTest {
                    run_id: a.run_id,
                    case_id: a.case_id,
                }
            }
            Action::TestCreateAction(a) => {
                require_id(a.run_id, "-r", &mut missing);
                require_id(a.test_id, "-t", &mut missing);
                require_text(&a.notes, "-n", &mut missing);
                require_id(a.status_id, "-s", &mut missing);
                Request::CreateTestAction {
                    run_id: a.run_id,
                    test_id: a.test_id,
                    notes: a.notes,
                    status_id: a.status_id,
                }
            }
        };

        if missing.is_empty() {
            Ok(request)
        } else {
            Err(missing)
        }
    }
}

fn require_text(value: &str, flag: &'static str, missing: &mut Vec<&'static str>) {
    if value.trim().is_empty() {
        missing.push(flag);
    }
}

fn require_id(value: i32, flag: &'static str, missing: &mut Vec<&'static str>) {
    if value <= 0 {
        missing.push(flag);
    }
}

/* --------------------------------- Tests ---------------------------------- */
