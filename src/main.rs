use std::io::{self, Write};

use clap::Parser;

mod api;
mod cmd;
mod config;
mod error;
mod utils;

use api::{ApiError, HttpClient};
use cmd::Action;
use cmd::format::StyleOptions;

/// EveryQA CLI - test-management actions from the command line
///
/// Usage:
///   everyqa <action> [flags]
///
/// Actions:
///   user:current                                   Current user info
///   case:get                                       List test cases of the project
///   run:get                                        List test runs of the project
///   run:create -a <assignee> -n <name>             Create a run in the sprint
///   run:close  -r <run id>                         Close a run
///   test:create -r <run id> -c <case id>           Create a test from a case
///   test:create-action -r <run> -t <test> -n <notes> -s <status>
///                                                  Record a result for a test
///
/// Environment:
///   TOKEN, PROJECT_ID, SPRINT_ID   required
///   EVERYQA_BASE_URL               API base url override
///   EVERYQA_LEGACY_EXIT            exit 0 even on failure
///   NO_COLOR                       plain table headers
#[derive(Parser, Debug)]
#[command(
    name = "everyqa",
    version,
    author,
    about = "EveryQA CLI - test-management actions from the command line",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Action,
}

fn main() {
    let env = |key: &str| std::env::var(key).ok();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = cmd::execute(
        std::env::args_os(),
        &env,
        &mut out,
        StyleOptions::detect(&env),
        |settings| {
            HttpClient::connect(settings).map_err(|e| ApiError::generic(format!("{e:#}")))
        },
    );

    flush_or_log(&mut out);
    std::process::exit(code);
}

/// Final flush before exit. A failure is logged; the exit code stands.
fn flush_or_log(out: &mut impl Write) -> bool {
    match out.flush() {
        Ok(()) => true,
        Err(e) => {
            crate::log_error!("failed to flush stdout: {e}");
            false
        }
    }
}
