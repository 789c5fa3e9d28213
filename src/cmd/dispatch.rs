/*!
Command dispatcher.

Order of checks for one invocation:
  1. `--help` / `--version` short-circuit (no environment needed)
  2. an action token must be present
  3. TOKEN / PROJECT_ID / SPRINT_ID must be set
  4. the action must be known and its flags must parse
  5. required flags must be non-zero / non-empty
  6. exactly one facade operation runs

Errors are returned up to `execute`, which prints them and picks the
process exit code.
*/

use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::Cli;
use crate::api::{ApiResult, EveryQaApi};
use crate::cmd::action::{ACTIONS, usage_text};
use crate::cmd::facade::EveryQa;
use crate::cmd::format::StyleOptions;
use crate::config::{self, ClientSettings, EnvLookup, InvocationContext};
use crate::error::{CliError, CliResult, exitcode};
use crate::utils;
use crate::{log_debug, log_error, log_info, log_warn};

/// Run one invocation to completion and return the process exit code.
///
/// `connect` builds the API client; it is only called once every local
/// check has passed.
pub fn execute<I, T, A, F, W>(
    argv: I,
    env: &EnvLookup<'_>,
    out: &mut W,
    style: StyleOptions,
    connect: F,
) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    A: EveryQaApi,
    F: FnOnce(&ClientSettings) -> ApiResult<A>,
    W: Write,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let legacy = config::legacy_exit(env);

    match run(&argv, env, out, style, connect) {
        Ok(()) => exitcode::OK,
        Err(err) => {
            if let Err(io_err) = writeln!(out, "{}", err.to_string().trim_end()) {
                log_error!("failed to write error report: {io_err}");
            }
            let code = if legacy {
                log_warn!("{} set: exiting 0 despite failure", config::LEGACY_EXIT_VAR);
                exitcode::OK
            } else {
                err.exit_code()
            };
            log_debug!("exit code {code} (legacy={legacy})");
            code
        }
    }
}

/// Dispatch a single action. Performs at most one API call.
pub fn run<A, F, W>(
    argv: &[OsString],
    env: &EnvLookup<'_>,
    out: &mut W,
    style: StyleOptions,
    connect: F,
) -> CliResult<()>
where
    A: EveryQaApi,
    F: FnOnce(&ClientSettings) -> ApiResult<A>,
    W: Write,
{
    let parsed = Cli::try_parse_from(argv.iter());
    if let Err(e) = &parsed
        && matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
    {
        write!(out, "{}", e.render())?;
        return Ok(());
    }

    if argv.len() < 2 {
        return Err(CliError::Usage(usage_text()));
    }

    let ctx = InvocationContext::from_env(env)?;
    let cli = parsed.map_err(|e| classify_parse_error(e, argv))?;

    utils::init_logging(utils::derive_level(cli.verbose, cli.quiet));

    let action = cli.command.name();
    log_info!(
        "action={action} project={} sprint={}",
        ctx.project_id,
        ctx.sprint_id
    );

    let request = cli
        .command
        .into_request()
        .map_err(|missing| action_usage(action, &missing))?;

    let settings = ClientSettings::from_env(env)?;
    let api = connect(&settings)?;

    EveryQa::new(api, &ctx, out, style).execute(request)
}

/// Unknown or absent action -> global usage; anything else is a flag error
/// of a known action.
fn classify_parse_error(err: clap::Error, argv: &[OsString]) -> CliError {
    let names_action = argv
        .iter()
        .skip(1)
        .any(|a| ACTIONS.iter().any(|(name, _)| a.to_str() == Some(*name)));
    match err.kind() {
        ErrorKind::InvalidSubcommand
        | ErrorKind::MissingSubcommand
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => CliError::Usage(usage_text()),
        _ if !names_action => CliError::Usage(usage_text()),
        _ => CliError::Parse(err.render().to_string()),
    }
}

/// Usage error for one action: the offending flags plus that action's help.
fn action_usage(action: &str, missing: &[&str]) -> CliError {
    let mut cmd = Cli::command();
    cmd.build();
    let help = cmd
        .find_subcommand_mut(action)
        .map(|sub| sub.render_help().to_string())
        .unwrap_or_else(usage_text);
    CliError::Usage(format!(
        "{action}: missing required flag(s): {}\n\n{help}",
        missing.join(", ")
    ))
}

/* ---- Tests ---- */
