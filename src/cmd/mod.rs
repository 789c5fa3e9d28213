/*!
Command layer.

  action.rs   Action (clap subcommands) + Request + usage text
  dispatch.rs execute / run: checks, one facade call, exit code
  facade.rs   EveryQa service facade: one operation per action
  format.rs   table / color helpers for human output

Conventions:
  - Facade operations return `CliResult<()>` and never exit the process.
  - Output goes to an injected writer; only `main` touches real stdout.
*/

pub mod action;
pub mod dispatch;
pub mod facade;
pub mod format;

pub use action::Action;
pub use dispatch::execute;
