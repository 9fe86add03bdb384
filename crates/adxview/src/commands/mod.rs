//! Command dispatch: bridges CLI args -> core service -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod dashboard;
pub mod presets;
pub mod reports;
pub mod util;

use adxview_core::{ReportKind, ReportQuery, ReportService};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Validate report arguments before any connection is made, so usage
/// errors like an inverted date range never hit the network.
pub fn validate(cmd: &Command) -> Result<(), CliError> {
    match cmd {
        Command::Platform(args) => {
            let (start, end) = util::resolve_range(&args.range);
            ReportQuery::new(ReportKind::Platform, None, start, end)?;
        }
        Command::Content(args) => {
            let (start, end) = util::resolve_range(&args.range);
            ReportQuery::new(ReportKind::Content, Some(args.platform), start, end)?;
        }
        Command::Video(args) => {
            let (start, end) = util::resolve_range(&args.range);
            ReportQuery::new(ReportKind::Video, Some(args.platform), start, end)?;
        }
        _ => {}
    }
    Ok(())
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    service: &ReportService,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Dashboard(args) => dashboard::handle(service, args, global).await,
        Command::Platform(args) => reports::platform(service, args, global).await,
        Command::Content(args) => reports::content(service, args, global).await,
        Command::Video(args) => reports::video(service, args, global).await,
        Command::Whoami => auth::whoami(service, global),
        // Everything else is handled before dispatch
        Command::Presets
        | Command::Login(_)
        | Command::Logout
        | Command::Config(_)
        | Command::Completions(_) => unreachable!(),
    }
}

/// Background refresh interval for a command: the watch flag's cadence, or
/// zero for one-shot runs.
pub fn refresh_interval(cmd: &Command) -> u64 {
    match cmd {
        Command::Dashboard(args) if args.watch => args.refresh,
        Command::Platform(args) if args.view.watch => args.view.refresh,
        Command::Content(args) | Command::Video(args) if args.view.watch => args.view.refresh,
        _ => 0,
    }
}
