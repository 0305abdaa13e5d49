use anyhow::Result;

pub mod args;
mod commands;
mod context;
mod exit_status;
mod logging;
mod report;
mod run;

pub use args::{Arguments, Command};
pub use context::Context;
pub use exit_status::ExitStatus;
pub use report::{Colored, FAILURE_MARK, SUCCESS_MARK};

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    logging::init(args.verbose());

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    run::run(args)
}
