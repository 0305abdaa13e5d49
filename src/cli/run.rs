use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{check::check, export::export, import::import, init::init, scan::scan, sync::sync},
    exit_status::ExitStatus,
};

/// Dispatch to the command handler.
///
/// Returns `Err` when the command cannot run at all (invalid config,
/// unreadable reference language, missing messages directory).
pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Scan(cmd)) => scan(cmd),
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Sync(cmd)) => sync(cmd),
        Some(Command::Export(cmd)) => export(cmd),
        Some(Command::Import(cmd)) => import(cmd),
        Some(Command::Init(cmd)) => init(cmd),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
