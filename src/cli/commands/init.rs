use std::{fs, io};

use anyhow::{Context as _, Result};

use super::super::{
    args::InitCommand,
    exit_status::ExitStatus,
    report::{print_failure_to, print_success_to},
};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init(cmd: InitCommand) -> Result<ExitStatus> {
    let config_path = cmd.path.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        print_failure_to(
            &format!("{} already exists", config_path.display()),
            &mut io::stderr().lock(),
        )?;
        return Ok(ExitStatus::Failure);
    }

    fs::write(&config_path, default_config_json()?)
        .with_context(|| format!("Failed to write file: {}", config_path.display()))?;
    print_success_to(
        &format!("Created {}", CONFIG_FILE_NAME),
        &mut io::stdout().lock(),
    )?;

    Ok(ExitStatus::Success)
}
