use std::{
    fs,
    io::{self, Write},
};

use anyhow::{Context as _, Result};

use super::super::{
    args::ExportCommand, context::Context, exit_status::ExitStatus, report::print_success_to,
};
use crate::core::exchange::{Format, export as export_languages};

pub fn export(cmd: ExportCommand) -> Result<ExitStatus> {
    let ctx = Context::new(&cmd.common)?;
    let (loaded, _) = ctx.load_languages()?;

    let format = cmd
        .file_format
        .map(Format::from)
        .or_else(|| cmd.output.as_deref().and_then(Format::from_path))
        .unwrap_or(Format::Csv);
    let content = export_languages(&loaded.set, format, &ctx.config.key_separator)
        .context("Failed to export translations")?;

    match &cmd.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            print_success_to(
                &format!(
                    "Exported {} language(s) to {}",
                    loaded.set.len(),
                    path.display()
                ),
                &mut io::stdout().lock(),
            )?;
        }
        None => io::stdout().lock().write_all(content.as_bytes())?,
    }

    Ok(ExitStatus::Success)
}
