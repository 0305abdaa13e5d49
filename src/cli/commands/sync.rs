use anyhow::Result;

use super::super::{
    args::SyncCommand, context::Context, exit_status::ExitStatus, report::print_report,
};
use crate::{
    config::Config,
    core::{
        report::render,
        store::{SaveOptions, save_languages},
        sync::{apply, plan},
    },
    notices::{Notice, WriteFailureNotice},
};

/// Fold the policy flags into the configuration.
fn apply_overrides(config: &mut Config, cmd: &SyncCommand) {
    let sync = &mut config.sync;
    if cmd.no_add_missing {
        sync.add_missing = false;
    }
    if cmd.remove_orphans {
        sync.remove_orphans = true;
    }
    if let Some(fix) = cmd.fix_mismatches {
        sync.fix_mismatches = fix.into();
    }
    if let Some(placeholder) = cmd.placeholder {
        sync.placeholder = placeholder.into();
        sync.placeholder_template = None;
    }
    if let Some(template) = &cmd.placeholder_template {
        sync.placeholder_template = Some(template.clone());
    }
    if cmd.prune_with_dynamic_keys {
        sync.prune_with_dynamic_keys = true;
    }
}

pub fn sync(cmd: SyncCommand) -> Result<ExitStatus> {
    let mut ctx = Context::new(&cmd.common)?;
    apply_overrides(&mut ctx.config, &cmd);

    let scan = ctx.scan()?;
    let (mut loaded, notices) = ctx.load_languages()?;
    let analysis = ctx.analyze(&scan, &loaded)?;
    let sync_plan = plan(&analysis, &loaded.set, &ctx.config.sync_policy());

    if cmd.dry_run {
        let mut report = render(&analysis, Some(&sync_plan), None, &ctx.report_options());
        for notice in notices {
            report.push_notice(notice);
        }
        print_report(&report, ctx.format)?;
        return Ok(ExitStatus::Success);
    }

    let outcome = apply(&mut loaded.set, &sync_plan);
    let options = SaveOptions {
        sort_keys: ctx.config.sort_keys,
    };
    let failures = save_languages(
        &ctx.messages_root,
        &loaded,
        outcome.changed_languages(),
        &options,
    );

    let mut report = render(&analysis, Some(&sync_plan), Some(&outcome), &ctx.report_options());
    for notice in notices {
        report.push_notice(notice);
    }
    for (language, error) in &failures {
        report.push_notice(Notice::from(WriteFailureNotice {
            language: language.clone(),
            error: error.to_string(),
        }));
    }
    print_report(&report, ctx.format)?;

    if failures.is_empty() {
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
