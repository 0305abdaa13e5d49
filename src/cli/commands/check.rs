use anyhow::Result;

use super::super::{
    args::CheckCommand, context::Context, exit_status::ExitStatus, report::print_report,
};
use crate::core::report::{Report, render};

pub fn check(cmd: CheckCommand) -> Result<ExitStatus> {
    let ctx = Context::new(&cmd.common)?;
    let scan = ctx.scan()?;
    let (loaded, notices) = ctx.load_languages()?;
    let analysis = ctx.analyze(&scan, &loaded)?;

    let mut report = render(&analysis, None, None, &ctx.report_options());
    for notice in notices {
        report.push_notice(notice);
    }
    print_report(&report, ctx.format)?;

    let fail_on_orphans = cmd.fail_on_orphans || ctx.config.fail_on_orphans;
    Ok(exit_status(&report, fail_on_orphans))
}

fn exit_status(report: &Report, fail_on_orphans: bool) -> ExitStatus {
    let summary = &report.summary;
    let failed = summary.missing > 0
        || summary.mismatched > 0
        || (fail_on_orphans && summary.orphan > 0)
        || report.has_errors();
    if failed {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    }
}
