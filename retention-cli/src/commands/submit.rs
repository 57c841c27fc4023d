//! Submit command - run one decoded payload through a scan session

use anyhow::Result;

use super::{attach_cameras, get_context, get_quiet_context, report_outcome};

pub async fn run(payload: &str, captures: &[String], json: bool) -> Result<()> {
    let (ctx, notifications) = if json {
        let (ctx, recent) = get_quiet_context()?;
        (ctx, Some(recent))
    } else {
        (get_context()?, None)
    };

    let session = ctx.scan_session();
    session.start_scanning();
    attach_cameras(&session, captures)?;
    session.on_scan_start();

    let outcome = session.on_scan_result(payload.trim()).await;
    report_outcome(&outcome, notifications.as_deref(), json)
}
