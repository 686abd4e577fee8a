use crate::commands::{fetch, summarize, RunStatus};
use crate::context::AppContext;
use anyhow::Result;

/// Fetch followed by the summary stage. A skipped day writes nothing.
pub fn run(app: &AppContext) -> Result<RunStatus> {
    let status = fetch::run(app)?;
    if status == RunStatus::Completed {
        summarize::run(app)?;
    }
    Ok(status)
}
