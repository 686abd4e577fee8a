use crate::commands::{gate, RunStatus};
use crate::context::AppContext;
use log::info;

pub fn run(app: &AppContext) -> RunStatus {
    let status = gate(app);
    if status == RunStatus::Completed {
        info!("{} is a trading day", app.run_date());
    }
    status
}
