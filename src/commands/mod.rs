pub mod check_calendar;
pub mod fetch;
pub mod run;
pub mod summarize;

use crate::calendar::TradingDay;
use crate::context::AppContext;
use log::info;

/// How a gated command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Skipped(TradingDay),
}

/// Calendar check shared by the commands that touch the quote provider.
pub fn gate(app: &AppContext) -> RunStatus {
    let calendar = app.calendar();
    if calendar.is_trading_day(app.run_date()) {
        return RunStatus::Completed;
    }
    let day = calendar.classify(app.run_date());
    info!("{} is a {}; skipping run", app.run_date(), day);
    RunStatus::Skipped(day)
}
