use crate::context::AppContext;
use crate::models::SummaryDocument;
use crate::summary::SummaryGenerator;
use anyhow::Result;

pub fn run(app: &AppContext) -> Result<SummaryDocument> {
    SummaryGenerator::new(app.sink(), &app.settings().llm).run()
}
