use crate::config::{LlmSettings, OPENAI_API_KEY};
use crate::errors::SummaryError;
use crate::llm::ResponsesClient;
use crate::models::{Category, SnapshotDocument, SummaryDocument};
use crate::output::{render_json, OutputSink, MARKET_DATA_FILE, SUMMARY_FILE};
use anyhow::Result;
use log::{error, info, warn};

pub const PROMPT_TEMPLATE: &str = "你是一位國際金融分析師。請根據以下市場資料提供三項內容：
1. 全球市場總結
2. 區域市場動能分析（美/亞/歐）
3. 資金流向觀察

請以繁體中文、簡潔、專業的語氣撰寫，限制在300字以內。

市場資料：
{data}";

const DAILY_SUMMARY: &str = "daily_summary";
const REGIONAL_TRENDS: &str = "regional_trends";
const FUND_FLOW: &str = "fund_flow";

/// Keyword sets per bucket, checked in order. The first bucket is the default.
const SECTION_KEYWORDS: [(&str, &[&str]); 3] = [
    (DAILY_SUMMARY, &["全球市場", "市場總結", "總結"]),
    (REGIONAL_TRENDS, &["區域", "市場動能", "區域市場"]),
    (FUND_FLOW, &["資金", "流向"]),
];

/// Equity indices used by the rule-based fallback, one per region.
const FALLBACK_REGIONS: [(&str, &str); 3] =
    [("^GSPC", "美國"), ("^TWII", "亞洲"), ("^STOXX", "歐洲")];

pub struct SummaryGenerator<'a> {
    sink: &'a OutputSink,
    settings: &'a LlmSettings,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(sink: &'a OutputSink, settings: &'a LlmSettings) -> Self {
        Self { sink, settings }
    }

    /// Loads the snapshot, summarizes it and persists `summary.json`.
    pub fn run(&self) -> Result<SummaryDocument> {
        info!("Loading market data for AI summary");
        let snapshot = self.load_snapshot()?;
        let summary = self.summarize(&snapshot)?;

        info!("Persisting summary");
        self.sink.write_json(SUMMARY_FILE, &summary)?;
        info!("Summary updated");
        Ok(summary)
    }

    pub fn load_snapshot(&self) -> Result<SnapshotDocument> {
        match self.sink.read_json::<SnapshotDocument, _>(MARKET_DATA_FILE)? {
            Some(snapshot) => Ok(snapshot),
            None => Err(SummaryError::MissingSnapshot(
                self.sink.primary_path(MARKET_DATA_FILE).display().to_string(),
            )
            .into()),
        }
    }

    /// Model summary when possible, rule-based summary otherwise.
    pub fn summarize(&self, snapshot: &SnapshotDocument) -> Result<SummaryDocument> {
        let prompt = build_prompt(snapshot)?;
        match self.request_summary(&prompt) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                error!("{}", err);
                Ok(fallback_summary(snapshot))
            }
        }
    }

    fn request_summary(&self, prompt: &str) -> Result<SummaryDocument, SummaryError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(SummaryError::MissingCredential(OPENAI_API_KEY))?;

        let client = ResponsesClient::new(&self.settings.base_url, api_key)
            .map_err(|err| SummaryError::Client(err.to_string()))?
            .with_model(&self.settings.model);

        info!("Requesting summary from {}", client.model());
        let text = client.generate(prompt)?;
        if text.trim().is_empty() {
            return Err(SummaryError::EmptyResponse);
        }
        Ok(parse_summary(&text))
    }
}

pub fn build_prompt(snapshot: &SnapshotDocument) -> Result<String> {
    let data = render_json(snapshot)?;
    Ok(PROMPT_TEMPLATE.replace("{data}", &data))
}

/// Splits model output into the three buckets line by line.
pub fn parse_summary(text: &str) -> SummaryDocument {
    let mut buckets: [String; 3] = Default::default();
    let mut current = 0usize;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let matched = SECTION_KEYWORDS
            .iter()
            .position(|(_, keywords)| keywords.iter().any(|keyword| line.contains(keyword)));

        match matched {
            Some(idx) => {
                current = idx;
                let cleaned = match line.split_once('：') {
                    Some((_, rest)) => rest.trim(),
                    None => line,
                };
                buckets[current] = cleaned.to_string();
            }
            None => {
                let bucket = &mut buckets[current];
                if !bucket.is_empty() {
                    bucket.push(' ');
                }
                bucket.push_str(line);
            }
        }
    }

    let [daily_summary, regional_trends, fund_flow] = buckets;
    SummaryDocument {
        daily_summary: daily_summary.trim().to_string(),
        regional_trends: regional_trends.trim().to_string(),
        fund_flow: fund_flow.trim().to_string(),
    }
}

pub fn fallback_summary(snapshot: &SnapshotDocument) -> SummaryDocument {
    warn!("Falling back to rule-based summary generation");

    let regional_trends = FALLBACK_REGIONS
        .iter()
        .map(|(symbol, region)| {
            let change = snapshot
                .find(Category::Markets, symbol)
                .and_then(|record| record.daily_change_pct);
            describe_market(change, region)
        })
        .collect::<Vec<_>>()
        .join(" ");

    SummaryDocument {
        daily_summary: describe_breadth(snapshot),
        regional_trends,
        fund_flow: "ETF 成交量資料不足，暫無資金流向更新。".to_string(),
    }
}

fn describe_market(change: Option<f64>, region: &str) -> String {
    match change {
        Some(change) => {
            let direction = if change >= 0.0 { "上漲" } else { "下跌" };
            format!("{}市場{}{:.2}%。", region, direction, change.abs())
        }
        None => format!("{}市場資料缺失。", region),
    }
}

fn describe_breadth(snapshot: &SnapshotDocument) -> String {
    let changes: Vec<f64> = snapshot
        .markets
        .iter()
        .filter_map(|record| record.daily_change_pct)
        .collect();
    if changes.is_empty() {
        return "全球市場資料不完整，請稍後再試。".to_string();
    }
    let advancing = changes.iter().filter(|change| **change >= 0.0).count();
    let declining = changes.len() - advancing;
    format!(
        "全球主要股市{}個指數上漲、{}個指數下跌。",
        advancing, declining
    )
}
