use crate::llm::{DEFAULT_MODEL, OPENAI_BASE_URL};
use crate::yahoo::YAHOO_BASE_URL;
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::env;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const OPENAI_MODEL: &str = "OPENAI_MODEL";
const OPENAI_BASE_URL_KEY: &str = "OPENAI_BASE_URL";
const QUOTE_BASE_URL: &str = "QUOTE_BASE_URL";
const MARKET_HOLIDAYS: &str = "MARKET_HOLIDAYS";

/// Language model settings. A missing key is not an error here; the summary
/// stage falls back to the rule-based text instead.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub quote_base_url: String,
    pub llm: LlmSettings,
    pub extra_holidays: Vec<NaiveDate>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let settings: HashMap<String, String> = env::vars().collect();
        Self::from_env_map(&settings)
    }

    pub fn from_env_map(settings: &HashMap<String, String>) -> Result<Self> {
        let llm = LlmSettings {
            api_key: optional_setting(settings, OPENAI_API_KEY).map(str::to_string),
            model: optional_setting(settings, OPENAI_MODEL)
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            base_url: optional_setting(settings, OPENAI_BASE_URL_KEY)
                .unwrap_or(OPENAI_BASE_URL)
                .to_string(),
        };

        let extra_holidays = match optional_setting(settings, MARKET_HOLIDAYS) {
            Some(raw) => parse_date_list(MARKET_HOLIDAYS, raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            quote_base_url: optional_setting(settings, QUOTE_BASE_URL)
                .unwrap_or(YAHOO_BASE_URL)
                .to_string(),
            llm,
            extra_holidays,
        })
    }
}

fn optional_setting<'a>(settings: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

pub fn parse_date(key: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        anyhow!(
            "Setting {} must be a date in YYYY-MM-DD format (value: {})",
            key,
            raw
        )
    })
}

fn parse_date_list(key: &str, raw: &str) -> Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_date(key, entry))
        .collect()
}
