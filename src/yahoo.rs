use crate::errors::{FetchError, FetchResult};
use crate::http_client::{build_blocking_client, trim_base_url, truncate_for_log};
use crate::models::PriceBar;
use crate::quotes::QuoteSource;
use anyhow::Result;
use chrono::DateTime;
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Blocking client for the Yahoo Finance chart and quote summary endpoints.
pub struct YahooClient {
    http: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_blocking_client(Some(timeout))?,
            base_url: trim_base_url(base_url),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> FetchResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);
        let response = self.http.get(&url).query(query).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body),
            });
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl QuoteSource for YahooClient {
    fn history(&self, symbol: &str, period: &str, interval: &str) -> FetchResult<Vec<PriceBar>> {
        let path = format!("/v8/finance/chart/{}", encode_symbol(symbol));
        let response: ChartResponse = self.get_json(
            &path,
            &[
                ("range", period),
                ("interval", interval),
                ("events", "history"),
            ],
        )?;

        if let Some(error) = response.chart.error {
            return Err(error.into());
        }

        let result = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| FetchError::NoData(symbol.to_string()))?;

        Ok(result.into_bars())
    }

    fn net_assets(&self, symbol: &str) -> FetchResult<Option<f64>> {
        let path = format!("/v10/finance/quoteSummary/{}", encode_symbol(symbol));
        let response: QuoteSummaryResponse =
            self.get_json(&path, &[("modules", "defaultKeyStatistics")])?;

        if let Some(error) = response.quote_summary.error {
            return Err(error.into());
        }

        let total_assets = response
            .quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|entry| entry.default_key_statistics)
            .and_then(|stats| stats.total_assets)
            .and_then(|value| value.raw);

        Ok(total_assets)
    }
}

/// Path segment for a ticker (`^GSPC` → `%5EGSPC`).
fn encode_symbol(symbol: &str) -> String {
    urlencoding::encode(symbol.trim()).into_owned()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<ProviderError> for FetchError {
    fn from(error: ProviderError) -> Self {
        FetchError::Provider {
            code: error.code.unwrap_or_else(|| "unknown".to_string()),
            description: error.description.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    volume: Option<Vec<Option<f64>>>,
}

impl ChartResult {
    fn into_bars(self) -> Vec<PriceBar> {
        let timestamps = self.timestamp.unwrap_or_default();
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let closes = quote.close.unwrap_or_default();
        let volumes = quote.volume.unwrap_or_default();

        let mut bars: Vec<PriceBar> = timestamps
            .iter()
            .enumerate()
            .filter_map(|(idx, ts)| {
                let timestamp = DateTime::from_timestamp(*ts, 0)?;
                Some(PriceBar {
                    timestamp,
                    close: closes.get(idx).copied().flatten().filter(|v| v.is_finite()),
                    volume: volumes.get(idx).copied().flatten().filter(|v| v.is_finite()),
                })
            })
            .collect();
        bars.sort_by_key(|bar| bar.timestamp);
        bars
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryEntry>>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEntry {
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<KeyStatistics>,
}

#[derive(Debug, Deserialize)]
struct KeyStatistics {
    #[serde(rename = "totalAssets", default)]
    total_assets: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> YahooClient {
        YahooClient::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn encodes_index_symbols() {
        assert_eq!(encode_symbol("^GSPC"), "%5EGSPC");
        assert_eq!(encode_symbol("TWD=X"), "TWD%3DX");
        assert_eq!(encode_symbol("DX-Y.NYB"), "DX-Y.NYB");
    }

    #[test]
    fn decodes_chart_bars_with_holes() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v8/finance/chart/%5EGSPC")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("range".into(), "5d".into()),
                Matcher::UrlEncoded("interval".into(), "1d".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"chart":{"result":[{"timestamp":[1717372800,1717459200,1717545600],
                "indicators":{"quote":[{"close":[100.5,null,102.0],"volume":[1000,2000,null]}]}}],
                "error":null}}"#,
            )
            .create();

        let bars = client(&server).history("^GSPC", "5d", "1d").unwrap();
        mock.assert();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, Some(100.5));
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[1].volume, Some(2000.0));
        assert_eq!(bars[2].volume, None);
        assert!(bars[0].timestamp < bars[2].timestamp);
    }

    #[test]
    fn provider_error_is_reported() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v8/finance/chart/NOPE")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
            )
            .create();

        let err = client(&server).history("NOPE", "5d", "1d").unwrap_err();
        assert!(matches!(err, FetchError::Provider { ref code, .. } if code == "Not Found"));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v8/finance/chart/SPY")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create();

        let err = client(&server).history("SPY", "5d", "1d").unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 502, .. }));
    }

    #[test]
    fn reads_total_assets_from_quote_summary() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v10/finance/quoteSummary/QQQ")
            .match_query(Matcher::UrlEncoded(
                "modules".into(),
                "defaultKeyStatistics".into(),
            ))
            .with_status(200)
            .with_body(
                r#"{"quoteSummary":{"result":[{"defaultKeyStatistics":{"totalAssets":{"raw":2.5e11,"fmt":"250B"}}}],"error":null}}"#,
            )
            .create();

        let assets = client(&server).net_assets("QQQ").unwrap();
        assert_eq!(assets, Some(2.5e11));
    }
}
