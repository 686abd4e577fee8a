// OpenAI Responses API client used for the daily market summary

use crate::errors::{FetchError, FetchResult};
use crate::http_client::{build_blocking_client, trim_base_url, truncate_for_log};
use anyhow::Result;
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const MAX_OUTPUT_TOKENS: u32 = 600;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub struct ResponsesClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_output_tokens: u32,
}

impl ResponsesClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: build_blocking_client(Some(REQUEST_TIMEOUT))?,
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: MAX_OUTPUT_TOKENS,
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends the prompt and returns the concatenated text segments of the reply.
    /// An empty string means the model produced no text.
    pub fn generate(&self, prompt: &str) -> FetchResult<String> {
        let url = format!("{}/v1/responses", self.base_url);
        debug!("POST {} model={}", url, self.model);

        let request = ResponsesRequest {
            model: &self.model,
            input: prompt,
            max_output_tokens: self.max_output_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body),
            });
        }

        let body = response.text()?;
        let parsed: ResponsesResponse = serde_json::from_str(&body)?;

        let text = parsed
            .output
            .iter()
            .filter_map(|item| item.content.as_ref())
            .flatten()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn joins_text_segments_from_output() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/responses")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_output_tokens": 600,
            })))
            .with_status(200)
            .with_body(
                r#"{"output":[{"type":"message","content":[{"type":"output_text","text":"全球市場總結：上漲"},{"type":"output_text","text":"。"}]}]}"#,
            )
            .create();

        let client = ResponsesClient::new(&server.url(), "test-key").unwrap();
        let text = client.generate("prompt").unwrap();

        mock.assert();
        assert_eq!(text, "全球市場總結：上漲。");
    }

    #[test]
    fn error_status_is_surfaced() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/responses")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
            .create();

        let client = ResponsesClient::new(&server.url(), "bad").unwrap();
        let err = client.generate("prompt").unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, .. }));
    }
}
