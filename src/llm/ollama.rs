use std::io::BufReader;
use std::time::Duration;

use musli::Encode;
use musli::json;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{CommitError, Result};

use super::stream::{read_stream_to_string, StreamChunk};
use super::LlmClient;

/// Shared by the liveness probe and non-streaming generation. Streaming only applies it
/// to connecting.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Encode)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Body of `/api/generate`, both whole and per stream line.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
    error: String,
}

/// Synchronous Ollama client using /api/generate.
pub struct OllamaClient {
    http: Client,
    stream_http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        let stream_http = Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            stream_http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Liveness check against /api/tags.
    pub fn probe(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        log::debug!("Probing Ollama at {url}");

        let resp = self.http.get(&url).send().map_err(|e| CommitError::Connectivity {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if resp.status() != StatusCode::OK {
            return Err(CommitError::Connectivity {
                url: self.base_url.clone(),
                reason: format!("ollama returned status code: {}", resp.status().as_u16()),
            });
        }

        Ok(())
    }

    /// Probe, then POST the prompt. Non-200 answers are turned into errors here.
    fn send_generate(&self, http: &Client, prompt: &str, stream: bool) -> Result<Response> {
        self.probe()?;

        let req_body = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream,
        };
        let body_str = json::to_string(&req_body)
            .map_err(|e| CommitError::Inference(format!("failed to encode request: {e}")))?;

        let url = format!("{}/api/generate", self.base_url);
        log::info!("Calling Ollama model {:?} (stream: {stream})", self.model);
        log::debug!("Prompt preview:\n{}", truncate(prompt, 1500));
        log::trace!("Ollama request body: {body_str}");

        let resp = http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .map_err(|e| CommitError::Inference(format!("failed to send request to {url}: {e}")))?;

        if resp.status() == StatusCode::OK {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let body = resp.text().unwrap_or_default();
        log::debug!("Ollama HTTP {status}: {body}");
        Err(self.status_error(status, &body))
    }

    fn status_error(&self, status: u16, body: &str) -> CommitError {
        match serde_json::from_str::<GenerateResponse>(body) {
            Ok(envelope) if !envelope.error.is_empty() => self.server_error(envelope.error),
            _ => CommitError::Inference(format!("unexpected status code: {status}")),
        }
    }

    fn server_error(&self, message: String) -> CommitError {
        let lower = message.to_lowercase();
        if lower.contains("model") && lower.contains("not found") {
            CommitError::ModelMissing {
                model: self.model.clone(),
            }
        } else {
            CommitError::Inference(message)
        }
    }
}

fn parse_stream_line(line: &str) -> Result<StreamChunk> {
    let parsed: GenerateResponse = serde_json::from_str(line)
        .map_err(|e| CommitError::Inference(format!("failed to decode chunk: {e}")))?;

    if !parsed.error.is_empty() {
        return Err(CommitError::Inference(parsed.error));
    }

    Ok(StreamChunk {
        text: parsed.response,
        done: parsed.done,
    })
}

impl LlmClient for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let resp = self.send_generate(&self.http, prompt, false)?;

        let resp_text = resp
            .text()
            .map_err(|e| CommitError::Inference(format!("failed to read response: {e}")))?;
        log::trace!("Ollama raw JSON response: {resp_text}");

        let parsed: GenerateResponse = serde_json::from_str(&resp_text)
            .map_err(|e| CommitError::Inference(format!("failed to parse response: {e}")))?;

        if !parsed.error.is_empty() {
            return Err(self.server_error(parsed.error));
        }
        log::debug!("Response from model {:?}, done: {}", parsed.model, parsed.done);

        Ok(parsed.response)
    }

    fn generate_stream(&self, prompt: &str, on_chunk: &mut dyn FnMut(&str)) -> Result<String> {
        let resp = self.send_generate(&self.stream_http, prompt, true)?;
        let reader = BufReader::new(resp);
        read_stream_to_string(reader, parse_stream_line, |chunk| on_chunk(chunk))
    }
}

/// Truncate long strings for debug logging.
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!(
            "{}...\n[truncated {} chars]",
            &s[..idx],
            s.chars().count() - max_chars
        ),
        None => s.to_string(),
    }
}
