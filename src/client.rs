use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use base64::Engine as _;
use serde_json::Value;
use tracing::debug;

use crate::errors::VisionTimingError;
use crate::types::VisionRequest;

const ERROR_BODY_EXCERPT_CHARS: usize = 200;

/// Read an image and assemble the request body for it.
///
/// `filename` is the last path segment only; the server never sees the
/// caller's directory layout.
pub fn build_request(path: &Path, mode: &str, timeout_ms: u64) -> Result<VisionRequest> {
    let bytes = std::fs::read(path).map_err(|source| VisionTimingError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    Ok(VisionRequest {
        mode: mode.to_string(),
        timeout_ms,
        filename,
        image_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
    })
}

/// Blocking client for a single vision endpoint.
pub struct VisionClient {
    url: String,
    agent: ureq::Agent,
}

impl VisionClient {
    /// `socket_timeout` bounds the whole call: connect, send and read.
    pub fn new(url: impl Into<String>, socket_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(socket_timeout).build();
        Self {
            url: url.into(),
            agent,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST one request and return the full response body.
    ///
    /// The body is read to the end here so that the caller's timing covers
    /// the whole exchange.
    pub fn send(&self, request: &VisionRequest) -> Result<Vec<u8>> {
        let body = serde_json::to_string(request)?;
        debug!(
            url = %self.url,
            filename = %request.filename,
            body_bytes = body.len(),
            "posting vision request"
        );

        let response = match self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                return Err(VisionTimingError::HttpStatus {
                    url: self.url.clone(),
                    status,
                    body: excerpt(&text, ERROR_BODY_EXCERPT_CHARS),
                }
                .into());
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(self.transport_error(transport.to_string()));
            }
        };

        // ureq only errors on 4xx/5xx; an unfollowed 3xx lands here.
        let status = response.status();
        if !(200..300).contains(&status) {
            let text = response.into_string().unwrap_or_default();
            return Err(VisionTimingError::HttpStatus {
                url: self.url.clone(),
                status,
                body: excerpt(&text, ERROR_BODY_EXCERPT_CHARS),
            }
            .into());
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| self.transport_error(e.to_string()))?;
        debug!(status, response_bytes = bytes.len(), "vision response received");

        Ok(bytes)
    }

    /// Parse a response body as JSON.
    pub fn parse_response(&self, body: &[u8]) -> Result<Value> {
        let value = serde_json::from_slice(body).map_err(|e| {
            VisionTimingError::InvalidResponse {
                url: self.url.clone(),
                detail: e.to_string(),
            }
        })?;
        Ok(value)
    }

    fn transport_error(&self, detail: String) -> anyhow::Error {
        VisionTimingError::Transport {
            url: self.url.clone(),
            detail,
        }
        .into()
    }
}

/// First `max_chars` characters of `text`, trimmed, with "..." when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &trimmed[..byte_idx]),
        None => trimmed.to_string(),
    }
}
