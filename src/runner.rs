use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{VisionClient, build_request};
use crate::types::{ResponseMeta, TimingRow};

/// Sample images timed when none are given on the command line.
pub const DEFAULT_IMAGES: [&str; 4] = [
    "assets/vision-samples/extended-02-after-5-messages.png",
    "assets/vision-samples/final-test.png",
    "assets/vision-samples/scene2-models.png",
    "assets/vision-samples/scene4-check-response.png",
];

pub fn default_images() -> Vec<PathBuf> {
    DEFAULT_IMAGES.iter().map(PathBuf::from).collect()
}

/// Time one request per image, in order, one at a time.
///
/// Requests are never overlapped: each one has the backend to itself so the
/// measured latency is not skewed by contention. The first failure aborts the
/// run and no rows are returned.
///
/// `request_seconds` covers the HTTP exchange only, not the file read or JSON parsing.
pub fn run(
    client: &VisionClient,
    images: &[PathBuf],
    mode: &str,
    timeout_ms: u64,
) -> Result<Vec<TimingRow>> {
    info!(url = client.url(), images = images.len(), mode, "starting timing run");

    let mut rows = Vec::with_capacity(images.len());
    for image in images {
        let request = build_request(image, mode, timeout_ms)?;

        let started_at = Utc::now();
        let start = Instant::now();
        let body = client.send(&request)?;
        let elapsed = start.elapsed();
        let response = client.parse_response(&body)?;

        let row = build_row(&image.to_string_lossy(), started_at, elapsed, &response);
        debug!(
            image = %row.image,
            request_seconds = row.request_seconds,
            "request timed"
        );
        rows.push(row);
    }

    info!(rows = rows.len(), "timing run complete");
    Ok(rows)
}

/// Round an elapsed duration to milliseconds, expressed in seconds.
pub fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

pub fn build_row(
    image: &str,
    started_at: DateTime<Utc>,
    elapsed: Duration,
    response: &Value,
) -> TimingRow {
    let meta = ResponseMeta::from_response(response);
    TimingRow {
        image: image.to_string(),
        started_at,
        request_seconds: round_seconds(elapsed),
        model_duration_ms: meta.duration_ms,
        backend: meta.backend,
        parse_warnings: meta.parse_warnings.render(),
    }
}
