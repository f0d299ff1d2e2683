use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum VisionTimingError {
    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    #[error("Vision endpoint {url} returned HTTP {status}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Vision endpoint {url} returned invalid JSON: {detail}")]
    InvalidResponse { url: String, detail: String },

    #[error("Config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },
}
