//! Error types shared by the ring and fragmentation pipelines.
//!
//! Library code returns [`Result<T>`]; the binary wraps these in `anyhow`
//! with context before reporting them.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A snapshot stream ended mid-record or carried inconsistent framing.
    #[error("malformed snapshot #{index}: {reason}")]
    MalformedSnapshot { index: usize, reason: String },

    /// Two records rounded to the same output step.
    #[error("duplicate output step {step} (t = {time:e})")]
    DuplicateStep { step: i64, time: f64 },

    #[error("output step {step} not present in {source_name} snapshots")]
    MissingStep { step: i64, source_name: String },

    #[error("invalid selection '{0}': expected 1, 2, 3 or 4")]
    InvalidSelection(String),

    /// Every body in a frame was flagged missing, so there is no center of mass.
    #[error("frame {frame}: no valid bodies to compute a center of mass")]
    NoValidBodies { frame: usize },

    #[error("body '{0}' not found in simulation output")]
    MissingBody(String),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error("video encoder failed for {path:?}: {reason}")]
    Encoder { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn plot<E: std::fmt::Display>(err: E) -> Self {
        Error::Plot(err.to_string())
    }
}
