use std::path::PathBuf;

use thiserror::Error;

/// Rejected constraint parameters. Installers return these before touching the guard.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GuardError {
    #[error("{name} must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },

    #[error("max_distance must not be negative, got {0}")]
    NegativeDistance(f64),

    #[error("bounding box is inverted on {axis}: min {min} > max {max}")]
    InvalidBoundingBox {
        axis: &'static str,
        min: f64,
        max: f64,
    },

    #[error("bounding box crosses the antimeridian (lon_min {lon_min} > lon_max {lon_max}), which is not supported")]
    AntimeridianCrossing { lon_min: f64, lon_max: f64 },

    #[error("{name} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config describes an invalid constraint: {0}")]
    Constraint(#[from] GuardError),
}
