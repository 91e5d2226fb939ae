//! Error types for layout ingestion, editing, and configuration.
//!
//! The optimizer itself never fails: malformed geometry, dangling links and
//! numerical degeneracies are handled in place. Errors only surface at the
//! edges, when data enters the layout or a run is configured.

use thiserror::Error;

/// Failure while building or editing a [`Layout`](crate::layout::Layout).
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("room code {0:?} appears more than once")]
    DuplicateRoom(String),
    #[error("no room with id {0}")]
    UnknownRoom(u32),
    #[error("room dimension must be positive, got {0}")]
    InvalidDimension(f32),
    #[error("malformed connectivity matrix: {0}")]
    MalformedMatrix(String),
    #[error("invalid layout JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Optimizer configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid spacing {0} m is below the minimum")]
    GridSpacingTooSmall(f32),
    #[error("edge tolerance must be non-negative, got {0}")]
    NegativeEdgeTolerance(f32),
    #[error("area tolerance must lie in [0, 1], got {0}")]
    AreaToleranceOutOfRange(f32),
    #[error("max iterations must be at least 1")]
    ZeroIterations,
    #[error("phase thresholds out of order: phase 2 at {0}, phase 3 at {1}")]
    PhaseThresholdsInverted(u32, u32),
    #[error("target score must lie in (0, 1], got {0}")]
    TargetScoreOutOfRange(f32),
    #[error("{0} must lie in [0, 1], got {1}")]
    ForceOutOfRange(&'static str, f32),
    #[error("unknown optimization mode {0:?} (expected conservative, aggressive or smart)")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = LayoutError::DuplicateRoom("SV01".into());
        assert!(e.to_string().contains("SV01"));
        let e = ConfigError::GridSpacingTooSmall(0.1);
        assert!(e.to_string().contains("0.1"));
    }

    #[test]
    fn json_errors_convert() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: LayoutError = err.into();
        assert!(matches!(e, LayoutError::Json(_)));
    }
}
