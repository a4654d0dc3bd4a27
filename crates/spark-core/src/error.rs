// File: crates/spark-core/src/error.rs
// Summary: Library error type. Errors are handled where they occur and never cross a chart boundary.

#[derive(Debug, thiserror::Error)]
pub enum SparklineError {
    #[error("unknown chart type `{0}`")]
    UnknownChartType(String),
    #[error("invalid defaults override: {0}")]
    Defaults(#[from] serde_json::Error),
    #[error("defaults override must be a JSON object, got {0}")]
    DefaultsShape(String),
    #[error("no drawing surface available")]
    SurfaceUnavailable,
    #[error("surface export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, SparklineError>;
