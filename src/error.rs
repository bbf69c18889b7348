//! Error taxonomy. Everything here is detected during setup; the relaxation loop itself
//! cannot fail once a run has started.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SsspError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SsspError {
    /// Malformed input graph; no distances are produced.
    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] GraphIssue),

    /// Unusable run parameters (delta, source, executor, limits).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigIssue),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphIssue {
    #[error("graph has no vertices")]
    Empty,

    #[error("edge {edge} has negative weight {weight}")]
    NegativeWeight { edge: usize, weight: f32 },

    #[error("edge {edge} has a non-finite weight")]
    NonFiniteWeight { edge: usize },

    #[error("edge {edge} references vertex {vertex}, but the graph has {vertex_count} vertices")]
    VertexOutOfRange { edge: usize, vertex: u64, vertex_count: usize },

    #[error("malformed CSR offsets: {reason}")]
    MalformedOffsets { reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("delta must be a finite value > 0, got {delta}")]
    NonPositiveDelta { delta: f32 },

    #[error("delta multiplier must be a finite value > 0, got {multiplier}")]
    NonPositiveMultiplier { multiplier: f32 },

    #[error("source vertex {vertex} is out of range for {vertex_count} vertices")]
    SourceOutOfRange { vertex: u64, vertex_count: usize },

    #[error("thread pool: {0}")]
    ThreadPool(String),

    #[error("environment variable {key} has unusable value {value:?}")]
    BadEnvValue { key: String, value: String },

    #[error("config json: {0}")]
    Json(String),
}

impl SsspError {
    /// Status code reported through the C ABI. 0 is success, -3 is reserved for null pointers.
    pub fn code(&self) -> i32 {
        match self {
            SsspError::InvalidGraph(GraphIssue::Empty) => -1,
            SsspError::InvalidConfiguration(ConfigIssue::SourceOutOfRange { .. }) => -2,
            SsspError::InvalidGraph(GraphIssue::MalformedOffsets { .. }) => -4,
            SsspError::InvalidGraph(_) => -6,
            SsspError::InvalidConfiguration(_) => -7,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for SsspError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        ConfigIssue::ThreadPool(e.to_string()).into()
    }
}

impl From<serde_json::Error> for SsspError {
    fn from(e: serde_json::Error) -> Self {
        ConfigIssue::Json(e.to_string()).into()
    }
}
