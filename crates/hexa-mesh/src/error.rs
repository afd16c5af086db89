//! Mesh generation errors

use hexa_geom::{CurveError, TopologyError};

/// Error type for a meshing pass; any of these aborts the whole pass
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error(transparent)]
    DegenerateCurve(#[from] CurveError),
    #[error("Invalid block topology: {0}")]
    InvalidBlockTopology(String),
    #[error("Classification conflict: {0}")]
    ClassificationConflict(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Geometry error: {0}")]
    Topology(String),
}

impl From<TopologyError> for MeshError {
    fn from(err: TopologyError) -> Self {
        match err {
            TopologyError::Curve(e) => MeshError::DegenerateCurve(e),
            other => MeshError::Topology(other.to_string()),
        }
    }
}

/// Result type for mesh generation
pub type MeshResult<T> = Result<T, MeshError>;
