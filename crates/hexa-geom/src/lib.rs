//! Curve Kernel and Topological Model
//!
//! This crate provides:
//! - Parametric curves (lines, circular arcs, general and axis arcs) with
//!   length, point and tangent evaluation
//! - Nodes, edges, faces and parts owned by a placed geometric object
//! - A model that numbers entities uniquely across objects

pub mod curve;
pub mod model;
pub mod object;
pub mod topology;
pub mod transform;

// Re-exports for convenience
pub use curve::{
    ArcAxis, CircleArc, Curve, CurveError, CurveGeometry, CurveKind, CurveResult, GeneralArc,
    PlaneFrame,
};
pub use model::{ItemCounters, Model};
pub use object::GeomObject;
pub use topology::{
    EdgeId, FaceEdge, FaceId, GeomEdge, GeomFace, GeomNode, GeomPart, NodeId, NodeKind, PartId,
    PartSection, TopologyError, TopologyResult,
};
pub use transform::Transform;
