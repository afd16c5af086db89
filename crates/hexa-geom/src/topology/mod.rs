//! Topological entities of a geometric object
//!
//! Nodes, edges, faces and parts are stored per object and addressed by their
//! local index. Each also carries a global id, unique across a [`crate::Model`],
//! and the id of the object that owns it.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::curve::{Curve, CurveError};

macro_rules! local_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }
    };
}

local_id!(
    /// Index of a node within its object
    NodeId,
    "node"
);
local_id!(
    /// Index of an edge within its object
    EdgeId,
    "edge"
);
local_id!(
    /// Index of a face within its object
    FaceId,
    "face"
);
local_id!(
    /// Index of a part within its object
    PartId,
    "part"
);

/// Error type for topological model operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),
    #[error("Face not found: {0}")]
    FaceNotFound(FaceId),
    #[error("Part not found: {0}")]
    PartNotFound(PartId),
    #[error("No edge connects {0} and {1}")]
    NoEdgeBetween(NodeId, NodeId),
    #[error("Face loop of {0} is not closed")]
    OpenFaceLoop(FaceId),
    #[error("{0} has more than three adjacent parts")]
    TooManyParts(FaceId),
    #[error("Object not found: {0}")]
    ObjectNotFound(Uuid),
    #[error(transparent)]
    Curve(#[from] CurveError),
}

/// Result type for topological model operations
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Role of a node in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeKind {
    /// Corner of the model; becomes a mesh vertex
    #[default]
    Vertex,
    /// Construction point such as an arc center; never meshed on its own
    Shape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeomNode {
    pub id: NodeId,
    /// Model-wide id, assigned when the object joins a model
    pub gid: Option<u32>,
    /// Owning object
    pub object: Uuid,
    pub name: String,
    /// Position in object-local coordinates
    pub position: DVec3,
    pub kind: NodeKind,
    /// Keep this node as a standalone mesh vertex
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeomEdge {
    pub id: EdgeId,
    pub gid: Option<u32>,
    pub object: Uuid,
    pub name: String,
    pub curve: Curve,
}

/// Edge use within a face loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceEdge {
    pub edge: EdgeId,
    /// +1 when the loop follows the edge's own direction, -1 otherwise
    pub winding: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeomFace {
    pub id: FaceId,
    pub gid: Option<u32>,
    pub object: Uuid,
    pub name: String,
    /// Edge loop; edge `i` runs from `nodes[i]` to `nodes[i + 1]`
    pub edges: Vec<FaceEdge>,
    pub nodes: Vec<NodeId>,
    /// Adjacent parts
    pub parts: [Option<PartId>; 3],
}

impl GeomFace {
    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.iter().any(|e| e.edge == edge)
    }

    pub fn has_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn part_count(&self) -> usize {
        self.parts.iter().flatten().count()
    }

    /// Boundary face: exactly one adjacent part
    pub fn is_external(&self) -> bool {
        self.part_count() == 1
    }

    /// Record an adjacent part in the first free slot
    pub fn add_part(&mut self, part: PartId) -> TopologyResult<()> {
        if self.parts.contains(&Some(part)) {
            return Ok(());
        }
        let slot = self
            .parts
            .iter_mut()
            .find(|p| p.is_none())
            .ok_or(TopologyError::TooManyParts(self.id))?;
        *slot = Some(part);
        Ok(())
    }
}

/// Cross-section descriptor of a part, passed through to analysis setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartSection {
    Solid { formulation: String },
    Shell { formulation: String, thickness: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeomPart {
    pub id: PartId,
    pub gid: Option<u32>,
    pub object: Uuid,
    pub name: String,
    pub material: Option<u32>,
    pub section: Option<PartSection>,
}
