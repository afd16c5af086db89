//! Hexahedral mesh output
//!
//! The mesh carries, besides its elements, the classification of every
//! vertex against the topological model and the boundary faces and edges
//! used for rendering and boundary conditions.

mod normals;
mod smooth;

use glam::DVec3;
use hexa_geom::{EdgeId, FaceId, NodeId, PartId};
use serde::{Deserialize, Serialize};

pub use normals::{calculate_face_normals, quad_normal, triangle_normal};
pub use smooth::{auto_smooth, smooth};

/// Topological entity a vertex primarily belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VertexClass {
    #[default]
    Interior,
    Face(FaceId),
    Edge(EdgeId),
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    /// Object-local position
    pub position: DVec3,
    pub class: VertexClass,
    /// Every classified face the vertex lies on, ascending
    pub faces: Vec<FaceId>,
    /// Preserved as a standalone vertex
    pub required: bool,
}

impl MeshVertex {
    pub fn new(position: DVec3) -> Self {
        Self {
            position,
            class: VertexClass::Interior,
            faces: Vec::new(),
            required: false,
        }
    }

    pub(crate) fn add_face(&mut self, face: FaceId) {
        if let Err(pos) = self.faces.binary_search(&face) {
            self.faces.insert(pos, face);
        }
    }
}

/// Hexahedral element; corners follow the block corner numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexElement {
    pub nodes: [u32; 8],
    pub part: PartId,
}

/// Boundary quad, wound with its normal pointing out of the owning block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshFace {
    pub nodes: [u32; 4],
    pub face_id: Option<FaceId>,
    pub smoothing_group: u32,
}

/// Segment of a classified edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshEdge {
    pub nodes: [u32; 2],
    pub edge_id: EdgeId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HexMesh {
    pub vertices: Vec<MeshVertex>,
    pub elements: Vec<HexElement>,
    pub faces: Vec<MeshFace>,
    pub edges: Vec<MeshEdge>,
}

impl HexMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn position(&self, vertex: usize) -> Option<DVec3> {
        self.vertices.get(vertex).map(|v| v.position)
    }

    /// Primary face of a vertex: the lowest-numbered classified face it lies on
    ///
    /// A vertex on an edge or corner shared by several classified faces
    /// reports only one of them here. Use [`Self::faces_of`] or
    /// [`Self::vertices_on_face`] to test membership in a given face.
    pub fn face_of(&self, vertex: usize) -> Option<FaceId> {
        self.vertices.get(vertex)?.faces.first().copied()
    }

    /// All classified faces a vertex lies on
    pub fn faces_of(&self, vertex: usize) -> &[FaceId] {
        self.vertices
            .get(vertex)
            .map(|v| v.faces.as_slice())
            .unwrap_or(&[])
    }

    /// Edge a vertex lies on; corner nodes report `None`
    pub fn edge_of(&self, vertex: usize) -> Option<EdgeId> {
        match self.vertices.get(vertex)?.class {
            VertexClass::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// Geometric node a vertex was welded from
    pub fn node_of(&self, vertex: usize) -> Option<NodeId> {
        match self.vertices.get(vertex)?.class {
            VertexClass::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Vertex welded from a geometric node
    pub fn vertex_of_node(&self, node: NodeId) -> Option<usize> {
        self.vertices
            .iter()
            .position(|v| v.class == VertexClass::Node(node))
    }

    pub fn part_of(&self, element: usize) -> Option<PartId> {
        self.elements.get(element).map(|e| e.part)
    }

    pub fn vertices_on_face(&self, face: FaceId) -> Vec<usize> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.faces.binary_search(&face).is_ok())
            .map(|(i, _)| i)
            .collect()
    }

    /// Axis-aligned bounds of all vertices
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.min(v.position), hi.max(v.position))
        }))
    }

    /// Number of distinct smoothing groups
    pub fn smoothing_group_count(&self) -> usize {
        let mut groups: Vec<u32> = self.faces.iter().map(|f| f.smoothing_group).collect();
        groups.sort_unstable();
        groups.dedup();
        groups.len()
    }

    /// Outward normals of the boundary faces
    pub fn face_normals(&self) -> Vec<DVec3> {
        let positions: Vec<DVec3> = self.vertices.iter().map(|v| v.position).collect();
        let quads: Vec<[u32; 4]> = self.faces.iter().map(|f| f.nodes).collect();
        calculate_face_normals(&positions, &quads)
    }
}
