//! Geometric object
//!
//! A [`GeomObject`] owns the topological entities of one solid together with
//! its placement. Node positions are stored object-local; every query that
//! returns coordinates in model space says so.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::curve::{Curve, CurveGeometry};
use crate::model::ItemCounters;
use crate::topology::{
    EdgeId, FaceEdge, FaceId, GeomEdge, GeomFace, GeomNode, GeomPart, NodeId, NodeKind, PartId,
    PartSection, TopologyError, TopologyResult,
};
use crate::transform::Transform;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeomObject {
    pub id: Uuid,
    pub name: String,
    pub transform: Transform,
    nodes: Vec<GeomNode>,
    edges: Vec<GeomEdge>,
    faces: Vec<GeomFace>,
    parts: Vec<GeomPart>,
}

impl GeomObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            transform: Transform::IDENTITY,
            nodes: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            parts: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn nodes(&self) -> &[GeomNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GeomEdge] {
        &self.edges
    }

    pub fn faces(&self) -> &[GeomFace] {
        &self.faces
    }

    pub fn parts(&self) -> &[GeomPart] {
        &self.parts
    }

    pub fn node(&self, id: NodeId) -> TopologyResult<&GeomNode> {
        self.nodes
            .get(id.index())
            .ok_or(TopologyError::NodeNotFound(id))
    }

    pub fn edge(&self, id: EdgeId) -> TopologyResult<&GeomEdge> {
        self.edges
            .get(id.index())
            .ok_or(TopologyError::EdgeNotFound(id))
    }

    pub fn face(&self, id: FaceId) -> TopologyResult<&GeomFace> {
        self.faces
            .get(id.index())
            .ok_or(TopologyError::FaceNotFound(id))
    }

    pub fn part(&self, id: PartId) -> TopologyResult<&GeomPart> {
        self.parts
            .get(id.index())
            .ok_or(TopologyError::PartNotFound(id))
    }

    pub fn part_mut(&mut self, id: PartId) -> TopologyResult<&mut GeomPart> {
        self.parts
            .get_mut(id.index())
            .ok_or(TopologyError::PartNotFound(id))
    }

    /// Add a node at an object-local position
    pub fn add_node(&mut self, position: DVec3, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(GeomNode {
            id,
            gid: None,
            object: self.id,
            name: format!("Node{}", id.0 + 1),
            position,
            kind,
            required: false,
        });
        id
    }

    /// Add an edge; every node the curve references must exist
    pub fn add_edge(&mut self, curve: Curve) -> TopologyResult<EdgeId> {
        for node in curve.nodes().into_iter().chain(curve.control()) {
            self.node(node)?;
        }
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(GeomEdge {
            id,
            gid: None,
            object: self.id,
            name: format!("Edge{}", id.0 + 1),
            curve,
        });
        Ok(id)
    }

    /// First edge joining two nodes, in either direction
    pub fn find_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.edges
            .iter()
            .find(|e| {
                let [n0, n1] = e.curve.nodes();
                (n0 == a && n1 == b) || (n0 == b && n1 == a)
            })
            .map(|e| e.id)
    }

    /// Add a face from a closed node cycle.
    ///
    /// Each side `nodes[i] -> nodes[i + 1]` must already be an edge; its
    /// winding records whether the loop runs along or against that edge.
    pub fn add_face_from_nodes(&mut self, nodes: &[NodeId]) -> TopologyResult<FaceId> {
        let id = FaceId(self.faces.len() as u32);
        if nodes.len() < 2 {
            return Err(TopologyError::OpenFaceLoop(id));
        }
        let mut edges = Vec::with_capacity(nodes.len());
        for (i, &a) in nodes.iter().enumerate() {
            let b = nodes[(i + 1) % nodes.len()];
            let edge = self
                .find_edge(a, b)
                .ok_or(TopologyError::NoEdgeBetween(a, b))?;
            let winding = if self.edges[edge.index()].curve.nodes()[0] == a {
                1
            } else {
                -1
            };
            edges.push(FaceEdge { edge, winding });
        }
        self.faces.push(GeomFace {
            id,
            gid: None,
            object: self.id,
            name: format!("Face{}", id.0 + 1),
            edges,
            nodes: nodes.to_vec(),
            parts: [None; 3],
        });
        Ok(id)
    }

    pub fn add_part(&mut self, name: impl Into<String>) -> PartId {
        let id = PartId(self.parts.len() as u32);
        self.parts.push(GeomPart {
            id,
            gid: None,
            object: self.id,
            name: name.into(),
            material: None,
            section: None,
        });
        id
    }

    pub fn set_part_section(&mut self, part: PartId, section: PartSection) -> TopologyResult<()> {
        self.part_mut(part)?.section = Some(section);
        Ok(())
    }

    /// Record `part` as adjacent to `face`
    pub fn attach_face(&mut self, face: FaceId, part: PartId) -> TopologyResult<()> {
        self.part(part)?;
        let f = self
            .faces
            .get_mut(face.index())
            .ok_or(TopologyError::FaceNotFound(face))?;
        f.add_part(part)
    }

    /// Flag a node so the mesher keeps it as a standalone vertex
    pub fn make_required(&mut self, node: NodeId) -> TopologyResult<()> {
        let n = self
            .nodes
            .get_mut(node.index())
            .ok_or(TopologyError::NodeNotFound(node))?;
        n.required = true;
        Ok(())
    }

    /// Node position in model space
    pub fn node_position(&self, node: NodeId) -> TopologyResult<DVec3> {
        Ok(self.transform.local_to_global(self.node(node)?.position))
    }

    /// Curve of an edge evaluated on object-local node positions
    pub fn curve_local(&self, edge: EdgeId) -> TopologyResult<CurveGeometry> {
        let curve = &self.edge(edge)?.curve;
        Ok(curve.resolve(
            |id| self.nodes.get(id.index()).map(|n| n.position),
            &Transform::IDENTITY,
        )?)
    }

    /// Curve of an edge evaluated on model-space node positions
    pub fn curve_global(&self, edge: EdgeId) -> TopologyResult<CurveGeometry> {
        let curve = &self.edge(edge)?.curve;
        Ok(curve.resolve(
            |id| {
                self.nodes
                    .get(id.index())
                    .map(|n| self.transform.local_to_global(n.position))
            },
            &self.transform,
        )?)
    }

    /// Arc length of an edge in model space
    pub fn edge_length(&self, edge: EdgeId) -> TopologyResult<f64> {
        Ok(self.curve_global(edge)?.length())
    }

    /// Model-space point on an edge at parameter `l`
    pub fn edge_point(&self, edge: EdgeId, l: f64) -> TopologyResult<DVec3> {
        Ok(self.curve_global(edge)?.point(l))
    }

    /// Unit tangent of an edge at `l`, in the curve's local plane
    pub fn edge_tangent(&self, edge: EdgeId, l: f64) -> TopologyResult<DVec2> {
        Ok(self.curve_global(edge)?.tangent(l))
    }

    /// Check every reference and that each face loop closes
    pub fn validate(&self) -> TopologyResult<()> {
        for edge in &self.edges {
            for node in edge.curve.nodes().into_iter().chain(edge.curve.control()) {
                self.node(node)?;
            }
        }
        for face in &self.faces {
            if face.edges.len() != face.nodes.len() || face.nodes.len() < 2 {
                return Err(TopologyError::OpenFaceLoop(face.id));
            }
            for (i, fe) in face.edges.iter().enumerate() {
                let [n0, n1] = self.edge(fe.edge)?.curve.nodes();
                let (from, to) = if fe.winding >= 0 { (n0, n1) } else { (n1, n0) };
                let expected_to = face.nodes[(i + 1) % face.nodes.len()];
                if from != face.nodes[i] || to != expected_to {
                    return Err(TopologyError::OpenFaceLoop(face.id));
                }
            }
            for part in face.parts.iter().flatten() {
                self.part(*part)?;
            }
        }
        Ok(())
    }

    /// Assign model-wide ids to every entity that lacks one
    pub fn assign_global_ids(&mut self, counters: &mut ItemCounters) {
        for n in &mut self.nodes {
            if n.gid.is_none() {
                n.gid = Some(counters.next_node());
            }
        }
        for e in &mut self.edges {
            if e.gid.is_none() {
                e.gid = Some(counters.next_edge());
            }
        }
        for f in &mut self.faces {
            if f.gid.is_none() {
                f.gid = Some(counters.next_face());
            }
        }
        for p in &mut self.parts {
            if p.gid.is_none() {
                p.gid = Some(counters.next_part());
            }
        }
    }
}
