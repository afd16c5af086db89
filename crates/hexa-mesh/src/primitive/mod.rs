//! Primitive shapes
//!
//! Each primitive is a static description: node coordinates, edges, faces
//! and a table of blocks with their face classification. The tables feed the
//! generic multi-block mesher; nothing here generates mesh points directly.

mod box_block;
mod sphere_in_box;

pub use box_block::BoxShape;
pub use sphere_in_box::SphereInBoxShape;

use hexa_geom::{CurveKind, GeomObject, NodeId};
use serde::{Deserialize, Serialize};

use crate::block::{BLOCK_EDGES, CurvedEdge};
use crate::error::{MeshError, MeshResult};
use crate::multiblock::MultiBlock;

/// Shape an object is meshed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box(BoxShape),
    SphereInBox(SphereInBoxShape),
    /// Caller-authored block set
    Blocks(MultiBlock),
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Box(_) => "Box",
            Shape::SphereInBox(_) => "Sphere in box",
            Shape::Blocks(_) => "Blocks",
        }
    }

    /// Topological model of the shape
    ///
    /// A caller-authored block set has no edges or faces of its own; its
    /// model holds one node per block node and one part per referenced part.
    pub fn build_object(&self, name: &str) -> MeshResult<GeomObject> {
        match self {
            Shape::Box(s) => s.build_object(name),
            Shape::SphereInBox(s) => s.build_object(name),
            Shape::Blocks(mb) => {
                let mut object = GeomObject::new(name);
                for node in mb.nodes() {
                    object.add_node(node.position, node.kind);
                }
                let parts = mb
                    .blocks()
                    .iter()
                    .map(|b| b.part.index() + 1)
                    .max()
                    .unwrap_or(0);
                for p in 0..parts {
                    object.add_part(format!("Part{}", p + 1));
                }
                Ok(object)
            }
        }
    }

    /// Block set of the shape
    pub fn build_blocks(&self) -> MeshResult<MultiBlock> {
        match self {
            Shape::Box(s) => s.build_blocks(),
            Shape::SphereInBox(s) => s.build_blocks(),
            Shape::Blocks(mb) => Ok(mb.clone()),
        }
    }
}

/// Tag block edges and curves from the topological model.
///
/// A block edge whose two corners are bound to geometric nodes joined by an
/// edge of `object` takes that edge's id; a curved edge also takes its curve,
/// with the control node looked up among the block nodes by id.
pub fn classify_edges_from_topology(mb: &mut MultiBlock, object: &GeomObject) -> MeshResult<()> {
    let mut tagged = 0;
    for b in 0..mb.blocks().len() {
        for (e, &[c0, c1]) in BLOCK_EDGES.iter().enumerate() {
            let block = mb.block(b)?;
            let (Some(n0), Some(n1)) = (
                mb.nodes()[block.nodes[c0]].id,
                mb.nodes()[block.nodes[c1]].id,
            ) else {
                continue;
            };
            let Some(edge_id) = object.find_edge(n0, n1) else {
                continue;
            };
            let curve = &object.edge(edge_id)?.curve;
            let curved = match curve.kind() {
                CurveKind::Line => None,
                kind => Some(CurvedEdge {
                    kind,
                    control: curve
                        .control()
                        .map(|id| find_control(mb, id))
                        .transpose()?,
                }),
            };

            let block = mb.block_mut(b)?;
            block.edge_ids[e] = Some(edge_id);
            block.curved[e] = curved;
            tagged += 1;
        }
    }
    tracing::debug!("Classified {} block edges from '{}'", tagged, object.name);
    Ok(())
}

fn find_control(mb: &MultiBlock, id: NodeId) -> MeshResult<usize> {
    mb.find_node(id).ok_or_else(|| {
        MeshError::InvalidBlockTopology(format!("control {id} has no block node"))
    })
}

/// Add a block node bound to geometric node `id`
fn add_bound_node(mb: &mut MultiBlock, object: &GeomObject, id: NodeId) -> MeshResult<usize> {
    let node = object.node(id)?;
    let index = mb.add_node_with_kind(node.position, node.kind);
    mb.set_node_id(index, id)?;
    Ok(index)
}

/// Reject non-positive or non-finite lengths
fn check_positive(name: &str, value: f64) -> MeshResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MeshError::InvalidParameter(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn check_divisions(name: &str, value: u32) -> MeshResult<()> {
    if value == 0 {
        return Err(MeshError::InvalidParameter(format!(
            "{name} must be at least 1"
        )));
    }
    Ok(())
}
