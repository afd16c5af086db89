//! Multi-block structured mesher
//!
//! A [`MultiBlock`] is authored as a node list plus blocks referencing those
//! nodes by index. Adjacent blocks share corners by referencing the same node
//! index; coordinates are never compared. Generation runs in stages:
//! collect and weld the block topology, classify shared entities, subdivide
//! and interpolate each block, then emit the welded mesh.

mod generator;
mod interpolate;
mod topology;

use glam::DVec3;
use hexa_geom::{CurveKind, EdgeId, FaceId, NodeId, NodeKind, PartId};
use serde::{Deserialize, Serialize};

use crate::block::{BLOCK_EDGES, Block, CurvedEdge, Grading, face_edge};
use crate::error::{MeshError, MeshResult};
use crate::mesh::HexMesh;

pub use interpolate::{EdgeGrid, trilinear};

/// Node of a block set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbNode {
    /// Object-local position
    pub position: DVec3,
    /// Geometric node this point realizes, if any
    pub id: Option<NodeId>,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiBlock {
    nodes: Vec<MbNode>,
    blocks: Vec<Block>,
}

impl MultiBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[MbNode] {
        &self.nodes
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn add_node(&mut self, position: DVec3) -> usize {
        self.add_node_with_kind(position, NodeKind::Vertex)
    }

    pub fn add_node_with_kind(&mut self, position: DVec3, kind: NodeKind) -> usize {
        self.nodes.push(MbNode {
            position,
            id: None,
            kind,
        });
        self.nodes.len() - 1
    }

    fn node_mut(&mut self, node: usize) -> MeshResult<&mut MbNode> {
        self.nodes.get_mut(node).ok_or_else(|| {
            MeshError::InvalidBlockTopology(format!("node index {node} out of range"))
        })
    }

    /// Bind a node to a geometric node id.
    ///
    /// Ids are unique: assigning one already held by another node moves it,
    /// so the last assignment wins.
    pub fn set_node_id(&mut self, node: usize, id: NodeId) -> MeshResult<()> {
        self.node_mut(node)?;
        for (i, n) in self.nodes.iter_mut().enumerate() {
            if i != node && n.id == Some(id) {
                tracing::debug!("Node id {} moved from block node {} to {}", id, i, node);
                n.id = None;
            }
        }
        self.node_mut(node)?.id = Some(id);
        Ok(())
    }

    /// Node currently bound to a geometric node id
    pub fn find_node(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == Some(id))
    }

    /// Add a block; corner order follows [`crate::block::CORNER_IJK`]
    pub fn add_block(&mut self, part: PartId, nodes: [usize; 8], divisions: [u32; 3]) -> usize {
        self.blocks.push(Block::new(part, nodes, divisions));
        self.blocks.len() - 1
    }

    pub fn block(&self, block: usize) -> MeshResult<&Block> {
        self.blocks.get(block).ok_or_else(|| {
            MeshError::InvalidBlockTopology(format!("block index {block} out of range"))
        })
    }

    pub fn block_mut(&mut self, block: usize) -> MeshResult<&mut Block> {
        self.blocks.get_mut(block).ok_or_else(|| {
            MeshError::InvalidBlockTopology(format!("block index {block} out of range"))
        })
    }

    pub fn set_block_grading(&mut self, block: usize, grading: [Grading; 3]) -> MeshResult<()> {
        self.block_mut(block)?.grading = grading;
        Ok(())
    }

    /// Classify all six faces of a block at once
    pub fn set_block_face_ids(&mut self, block: usize, ids: [Option<FaceId>; 6]) -> MeshResult<()> {
        self.block_mut(block)?.face_ids = ids;
        Ok(())
    }

    pub fn set_block_edge_id(&mut self, block: usize, edge: usize, id: EdgeId) -> MeshResult<()> {
        let b = self.block_mut(block)?;
        let slot = b.edge_ids.get_mut(edge).ok_or_else(|| {
            MeshError::InvalidBlockTopology(format!("block edge {edge} out of range"))
        })?;
        *slot = Some(id);
        Ok(())
    }

    /// Mark a block edge as curved
    pub fn set_curved_edge(
        &mut self,
        block: usize,
        edge: usize,
        kind: CurveKind,
        control: Option<usize>,
    ) -> MeshResult<()> {
        if edge >= BLOCK_EDGES.len() {
            return Err(MeshError::InvalidBlockTopology(format!(
                "block edge {edge} out of range"
            )));
        }
        let b = self.block_mut(block)?;
        b.curved[edge] = match kind {
            CurveKind::Line => None,
            _ => Some(CurvedEdge { kind, control }),
        };
        Ok(())
    }

    /// Classify the four edges of a block face, in face-side order
    pub fn set_face_edge_ids(
        &mut self,
        block: usize,
        face: usize,
        ids: [Option<EdgeId>; 4],
    ) -> MeshResult<()> {
        for (side, id) in ids.into_iter().enumerate() {
            let edge = local_face_edge(face, side)?;
            self.block_mut(block)?.edge_ids[edge] = id;
        }
        Ok(())
    }

    /// Mark side `side` of a block face as curved
    pub fn set_face_curved_edge(
        &mut self,
        block: usize,
        face: usize,
        side: usize,
        kind: CurveKind,
        control: Option<usize>,
    ) -> MeshResult<()> {
        let edge = local_face_edge(face, side)?;
        self.set_curved_edge(block, edge, kind, control)
    }

    /// Run a full meshing pass over the block set
    pub fn generate(&self, check_orientation: bool) -> MeshResult<HexMesh> {
        let topo = topology::BlockTopology::build(self)?;
        generator::generate(self, &topo, check_orientation)
    }
}

fn local_face_edge(face: usize, side: usize) -> MeshResult<usize> {
    face_edge(face, side).ok_or_else(|| {
        MeshError::InvalidBlockTopology(format!("face {face} side {side} out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_node_id_wins() {
        let mut mb = MultiBlock::new();
        let a = mb.add_node(DVec3::ZERO);
        let b = mb.add_node(DVec3::X);
        mb.set_node_id(a, NodeId(5)).unwrap();
        mb.set_node_id(b, NodeId(5)).unwrap();
        assert_eq!(mb.find_node(NodeId(5)), Some(b));
        assert_eq!(mb.nodes()[a].id, None);
        assert!(mb.set_node_id(9, NodeId(1)).is_err());
    }

    #[test]
    fn test_face_relative_edge_addressing() {
        let mut mb = MultiBlock::new();
        let b = mb.add_block(PartId(0), [0, 1, 2, 3, 4, 5, 6, 7], [1, 1, 1]);
        mb.set_face_edge_ids(b, 5, [Some(EdgeId(10)), None, None, Some(EdgeId(13))])
            .unwrap();
        // face 5 is (4, 5, 6, 7): side 0 is edge 4, side 3 is edge 7
        assert_eq!(mb.blocks()[b].edge_ids[4], Some(EdgeId(10)));
        assert_eq!(mb.blocks()[b].edge_ids[7], Some(EdgeId(13)));

        mb.set_face_curved_edge(b, 0, 1, CurveKind::CircularArc, Some(3))
            .unwrap();
        // face 0 is (0, 1, 5, 4): side 1 is edge 9
        assert_eq!(
            mb.blocks()[b].curved[9],
            Some(CurvedEdge {
                kind: CurveKind::CircularArc,
                control: Some(3)
            })
        );
        mb.set_curved_edge(b, 9, CurveKind::Line, None).unwrap();
        assert_eq!(mb.blocks()[b].curved[9], None);
    }

    #[test]
    fn test_out_of_range_addressing() {
        let mut mb = MultiBlock::new();
        let b = mb.add_block(PartId(0), [0, 1, 2, 3, 4, 5, 6, 7], [1, 1, 1]);
        assert!(mb.set_block_edge_id(b, 12, EdgeId(0)).is_err());
        assert!(mb.set_face_edge_ids(b, 6, [None; 4]).is_err());
        assert!(mb.set_block_face_ids(3, [None; 6]).is_err());
    }
}
