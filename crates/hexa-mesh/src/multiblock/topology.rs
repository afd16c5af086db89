//! Collect, weld and classify
//!
//! Builds the global edges and faces of a block set from corner identity
//! alone, checks that blocks agree on everything they share, and merges the
//! classification tags of shared entities.

use std::collections::{HashMap, HashSet};

use hexa_geom::{CurveError, EdgeId, FaceId, NodeKind};

use crate::block::{BLOCK_EDGES, BLOCK_FACES, CurvedEdge, EDGE_AXIS};
use crate::error::{MeshError, MeshResult};

use super::MultiBlock;

/// Edge shared by one or more blocks
#[derive(Debug, Clone)]
pub(crate) struct TopoEdge {
    /// Node pair in the orientation of the first block that referenced it
    pub nodes: [usize; 2],
    pub divisions: u32,
    pub tag: Option<EdgeId>,
    pub curve: Option<CurvedEdge>,
}

/// Face shared by one or two blocks
#[derive(Debug, Clone)]
pub(crate) struct TopoFace {
    /// Corner cycle as seen by the first block that referenced it
    pub nodes: [usize; 4],
    pub tag: Option<FaceId>,
    /// (block, local face) pairs, in block order
    pub blocks: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub(crate) struct BlockTopology {
    /// Distinct corner nodes in order of first reference
    pub corners: Vec<usize>,
    pub edges: Vec<TopoEdge>,
    pub faces: Vec<TopoFace>,
    /// Global edge of each local block edge
    pub block_edges: Vec<[usize; 12]>,
    /// Global face of each local block face
    pub block_faces: Vec<[usize; 6]>,
}

impl BlockTopology {
    pub fn build(mb: &MultiBlock) -> MeshResult<Self> {
        if mb.blocks().is_empty() {
            return Err(MeshError::InvalidBlockTopology("no blocks to mesh".into()));
        }

        let mut topo = BlockTopology {
            corners: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            block_edges: Vec::with_capacity(mb.blocks().len()),
            block_faces: Vec::with_capacity(mb.blocks().len()),
        };
        let mut seen_corners = HashSet::new();
        let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut face_index: HashMap<[usize; 4], usize> = HashMap::new();

        for (b, block) in mb.blocks().iter().enumerate() {
            if block.divisions.contains(&0) {
                return Err(MeshError::InvalidParameter(format!(
                    "block {b} has zero divisions {:?}",
                    block.divisions
                )));
            }
            for grading in &block.grading {
                grading.validate()?;
            }

            for (c, &node) in block.nodes.iter().enumerate() {
                let mb_node = mb.nodes().get(node).ok_or_else(|| {
                    MeshError::InvalidBlockTopology(format!(
                        "block {b} corner {c} references missing node {node}"
                    ))
                })?;
                if mb_node.kind == NodeKind::Shape {
                    return Err(MeshError::InvalidBlockTopology(format!(
                        "block {b} corner {c} references construction node {node}"
                    )));
                }
                if block.nodes[..c].contains(&node) {
                    return Err(MeshError::InvalidBlockTopology(format!(
                        "block {b} repeats node {node}"
                    )));
                }
                if seen_corners.insert(node) {
                    topo.corners.push(node);
                }
            }

            for curve in block.curved.iter().flatten() {
                if let Some(control) = curve.control {
                    if control >= mb.nodes().len() {
                        return Err(MeshError::InvalidBlockTopology(format!(
                            "block {b} curve references missing control node {control}"
                        )));
                    }
                } else if curve.kind.needs_control() {
                    return Err(CurveError::MissingControl(curve.kind).into());
                }
            }

            let mut local_edges = [0; 12];
            for (e, [c0, c1]) in BLOCK_EDGES.iter().enumerate() {
                let (a, z) = (block.nodes[*c0], block.nodes[*c1]);
                let divisions = block.divisions[EDGE_AXIS[e]];
                let key = (a.min(z), a.max(z));
                let g = match edge_index.get(&key) {
                    Some(&g) => {
                        let edge = &mut topo.edges[g];
                        if edge.divisions != divisions {
                            return Err(MeshError::InvalidBlockTopology(format!(
                                "edge {a}-{z} has {} divisions in one block and {divisions} in block {b}",
                                edge.divisions
                            )));
                        }
                        edge.tag = merge(edge.tag, block.edge_ids[e], || {
                            format!("edge {a}-{z} is tagged differently by block {b}")
                        })?;
                        edge.curve = merge(edge.curve, block.curved[e], || {
                            format!("edge {a}-{z} is curved differently by block {b}")
                        })?;
                        g
                    }
                    None => {
                        topo.edges.push(TopoEdge {
                            nodes: [a, z],
                            divisions,
                            tag: block.edge_ids[e],
                            curve: block.curved[e],
                        });
                        edge_index.insert(key, topo.edges.len() - 1);
                        topo.edges.len() - 1
                    }
                };
                local_edges[e] = g;
            }
            topo.block_edges.push(local_edges);

            let mut local_faces = [0; 6];
            for (f, cycle) in BLOCK_FACES.iter().enumerate() {
                let nodes = cycle.map(|c| block.nodes[c]);
                let mut key = nodes;
                key.sort_unstable();
                let g = match face_index.get(&key) {
                    Some(&g) => {
                        let face = &mut topo.faces[g];
                        if face.blocks.len() >= 2 {
                            return Err(MeshError::InvalidBlockTopology(format!(
                                "face {nodes:?} is shared by more than two blocks"
                            )));
                        }
                        if !same_cycle(&face.nodes, &nodes) {
                            return Err(MeshError::InvalidBlockTopology(format!(
                                "block {b} face {f} crosses the loop {:?}",
                                face.nodes
                            )));
                        }
                        face.tag = merge(face.tag, block.face_ids[f], || {
                            format!("face {nodes:?} is tagged differently by block {b}")
                        })?;
                        face.blocks.push((b, f));
                        g
                    }
                    None => {
                        topo.faces.push(TopoFace {
                            nodes,
                            tag: block.face_ids[f],
                            blocks: vec![(b, f)],
                        });
                        face_index.insert(key, topo.faces.len() - 1);
                        topo.faces.len() - 1
                    }
                };
                local_faces[f] = g;
            }
            topo.block_faces.push(local_faces);
        }

        tracing::debug!(
            "Block topology: {} blocks, {} corners, {} edges, {} faces",
            mb.blocks().len(),
            topo.corners.len(),
            topo.edges.len(),
            topo.faces.len()
        );
        Ok(topo)
    }
}

/// Combine two optional tags; both set and different is a conflict
fn merge<T: PartialEq + Copy>(
    current: Option<T>,
    incoming: Option<T>,
    describe: impl FnOnce() -> String,
) -> MeshResult<Option<T>> {
    match (current, incoming) {
        (Some(a), Some(b)) if a != b => Err(MeshError::ClassificationConflict(describe())),
        (Some(a), _) => Ok(Some(a)),
        (None, b) => Ok(b),
    }
}

/// Whether two quads list the same corner loop, in any rotation or direction
fn same_cycle(a: &[usize; 4], b: &[usize; 4]) -> bool {
    (0..4).any(|r| {
        let forward = (0..4).all(|i| a[(i + r) % 4] == b[i]);
        let backward = (0..4).all(|i| a[(r + 4 - i) % 4] == b[i]);
        forward || backward
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Grading;
    use glam::DVec3;
    use hexa_geom::{CurveKind, PartId};

    fn two_cubes() -> MultiBlock {
        let mut mb = MultiBlock::new();
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..3 {
                    mb.add_node(DVec3::new(i as f64, j as f64, k as f64));
                }
            }
        }
        // node index = i + 3 * (j + 2 * k)
        let n = |i: usize, j: usize, k: usize| i + 3 * (j + 2 * k);
        for i in 0..2 {
            mb.add_block(
                PartId(0),
                [
                    n(i, 0, 0),
                    n(i + 1, 0, 0),
                    n(i + 1, 1, 0),
                    n(i, 1, 0),
                    n(i, 0, 1),
                    n(i + 1, 0, 1),
                    n(i + 1, 1, 1),
                    n(i, 1, 1),
                ],
                [1, 1, 1],
            );
        }
        mb
    }

    #[test]
    fn test_shared_entities_are_counted_once() {
        let topo = BlockTopology::build(&two_cubes()).unwrap();
        assert_eq!(topo.corners.len(), 12);
        assert_eq!(topo.edges.len(), 20);
        assert_eq!(topo.faces.len(), 11);
        let shared = topo.block_faces[0][1];
        assert_eq!(shared, topo.block_faces[1][3]);
        assert_eq!(topo.faces[shared].blocks, vec![(0, 1), (1, 3)]);
    }

    #[test]
    fn test_empty_block_set() {
        let err = BlockTopology::build(&MultiBlock::new()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidBlockTopology(_)));
    }

    #[test]
    fn test_dangling_and_duplicate_corners() {
        let mut mb = two_cubes();
        mb.block_mut(1).unwrap().nodes[6] = 99;
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidBlockTopology(_))
        ));

        let mut mb = two_cubes();
        let first = mb.blocks()[0].nodes[0];
        mb.block_mut(0).unwrap().nodes[7] = first;
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidBlockTopology(_))
        ));
    }

    #[test]
    fn test_construction_node_as_corner() {
        let mut mb = two_cubes();
        let c = mb.add_node_with_kind(DVec3::splat(0.5), NodeKind::Shape);
        mb.block_mut(0).unwrap().nodes[0] = c;
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidBlockTopology(_))
        ));
    }

    #[test]
    fn test_mismatched_divisions() {
        let mut mb = two_cubes();
        mb.block_mut(1).unwrap().divisions = [1, 2, 1];
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidBlockTopology(_))
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let mut mb = two_cubes();
        mb.block_mut(0).unwrap().divisions = [0, 1, 1];
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidParameter(_))
        ));

        let mut mb = two_cubes();
        mb.set_block_grading(0, [Grading::new(-1.0), Grading::uniform(), Grading::uniform()])
            .unwrap();
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_classification_conflict() {
        let mut mb = two_cubes();
        mb.block_mut(0).unwrap().face_ids[1] = Some(FaceId(0));
        mb.block_mut(1).unwrap().face_ids[3] = Some(FaceId(1));
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::ClassificationConflict(_))
        ));
    }

    #[test]
    fn test_edge_tag_conflict() {
        let mut mb = two_cubes();
        // edge 1 of block 0 is edge 3 of block 1
        mb.set_block_edge_id(0, 1, EdgeId(2)).unwrap();
        mb.set_block_edge_id(1, 3, EdgeId(3)).unwrap();
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::ClassificationConflict(_))
        ));

        let mut mb = two_cubes();
        mb.set_block_edge_id(0, 1, EdgeId(2)).unwrap();
        mb.set_block_edge_id(1, 3, EdgeId(2)).unwrap();
        assert!(BlockTopology::build(&mb).is_ok());
    }

    #[test]
    fn test_shared_face_with_crossed_loop() {
        let mut mb = two_cubes();
        // block 1 sees the shared face as 4-1-10-7, block 0 as 1-4-10-7
        mb.block_mut(1).unwrap().nodes.swap(4, 7);
        let err = BlockTopology::build(&mb).unwrap_err();
        assert!(matches!(err, MeshError::InvalidBlockTopology(_)));
        assert!(err.to_string().contains("crosses the loop"));
    }

    #[test]
    fn test_one_sided_tag_is_kept() {
        let mut mb = two_cubes();
        mb.block_mut(1).unwrap().face_ids[3] = Some(FaceId(4));
        // edge 1 of block 0 is edge 3 of block 1
        mb.set_block_edge_id(1, 3, EdgeId(2)).unwrap();
        let topo = BlockTopology::build(&mb).unwrap();
        assert_eq!(topo.faces[topo.block_faces[0][1]].tag, Some(FaceId(4)));
        assert_eq!(topo.edges[topo.block_edges[0][1]].tag, Some(EdgeId(2)));
    }

    #[test]
    fn test_curve_conflict() {
        let mut mb = two_cubes();
        let c = mb.add_node_with_kind(DVec3::new(1.0, 0.5, -1.0), NodeKind::Shape);
        mb.set_curved_edge(0, 1, CurveKind::CircularArc, Some(c)).unwrap();
        mb.set_curved_edge(1, 3, CurveKind::GeneralArc, Some(c)).unwrap();
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::ClassificationConflict(_))
        ));
    }

    #[test]
    fn test_missing_control() {
        let mut mb = two_cubes();
        mb.set_curved_edge(0, 0, CurveKind::CircularArc, None).unwrap();
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::DegenerateCurve(CurveError::MissingControl(_)))
        ));
        let mut mb = two_cubes();
        mb.set_curved_edge(0, 0, CurveKind::CircularArc, Some(400)).unwrap();
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidBlockTopology(_))
        ));
    }

    #[test]
    fn test_face_shared_by_three_blocks() {
        let mut mb = two_cubes();
        let copy = mb.blocks()[1].clone();
        mb.add_block(copy.part, copy.nodes, copy.divisions);
        assert!(matches!(
            BlockTopology::build(&mb),
            Err(MeshError::InvalidBlockTopology(_))
        ));
    }

    #[test]
    fn test_same_cycle() {
        assert!(same_cycle(&[0, 1, 2, 3], &[2, 3, 0, 1]));
        assert!(same_cycle(&[0, 1, 2, 3], &[1, 0, 3, 2]));
        assert!(!same_cycle(&[0, 1, 2, 3], &[0, 2, 1, 3]));
    }
}
