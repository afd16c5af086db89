//! Box: a single block

use glam::DVec3;
use hexa_geom::{Curve, FaceId, GeomObject, NodeId, NodeKind, PartId};
use serde::{Deserialize, Serialize};

use super::{add_bound_node, check_divisions, check_positive, classify_edges_from_topology};
use crate::block::{BLOCK_FACES, CORNER_IJK, Grading};
use crate::constants::DEFAULT_DIVISIONS;
use crate::error::MeshResult;
use crate::multiblock::MultiBlock;

/// Edges of the box as node pairs: bottom loop, top loop, then verticals
pub(super) const BOX_EDGES: [[u32; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Rectangular box centered on the z axis, resting on z = 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxShape {
    /// Extent along x
    pub width: f64,
    /// Extent along y
    pub height: f64,
    /// Extent along z
    pub depth: f64,
    pub divisions: [u32; 3],
    pub grading: [Grading; 3],
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            divisions: [DEFAULT_DIVISIONS; 3],
            grading: [Grading::uniform(); 3],
        }
    }
}

impl BoxShape {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
            ..Self::default()
        }
    }

    pub fn with_divisions(mut self, divisions: [u32; 3]) -> Self {
        self.divisions = divisions;
        self
    }

    pub fn with_grading(mut self, grading: [Grading; 3]) -> Self {
        self.grading = grading;
        self
    }

    pub fn validate(&self) -> MeshResult<()> {
        check_positive("width", self.width)?;
        check_positive("height", self.height)?;
        check_positive("depth", self.depth)?;
        for (axis, &n) in ["nx", "ny", "nz"].iter().zip(&self.divisions) {
            check_divisions(axis, n)?;
        }
        for g in &self.grading {
            g.validate()?;
        }
        Ok(())
    }

    /// Corner positions in block corner order
    pub fn corners(&self) -> [DVec3; 8] {
        let (w, h) = (self.width * 0.5, self.height * 0.5);
        CORNER_IJK.map(|[i, j, k]| {
            DVec3::new(
                if i == 0 { -w } else { w },
                if j == 0 { -h } else { h },
                k as f64 * self.depth,
            )
        })
    }

    pub fn build_object(&self, name: &str) -> MeshResult<GeomObject> {
        self.validate()?;
        let mut object = GeomObject::new(name);
        for p in self.corners() {
            object.add_node(p, NodeKind::Vertex);
        }
        for [a, b] in BOX_EDGES {
            object.add_edge(Curve::line(NodeId(a), NodeId(b)))?;
        }
        let part = object.add_part("Part1");
        for cycle in BLOCK_FACES {
            let nodes = cycle.map(|c| NodeId(c as u32));
            let face = object.add_face_from_nodes(&nodes)?;
            object.attach_face(face, part)?;
        }
        Ok(object)
    }

    pub fn build_blocks(&self) -> MeshResult<MultiBlock> {
        let object = self.build_object("box")?;
        let mut mb = MultiBlock::new();
        let mut nodes = [0; 8];
        for (c, slot) in nodes.iter_mut().enumerate() {
            *slot = add_bound_node(&mut mb, &object, NodeId(c as u32))?;
        }

        let b = mb.add_block(PartId(0), nodes, self.divisions);
        mb.set_block_grading(b, self.grading)?;
        mb.set_block_face_ids(b, std::array::from_fn(|f| Some(FaceId(f as u32))))?;
        classify_edges_from_topology(&mut mb, &object)?;
        Ok(mb)
    }
}
