//! Box with a spherical cavity
//!
//! Twenty-four blocks fill the space between the box walls and the sphere.
//! Every box wall is split into quarters at its edge and face midpoints, and
//! the sphere into 24 matching patches bounded by great-circle arcs about the
//! sphere center. Each block joins one wall quarter to one sphere patch.
//!
//! ```text
//! block nodes  0..26   box wall grid (3 x 3 x 3 less its center)
//!              26..52  points on the sphere
//!              52      sphere center, control of every arc
//! ```

use glam::DVec3;
use hexa_geom::{Curve, CurveKind, EdgeId, FaceId, GeomObject, NodeId, NodeKind, PartId};
use serde::{Deserialize, Serialize};

use super::box_block::BOX_EDGES;
use super::{add_bound_node, check_divisions, check_positive};
use crate::block::{BLOCK_EDGES, BLOCK_FACES, EDGE_AXIS, Grading};
use crate::constants::{SPHERE_IN_BOX_DIVISIONS, SPHERE_IN_BOX_RADIAL_DIVISIONS, UNIFORM_BIAS};
use crate::error::{MeshError, MeshResult};
use crate::multiblock::MultiBlock;

/// Geometric id of the sphere center
const CENTER: u32 = 16;

/// Block nodes on the box walls; the rest lie on the sphere
const WALL_NODES: usize = 26;

/// Arcs on the sphere: bottom loop, top loop, verticals
const ARC_EDGES: [[u32; 2]; 12] = [
    [8, 9],
    [9, 10],
    [10, 11],
    [11, 8],
    [12, 13],
    [13, 14],
    [14, 15],
    [15, 12],
    [8, 12],
    [9, 13],
    [10, 14],
    [11, 15],
];

/// Sphere faces, wound with the normal pointing into the cavity
const SPHERE_FACES: [[u32; 4]; 6] = [
    [8, 9, 13, 12],
    [9, 10, 14, 13],
    [10, 11, 15, 14],
    [11, 8, 12, 15],
    [8, 11, 10, 9],
    [12, 13, 14, 15],
];

/// Direction from the sphere center of each sphere block node
const SPHERE_DIRECTIONS: [[i8; 3]; 26] = [
    [0, 0, -1],
    [-1, 0, -1],
    [-1, -1, -1],
    [0, -1, -1],
    [1, -1, -1],
    [1, 0, -1],
    [1, 1, -1],
    [0, 1, -1],
    [-1, 1, -1],
    [-1, 0, 0],
    [-1, -1, 0],
    [0, -1, 0],
    [1, -1, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [-1, 1, 0],
    [-1, 0, 1],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
    [-1, 1, 1],
    [0, 0, 1],
];

/// Block node realizing each geometric node but the center
const NODE_SITES: [usize; 16] = [0, 2, 8, 6, 17, 19, 25, 23, 28, 30, 32, 34, 44, 46, 48, 50];

/// Block nodes along each geometric edge: start, midpoint, end
const EDGE_CHAINS: [[usize; 3]; 24] = [
    [0, 1, 2],
    [2, 5, 8],
    [8, 7, 6],
    [6, 3, 0],
    [17, 18, 19],
    [19, 22, 25],
    [25, 24, 23],
    [23, 20, 17],
    [0, 9, 17],
    [2, 11, 19],
    [8, 16, 25],
    [6, 14, 23],
    [28, 29, 30],
    [30, 31, 32],
    [32, 33, 34],
    [34, 27, 28],
    [44, 45, 46],
    [46, 47, 48],
    [48, 49, 50],
    [50, 43, 44],
    [28, 36, 44],
    [30, 38, 46],
    [32, 40, 48],
    [34, 42, 50],
];

/// Corners of each block, with the box face and the sphere face it meets
const BLOCKS: [([usize; 8], [u32; 2]); 24] = [
    ([0, 1, 4, 3, 28, 29, 26, 27], [4, 10]),
    ([1, 2, 5, 4, 29, 30, 31, 26], [4, 10]),
    ([3, 4, 7, 6, 27, 26, 33, 34], [4, 10]),
    ([4, 5, 8, 7, 26, 31, 32, 33], [4, 10]),
    ([0, 28, 27, 3, 9, 36, 35, 12], [3, 9]),
    ([0, 1, 29, 28, 9, 10, 37, 36], [0, 6]),
    ([1, 2, 30, 29, 10, 11, 38, 37], [0, 6]),
    ([30, 2, 5, 31, 38, 11, 13, 39], [1, 7]),
    ([31, 5, 8, 32, 39, 13, 16, 40], [1, 7]),
    ([33, 32, 8, 7, 41, 40, 16, 15], [2, 8]),
    ([34, 33, 7, 6, 42, 41, 15, 14], [2, 8]),
    ([3, 27, 34, 6, 12, 35, 42, 14], [3, 9]),
    ([9, 36, 35, 12, 17, 44, 43, 20], [3, 9]),
    ([9, 10, 37, 36, 17, 18, 45, 44], [0, 6]),
    ([10, 11, 38, 37, 18, 19, 46, 45], [0, 6]),
    ([38, 11, 13, 39, 46, 19, 22, 47], [1, 7]),
    ([39, 13, 16, 40, 47, 22, 25, 48], [1, 7]),
    ([41, 40, 16, 15, 49, 48, 25, 24], [2, 8]),
    ([42, 41, 15, 14, 50, 49, 24, 23], [2, 8]),
    ([12, 35, 42, 14, 20, 43, 50, 23], [3, 9]),
    ([44, 45, 51, 43, 17, 18, 21, 20], [5, 11]),
    ([45, 46, 47, 51, 18, 19, 22, 21], [5, 11]),
    ([43, 51, 49, 50, 20, 21, 24, 23], [5, 11]),
    ([51, 47, 48, 49, 21, 22, 25, 24], [5, 11]),
];

/// Geometric edge joining two adjacent block nodes, if any
fn chain_edge(a: usize, b: usize) -> Option<EdgeId> {
    EDGE_CHAINS
        .iter()
        .position(|chain| {
            chain
                .windows(2)
                .any(|w| (w[0] == a && w[1] == b) || (w[0] == b && w[1] == a))
        })
        .map(|e| EdgeId(e as u32))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereInBoxShape {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Radius of the cavity
    pub radius: f64,
    /// Intervals along x of each block, so the box carries `2 * nx`
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
    /// Intervals between the box walls and the sphere
    pub nr: u32,
    /// Radial bias; above 1 refines toward the sphere
    pub radial_bias: f64,
    /// Refine toward both the box and the sphere
    pub mirrored: bool,
}

impl Default for SphereInBoxShape {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 2.0,
            depth: 2.0,
            radius: 0.5,
            nx: SPHERE_IN_BOX_DIVISIONS,
            ny: SPHERE_IN_BOX_DIVISIONS,
            nz: SPHERE_IN_BOX_DIVISIONS,
            nr: SPHERE_IN_BOX_RADIAL_DIVISIONS,
            radial_bias: UNIFORM_BIAS,
            mirrored: false,
        }
    }
}

impl SphereInBoxShape {
    pub fn new(width: f64, height: f64, depth: f64, radius: f64) -> Self {
        Self {
            width,
            height,
            depth,
            radius,
            ..Self::default()
        }
    }

    /// Set all four division counts
    pub fn with_divisions(mut self, nx: u32, ny: u32, nz: u32, nr: u32) -> Self {
        (self.nx, self.ny, self.nz, self.nr) = (nx, ny, nz, nr);
        self
    }

    pub fn with_radial_bias(mut self, bias: f64, mirrored: bool) -> Self {
        self.radial_bias = bias;
        self.mirrored = mirrored;
        self
    }

    pub fn validate(&self) -> MeshResult<()> {
        check_positive("width", self.width)?;
        check_positive("height", self.height)?;
        check_positive("depth", self.depth)?;
        check_positive("radius", self.radius)?;
        let limit = self.width.min(self.height).min(self.depth) * 0.5;
        if self.radius >= limit {
            return Err(MeshError::InvalidParameter(format!(
                "radius {} does not fit inside the box (must be below {})",
                self.radius, limit
            )));
        }
        check_divisions("nx", self.nx)?;
        check_divisions("ny", self.ny)?;
        check_divisions("nz", self.nz)?;
        check_divisions("nr", self.nr)?;
        self.radial_grading(false).validate()
    }

    /// Sphere center, halfway up the box
    pub fn center(&self) -> DVec3 {
        DVec3::new(0.0, 0.0, self.depth * 0.5)
    }

    /// Radial grading of a block running toward the sphere when `inward`,
    /// toward the box otherwise
    fn radial_grading(&self, inward: bool) -> Grading {
        if self.mirrored {
            Grading::mirrored(self.radial_bias)
        } else if inward {
            Grading::new(1.0 / self.radial_bias)
        } else {
            Grading::new(self.radial_bias)
        }
    }

    /// Box wall grid followed by the sphere points, in block node order
    fn block_node_positions(&self) -> Vec<DVec3> {
        let half = DVec3::new(self.width, self.height, self.depth) * 0.5;
        let mut positions = Vec::with_capacity(WALL_NODES + SPHERE_DIRECTIONS.len());
        for z in -1..=1 {
            for y in -1..=1 {
                for x in -1..=1 {
                    if (x, y, z) != (0, 0, 0) {
                        positions.push(DVec3::new(x as f64, y as f64, z as f64 + 1.0) * half);
                    }
                }
            }
        }
        let center = self.center();
        for [x, y, z] in SPHERE_DIRECTIONS {
            let dir = DVec3::new(x as f64, y as f64, z as f64).normalize();
            positions.push(center + dir * self.radius);
        }
        positions
    }

    pub fn build_object(&self, name: &str) -> MeshResult<GeomObject> {
        self.validate()?;
        let positions = self.block_node_positions();
        let mut object = GeomObject::new(name);
        for site in NODE_SITES {
            object.add_node(positions[site], NodeKind::Vertex);
        }
        object.add_node(self.center(), NodeKind::Shape);
        for [a, b] in BOX_EDGES {
            object.add_edge(Curve::line(NodeId(a), NodeId(b)))?;
        }
        for [a, b] in ARC_EDGES {
            object.add_edge(Curve::circular_arc(NodeId(a), NodeId(b), NodeId(CENTER)))?;
        }

        let part = object.add_part("Part1");
        let box_faces = BLOCK_FACES.map(|cycle| cycle.map(|c| c as u32));
        for cycle in box_faces.iter().chain(&SPHERE_FACES) {
            let nodes = (*cycle).map(NodeId);
            let face = object.add_face_from_nodes(&nodes)?;
            object.attach_face(face, part)?;
        }
        Ok(object)
    }

    pub fn build_blocks(&self) -> MeshResult<MultiBlock> {
        let object = self.build_object("sphere in box")?;
        let mut mb = MultiBlock::new();
        for p in self.block_node_positions() {
            mb.add_node(p);
        }
        for (id, &site) in NODE_SITES.iter().enumerate() {
            mb.set_node_id(site, NodeId(id as u32))?;
        }
        let center = add_bound_node(&mut mb, &object, NodeId(CENTER))?;

        for (b, (nodes, [box_face, sphere_face])) in BLOCKS.iter().enumerate() {
            let on_sphere = |c: usize| nodes[c] >= WALL_NODES;
            let radial = BLOCK_EDGES
                .iter()
                .position(|&[c0, c1]| on_sphere(c0) != on_sphere(c1))
                .map(|e| EDGE_AXIS[e])
                .ok_or_else(|| {
                    MeshError::InvalidBlockTopology(format!("block {b} does not reach the sphere"))
                })?;
            let face_slot = |sphere: bool| {
                BLOCK_FACES
                    .iter()
                    .position(|cycle| cycle.iter().all(|&c| on_sphere(c) == sphere))
                    .ok_or_else(|| {
                        MeshError::InvalidBlockTopology(format!(
                            "block {b} has no face entirely on the {}",
                            if sphere { "sphere" } else { "box" }
                        ))
                    })
            };
            let (wall, patch) = (face_slot(false)?, face_slot(true)?);

            let mut divisions = [self.nx, self.ny, self.nz];
            divisions[radial] = self.nr;
            let mut grading = [Grading::uniform(); 3];
            grading[radial] = self.radial_grading(!on_sphere(0));

            let index = mb.add_block(PartId(0), *nodes, divisions);
            mb.set_block_grading(index, grading)?;
            let mut face_ids = [None; 6];
            face_ids[wall] = Some(FaceId(*box_face));
            face_ids[patch] = Some(FaceId(*sphere_face));
            mb.set_block_face_ids(index, face_ids)?;

            for (e, &[c0, c1]) in BLOCK_EDGES.iter().enumerate() {
                if let Some(id) = chain_edge(nodes[c0], nodes[c1]) {
                    mb.set_block_edge_id(index, e, id)?;
                }
            }
            for side in 0..4 {
                mb.set_face_curved_edge(index, patch, side, CurveKind::CircularArc, Some(center))?;
            }
        }

        tracing::debug!(
            "Sphere in box: {} blocks over {} nodes",
            mb.blocks().len(),
            mb.nodes().len()
        );
        Ok(mb)
    }
}
