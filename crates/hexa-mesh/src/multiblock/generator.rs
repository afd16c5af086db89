//! Subdivide, interpolate and emit
//!
//! Blocks are processed in order. Points on a shared edge or face are emitted
//! by the first block that reaches them and looked up by every later block
//! through the integer grid mapping of that entity.

use glam::DVec3;

use crate::block::{BLOCK_EDGES, BLOCK_FACES, Block, EDGE_AXIS};
use crate::error::{MeshError, MeshResult};
use crate::mesh::{HexElement, HexMesh, MeshEdge, MeshFace, MeshVertex, VertexClass};

use super::MultiBlock;
use super::interpolate::{EdgeGrid, trilinear};
use super::topology::{BlockTopology, TopoFace};

const UNSET: u32 = u32::MAX;

/// Maps integer `(s, t)` on a block edge or face onto block grid coordinates
struct GridMap {
    origin: [i64; 3],
    du: [i64; 3],
    dv: [i64; 3],
    nu: usize,
    nv: usize,
}

impl GridMap {
    /// Map spanned by local corners `c0 -> c1` (s) and `c0 -> c3` (t)
    fn new(block: &Block, c0: usize, c1: usize, c3: usize) -> Self {
        let origin = block.corner_ijk(c0);
        let (du, nu) = step(origin, block.corner_ijk(c1));
        let (dv, nv) = step(origin, block.corner_ijk(c3));
        Self {
            origin,
            du,
            dv,
            nu,
            nv,
        }
    }

    fn ijk(&self, s: usize, t: usize) -> [usize; 3] {
        std::array::from_fn(|d| {
            (self.origin[d] + self.du[d] * s as i64 + self.dv[d] * t as i64) as usize
        })
    }
}

/// Unit grid direction and interval count from one corner to another
fn step(from: [i64; 3], to: [i64; 3]) -> ([i64; 3], usize) {
    let delta: [i64; 3] = std::array::from_fn(|d| to[d] - from[d]);
    let n = delta.iter().map(|x| x.unsigned_abs()).sum::<u64>() as i64;
    if n == 0 {
        return ([0; 3], 0);
    }
    (delta.map(|x| x / n), n as usize)
}

struct Generator<'a> {
    mb: &'a MultiBlock,
    topo: &'a BlockTopology,
    mesh: HexMesh,
    corner_vertex: Vec<u32>,
    /// Vertex ids along each global edge, in its stored orientation
    edge_points: Vec<Option<Vec<u32>>>,
    /// Vertex grid of each global face, `s` fastest
    face_points: Vec<Option<Vec<u32>>>,
    block_ids: Vec<Vec<u32>>,
}

pub(crate) fn generate(
    mb: &MultiBlock,
    topo: &BlockTopology,
    check_orientation: bool,
) -> MeshResult<HexMesh> {
    let mut generator = Generator {
        mb,
        topo,
        mesh: HexMesh::default(),
        corner_vertex: vec![UNSET; mb.nodes().len()],
        edge_points: vec![None; topo.edges.len()],
        face_points: vec![None; topo.faces.len()],
        block_ids: Vec::with_capacity(mb.blocks().len()),
    };

    generator.weld_corners();
    for b in 0..mb.blocks().len() {
        generator.mesh_block(b, check_orientation)?;
    }
    generator.emit_boundary();
    generator.classify();

    tracing::debug!(
        "Generated {} vertices, {} elements, {} boundary faces, {} edge segments",
        generator.mesh.vertex_count(),
        generator.mesh.element_count(),
        generator.mesh.face_count(),
        generator.mesh.edge_count()
    );
    Ok(generator.mesh)
}

impl Generator<'_> {
    fn push_vertex(&mut self, position: DVec3) -> u32 {
        self.mesh.vertices.push(MeshVertex::new(position));
        (self.mesh.vertices.len() - 1) as u32
    }

    /// One vertex per distinct corner node
    fn weld_corners(&mut self) {
        let (mb, topo) = (self.mb, self.topo);
        for &node in &topo.corners {
            let v = self.push_vertex(mb.nodes()[node].position);
            self.corner_vertex[node] = v;
        }
        tracing::debug!("Welded {} corner vertices", self.topo.corners.len());
    }

    fn mesh_block(&mut self, b: usize, check_orientation: bool) -> MeshResult<()> {
        let (mb, topo) = (self.mb, self.topo);
        let block = &mb.blocks()[b];
        let corners: [DVec3; 8] = block.nodes.map(|n| mb.nodes()[n].position);
        if check_orientation && jacobian(&corners) <= 0.0 {
            tracing::warn!("Block {} is inverted: its corner ordering gives a negative Jacobian", b);
        }

        let [nx, ny, nz] = block.grid_size();
        let mut ids = vec![UNSET; nx * ny * nz];
        for (c, &node) in block.nodes.iter().enumerate() {
            ids[block.grid_index(block.corner_ijk(c).map(|x| x as usize))] =
                self.corner_vertex[node];
        }

        // Edges, in block direction
        let mut edge_positions: Vec<Vec<DVec3>> = Vec::with_capacity(12);
        for (e, &[c0, c1]) in BLOCK_EDGES.iter().enumerate() {
            let g = topo.block_edges[b][e];
            let forward = topo.edges[g].nodes[0] == block.nodes[c0];
            let vertices = match &self.edge_points[g] {
                Some(points) if forward => points.clone(),
                Some(points) => points.iter().rev().copied().collect(),
                None => {
                    let positions = self.edge_curve_points(block, g, e, &corners)?;
                    let n = positions.len() - 1;
                    let mut vertices = Vec::with_capacity(n + 1);
                    vertices.push(self.corner_vertex[block.nodes[c0]]);
                    for p in &positions[1..n] {
                        vertices.push(self.push_vertex(*p));
                    }
                    vertices.push(self.corner_vertex[block.nodes[c1]]);
                    let stored = if forward {
                        vertices.clone()
                    } else {
                        vertices.iter().rev().copied().collect()
                    };
                    self.edge_points[g] = Some(stored);
                    vertices
                }
            };

            let map = GridMap::new(block, c0, c1, c0);
            for (s, &v) in vertices.iter().enumerate() {
                ids[block.grid_index(map.ijk(s, 0))] = v;
            }
            edge_positions.push(
                vertices
                    .iter()
                    .map(|&v| self.mesh.vertices[v as usize].position)
                    .collect(),
            );
        }

        let curved = topo.block_edges[b]
            .iter()
            .any(|&g| topo.edges[g].curve.is_some());
        let [pu, pv, pw] =
            [0, 1, 2].map(|axis| block.grading[axis].checked_parameters(block.divisions[axis]));
        let params = [pu?, pv?, pw?];
        let edge_grid = EdgeGrid {
            edges: std::array::from_fn(|e| edge_positions[e].as_slice()),
        };
        let position = |[i, j, k]: [usize; 3]| {
            let (u, v, w) = (params[0][i], params[1][j], params[2][k]);
            if curved {
                edge_grid.transfinite([i, j, k], u, v, w)
            } else {
                trilinear(&corners, u, v, w)
            }
        };

        // Faces, in each face's stored orientation
        for f in 0..BLOCK_FACES.len() {
            let g = topo.block_faces[b][f];
            let map = face_map(block, &topo.faces[g])?;
            match &self.face_points[g] {
                Some(grid) => {
                    for t in 0..=map.nv {
                        for s in 0..=map.nu {
                            ids[block.grid_index(map.ijk(s, t))] = grid[s + (map.nu + 1) * t];
                        }
                    }
                }
                None => {
                    let mut grid = Vec::with_capacity((map.nu + 1) * (map.nv + 1));
                    for t in 0..=map.nv {
                        for s in 0..=map.nu {
                            let ijk = map.ijk(s, t);
                            let idx = block.grid_index(ijk);
                            if ids[idx] == UNSET {
                                ids[idx] = self.push_vertex(position(ijk));
                            }
                            grid.push(ids[idx]);
                        }
                    }
                    self.face_points[g] = Some(grid);
                }
            }
        }

        // Interior
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let idx = block.grid_index([i, j, k]);
                    if ids[idx] == UNSET {
                        ids[idx] = self.push_vertex(position([i, j, k]));
                    }
                }
            }
        }

        for k in 0..nz - 1 {
            for j in 0..ny - 1 {
                for i in 0..nx - 1 {
                    let at = |di: usize, dj: usize, dk: usize| {
                        ids[block.grid_index([i + di, j + dj, k + dk])]
                    };
                    self.mesh.elements.push(HexElement {
                        nodes: [
                            at(0, 0, 0),
                            at(1, 0, 0),
                            at(1, 1, 0),
                            at(0, 1, 0),
                            at(0, 0, 1),
                            at(1, 0, 1),
                            at(1, 1, 1),
                            at(0, 1, 1),
                        ],
                        part: block.part,
                    });
                }
            }
        }

        tracing::debug!(
            "Block {}: {}x{}x{} cells{}",
            b,
            nx - 1,
            ny - 1,
            nz - 1,
            if curved { ", transfinite" } else { "" }
        );
        self.block_ids.push(ids);
        Ok(())
    }

    /// Points along local edge `e`, from its first corner to its second
    fn edge_curve_points(
        &self,
        block: &Block,
        g: usize,
        e: usize,
        corners: &[DVec3; 8],
    ) -> MeshResult<Vec<DVec3>> {
        let [c0, c1] = BLOCK_EDGES[e];
        let (p0, p1) = (corners[c0], corners[c1]);
        let axis = EDGE_AXIS[e];
        let params = block.grading[axis].checked_parameters(block.divisions[axis])?;

        match &self.topo.edges[g].curve {
            Some(curve) => {
                let control = curve.control.map(|n| self.mb.nodes()[n].position);
                let geometry = curve.kind.build(p0, p1, control)?;
                Ok(params.iter().map(|&t| geometry.point(t)).collect())
            }
            None => Ok(params.iter().map(|&t| p0.lerp(p1, t)).collect()),
        }
    }

    /// Boundary quads: faces owned by one block, plus classified interfaces
    fn emit_boundary(&mut self) {
        for (g, face) in self.topo.faces.iter().enumerate() {
            if face.blocks.len() > 1 && face.tag.is_none() {
                continue;
            }
            let (b, f) = face.blocks[0];
            let block = &self.mb.blocks()[b];
            let ids = &self.block_ids[b];
            let [c0, c1, _, c3] = BLOCK_FACES[f];
            let map = GridMap::new(block, c0, c1, c3);
            let at = |s: usize, t: usize| ids[block.grid_index(map.ijk(s, t))];
            for t in 0..map.nv {
                for s in 0..map.nu {
                    self.mesh.faces.push(MeshFace {
                        nodes: [at(s, t), at(s + 1, t), at(s + 1, t + 1), at(s, t + 1)],
                        face_id: face.tag,
                        smoothing_group: g as u32,
                    });
                }
            }
        }
    }

    /// Attach face, edge and node classification to vertices
    fn classify(&mut self) {
        for (g, face) in self.topo.faces.iter().enumerate() {
            if let (Some(tag), Some(grid)) = (face.tag, &self.face_points[g]) {
                for &v in grid {
                    self.mesh.vertices[v as usize].add_face(tag);
                }
            }
        }
        for v in &mut self.mesh.vertices {
            if let Some(&face) = v.faces.first() {
                v.class = VertexClass::Face(face);
            }
        }

        for (g, edge) in self.topo.edges.iter().enumerate() {
            if let (Some(tag), Some(points)) = (edge.tag, &self.edge_points[g]) {
                for &v in points {
                    self.mesh.vertices[v as usize].class = VertexClass::Edge(tag);
                }
                for pair in points.windows(2) {
                    self.mesh.edges.push(MeshEdge {
                        nodes: [pair[0], pair[1]],
                        edge_id: tag,
                    });
                }
            }
        }

        for &node in &self.topo.corners {
            if let Some(id) = self.mb.nodes()[node].id {
                self.mesh.vertices[self.corner_vertex[node] as usize].class = VertexClass::Node(id);
            }
        }
    }
}

/// Grid map of a global face in its stored orientation, seen from `block`
fn face_map(block: &Block, face: &TopoFace) -> MeshResult<GridMap> {
    let local = |node: usize| {
        block.local_corner(node).ok_or_else(|| {
            MeshError::InvalidBlockTopology(format!("face corner {node} is not a corner of its block"))
        })
    };
    Ok(GridMap::new(
        block,
        local(face.nodes[0])?,
        local(face.nodes[1])?,
        local(face.nodes[3])?,
    ))
}

/// Jacobian determinant of the trilinear map at the block center
fn jacobian(c: &[DVec3; 8]) -> f64 {
    let du = (c[1] - c[0]) + (c[2] - c[3]) + (c[5] - c[4]) + (c[6] - c[7]);
    let dv = (c[3] - c[0]) + (c[2] - c[1]) + (c[7] - c[4]) + (c[6] - c[5]);
    let dw = (c[4] - c[0]) + (c[5] - c[1]) + (c[6] - c[2]) + (c[7] - c[3]);
    du.dot(dv.cross(dw)) / 64.0
}
