//! Smoothing groups
//!
//! Boundary faces are grouped for shading: two faces sharing an edge join the
//! same group when the angle between their normals is below a threshold.
//! Vertex positions and elements are never touched.

use std::collections::HashMap;

use super::HexMesh;

/// Assign smoothing groups in place.
///
/// Group ids are dense and numbered in order of first appearance.
pub fn auto_smooth(mesh: &mut HexMesh, angle_degrees: f64) {
    let threshold = angle_degrees.to_radians();
    let normals = mesh.face_normals();

    let mut edge_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        for k in 0..4 {
            let a = face.nodes[k];
            let b = face.nodes[(k + 1) % 4];
            edge_faces
                .entry((a.min(b), a.max(b)))
                .or_default()
                .push(face_idx);
        }
    }

    let mut uf = UnionFind::new(mesh.faces.len());
    for faces in edge_faces.values() {
        for (n, &f0) in faces.iter().enumerate() {
            for &f1 in &faces[n + 1..] {
                if normals[f0].angle_between(normals[f1]) < threshold {
                    uf.union(f0, f1);
                }
            }
        }
    }

    let mut root_to_group: HashMap<usize, u32> = HashMap::new();
    for face_idx in 0..mesh.faces.len() {
        let root = uf.find(face_idx);
        let next = root_to_group.len() as u32;
        let group = *root_to_group.entry(root).or_insert(next);
        mesh.faces[face_idx].smoothing_group = group;
    }

    tracing::debug!(
        "Smoothing: {} faces in {} groups at {}°",
        mesh.faces.len(),
        root_to_group.len(),
        angle_degrees
    );
}

/// Copy of `mesh` with smoothing groups assigned
pub fn smooth(mesh: &HexMesh, angle_degrees: f64) -> HexMesh {
    let mut smoothed = mesh.clone();
    auto_smooth(&mut smoothed, angle_degrees);
    smoothed
}

/// Disjoint-set forest over face indices
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Root of `x`'s set, compressing the path on the way
    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}
