//! Interior point placement for a single block

use glam::DVec3;

/// Trilinear blend of the eight block corners at `(u, v, w)`
pub fn trilinear(corners: &[DVec3; 8], u: f64, v: f64, w: f64) -> DVec3 {
    let (iu, iv, iw) = (1.0 - u, 1.0 - v, 1.0 - w);
    corners[0] * (iu * iv * iw)
        + corners[1] * (u * iv * iw)
        + corners[2] * (u * v * iw)
        + corners[3] * (iu * v * iw)
        + corners[4] * (iu * iv * w)
        + corners[5] * (u * iv * w)
        + corners[6] * (u * v * w)
        + corners[7] * (iu * v * w)
}

/// Points along the twelve block edges, each running along its grid axis
pub struct EdgeGrid<'a> {
    /// Indexed by local edge number
    pub edges: [&'a [DVec3]; 12],
}

impl EdgeGrid<'_> {
    fn corners(&self) -> [DVec3; 8] {
        let e = &self.edges;
        let last = |s: &[DVec3]| s[s.len() - 1];
        [
            e[0][0],
            last(e[0]),
            last(e[1]),
            e[2][0],
            e[4][0],
            last(e[4]),
            last(e[5]),
            e[6][0],
        ]
    }

    /// Transfinite blend of the boundary edges at grid point `(i, j, k)`.
    ///
    /// `(u, v, w)` are the block parameters of that grid point. On a block face
    /// this reduces to the Coons patch of the face's four edges, and on an edge
    /// it returns the edge point itself.
    pub fn transfinite(&self, [i, j, k]: [usize; 3], u: f64, v: f64, w: f64) -> DVec3 {
        let e = &self.edges;
        let (iu, iv, iw) = (1.0 - u, 1.0 - v, 1.0 - w);

        let along_i = e[0][i] * (iv * iw) + e[2][i] * (v * iw) + e[4][i] * (iv * w) + e[6][i] * (v * w);
        let along_j = e[3][j] * (iu * iw) + e[1][j] * (u * iw) + e[7][j] * (iu * w) + e[5][j] * (u * w);
        let along_k =
            e[8][k] * (iu * iv) + e[9][k] * (u * iv) + e[11][k] * (iu * v) + e[10][k] * (u * v);

        along_i + along_j + along_k - trilinear(&self.corners(), u, v, w) * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BLOCK_EDGES, CORNER_IJK};

    fn unit_corners() -> [DVec3; 8] {
        CORNER_IJK.map(|c| DVec3::new(c[0] as f64, c[1] as f64, c[2] as f64))
    }

    #[test]
    fn test_trilinear_corners() {
        let corners = unit_corners();
        for (c, ijk) in CORNER_IJK.iter().enumerate() {
            let p = trilinear(&corners, ijk[0] as f64, ijk[1] as f64, ijk[2] as f64);
            assert_eq!(p, corners[c]);
        }
        let mid = trilinear(&corners, 0.5, 0.5, 0.5);
        assert!(mid.abs_diff_eq(DVec3::splat(0.5), 1e-15));
    }

    #[test]
    fn test_transfinite_of_straight_edges_is_trilinear() {
        let mut corners = unit_corners();
        corners[6] = DVec3::new(1.4, 1.2, 1.3);
        corners[1] = DVec3::new(1.1, -0.1, 0.2);
        let n = 4;
        let edges: Vec<Vec<DVec3>> = BLOCK_EDGES
            .iter()
            .map(|[a, b]| {
                (0..=n)
                    .map(|s| corners[*a].lerp(corners[*b], s as f64 / n as f64))
                    .collect()
            })
            .collect();
        let grid = EdgeGrid {
            edges: std::array::from_fn(|e| edges[e].as_slice()),
        };
        for (i, j, k) in [(1, 2, 3), (0, 4, 2), (4, 4, 4), (2, 2, 0)] {
            let (u, v, w) = (i as f64 / 4.0, j as f64 / 4.0, k as f64 / 4.0);
            let t = grid.transfinite([i, j, k], u, v, w);
            assert!(t.abs_diff_eq(trilinear(&corners, u, v, w), 1e-12));
        }
    }

    #[test]
    fn test_transfinite_reproduces_curved_edge() {
        let corners = unit_corners();
        let n = 4;
        let mut edges: Vec<Vec<DVec3>> = BLOCK_EDGES
            .iter()
            .map(|[a, b]| {
                (0..=n)
                    .map(|s| corners[*a].lerp(corners[*b], s as f64 / n as f64))
                    .collect()
            })
            .collect();
        // bow edge 0 outward in -y
        for s in 1..n {
            edges[0][s].y = -0.2;
        }
        let grid = EdgeGrid {
            edges: std::array::from_fn(|e| edges[e].as_slice()),
        };
        let p = grid.transfinite([2, 0, 0], 0.5, 0.0, 0.0);
        assert!(p.abs_diff_eq(edges[0][2], 1e-12));
        // the opposite edge stays straight
        let q = grid.transfinite([2, 4, 4], 0.5, 1.0, 1.0);
        assert!(q.abs_diff_eq(DVec3::new(0.5, 1.0, 1.0), 1e-12));
    }
}
