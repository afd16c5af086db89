//! Normal calculation utilities for quad faces

use glam::DVec3;

/// Normal of a single triangle; +Z when degenerate
pub fn triangle_normal(v0: DVec3, v1: DVec3, v2: DVec3) -> DVec3 {
    let cross = (v1 - v0).cross(v2 - v0);
    let len = cross.length();
    if len > 0.0 { cross / len } else { DVec3::Z }
}

/// Normal of a possibly non-planar quad, from its diagonals
pub fn quad_normal(v: [DVec3; 4]) -> DVec3 {
    let cross = (v[2] - v[0]).cross(v[3] - v[1]);
    let len = cross.length();
    if len > 0.0 {
        cross / len
    } else {
        triangle_normal(v[0], v[1], v[2])
    }
}

/// Normals of quads given as vertex index cycles
pub fn calculate_face_normals(vertices: &[DVec3], quads: &[[u32; 4]]) -> Vec<DVec3> {
    quads
        .iter()
        .map(|q| quad_normal(q.map(|i| vertices[i as usize])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_normal_follows_winding() {
        let q = [
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::Y,
        ];
        assert!(quad_normal(q).abs_diff_eq(DVec3::Z, 1e-15));
        let r = [q[3], q[2], q[1], q[0]];
        assert!(quad_normal(r).abs_diff_eq(-DVec3::Z, 1e-15));
    }

    #[test]
    fn test_degenerate_triangle() {
        assert_eq!(triangle_normal(DVec3::X, DVec3::X, DVec3::X), DVec3::Z);
    }
}
