//! Block definitions
//!
//! A block is a logically hexahedral region described by eight corner
//! references into a [`crate::MultiBlock`] node list. Corners, faces and edges
//! follow one fixed numbering, shared with the emitted hexahedral elements:
//!
//! ```text
//!        7 -------- 6
//!       /|         /|        k
//!      4 -------- 5 |        |  j
//!      | 3 -------|-2        | /
//!      |/         |/         |/
//!      0 -------- 1          +---- i
//! ```

use hexa_geom::{CurveKind, EdgeId, FaceId, PartId};
use serde::{Deserialize, Serialize};

use crate::constants::{BIAS_TOLERANCE, UNIFORM_BIAS};
use crate::error::{MeshError, MeshResult};

/// Grid position of each corner on the unit cube
pub const CORNER_IJK: [[u32; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Corner cycle of each face, wound so the normal points out of the block
pub const BLOCK_FACES: [[usize; 4]; 6] = [
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
    [3, 2, 1, 0],
    [4, 5, 6, 7],
];

/// Corner pair of each edge, each running along its increasing grid axis
pub const BLOCK_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [3, 2],
    [0, 3],
    [4, 5],
    [5, 6],
    [7, 6],
    [4, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Grid axis each edge runs along
pub const EDGE_AXIS: [usize; 12] = [0, 1, 0, 1, 0, 1, 0, 1, 2, 2, 2, 2];

/// Local edge joining two corners, in either order
pub fn edge_between(a: usize, b: usize) -> Option<usize> {
    BLOCK_EDGES
        .iter()
        .position(|&[c0, c1]| (c0 == a && c1 == b) || (c0 == b && c1 == a))
}

/// Local edge under side `side` of face `face` (corner `side` to corner `side + 1`)
pub fn face_edge(face: usize, side: usize) -> Option<usize> {
    let cycle = BLOCK_FACES.get(face)?;
    if side >= 4 {
        return None;
    }
    edge_between(cycle[side], cycle[(side + 1) % 4])
}

/// Node spacing profile along one block axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grading {
    /// Ratio between consecutive intervals; 1 is uniform
    pub bias: f64,
    /// Apply the progression from both ends toward the middle
    pub mirrored: bool,
}

impl Default for Grading {
    fn default() -> Self {
        Self::uniform()
    }
}

impl Grading {
    pub fn uniform() -> Self {
        Self {
            bias: UNIFORM_BIAS,
            mirrored: false,
        }
    }

    /// One-sided progression; a bias above 1 clusters nodes at the start
    pub fn new(bias: f64) -> Self {
        Self {
            bias,
            mirrored: false,
        }
    }

    /// Two-sided progression clustering nodes at both ends
    pub fn mirrored(bias: f64) -> Self {
        Self {
            bias,
            mirrored: true,
        }
    }

    pub fn validate(&self) -> MeshResult<()> {
        if !self.bias.is_finite() || self.bias <= 0.0 {
            return Err(MeshError::InvalidParameter(format!(
                "grading bias must be positive, got {}",
                self.bias
            )));
        }
        Ok(())
    }

    /// Parameter in `[0, 1]` of node `i` of `n` intervals
    pub fn parameter(&self, i: u32, n: u32) -> f64 {
        if n == 0 {
            return 0.0;
        }
        if i == 0 {
            return 0.0;
        }
        if i >= n {
            return 1.0;
        }
        if self.mirrored {
            let half = n as f64 * 0.5;
            if (i as f64) <= half {
                0.5 * progression(self.bias, i as f64, half)
            } else {
                1.0 - 0.5 * progression(self.bias, (n - i) as f64, half)
            }
        } else {
            progression(self.bias, i as f64, n as f64)
        }
    }

    /// All `n + 1` node parameters
    pub fn parameters(&self, n: u32) -> Vec<f64> {
        (0..=n).map(|i| self.parameter(i, n)).collect()
    }

    /// Node parameters, rejecting a profile that is not finite or runs backwards
    pub fn checked_parameters(&self, n: u32) -> MeshResult<Vec<f64>> {
        self.validate()?;
        let params = self.parameters(n);
        let ordered = params.windows(2).all(|w| w[1] >= w[0]);
        if !ordered || params.iter().any(|t| !t.is_finite()) {
            return Err(MeshError::InvalidParameter(format!(
                "grading bias {} over {} intervals gives unusable node spacing",
                self.bias, n
            )));
        }
        Ok(params)
    }
}

/// Fraction of a geometric series of ratio `g`: `(g^x - 1) / (g^n - 1)`
///
/// Evaluated through `ln g` so that neither power leaves the f64 range; for
/// `g > 1` the fraction is rewritten as `g^(x-n) (1 - g^-x) / (1 - g^-n)`.
fn progression(g: f64, x: f64, n: f64) -> f64 {
    if (g - 1.0).abs() <= BIAS_TOLERANCE {
        return x / n;
    }
    let lg = g.ln();
    if g > 1.0 {
        ((x - n) * lg).exp() * (-x * lg).exp_m1() / (-n * lg).exp_m1()
    } else {
        (x * lg).exp_m1() / (n * lg).exp_m1()
    }
}

/// Curve definition attached to one block edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvedEdge {
    pub kind: CurveKind,
    /// Control node index in the block set's node list
    pub control: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Part the block's elements belong to
    pub part: PartId,
    /// Corner indices into the block set's node list
    pub nodes: [usize; 8],
    /// Intervals along i, j, k
    pub divisions: [u32; 3],
    pub grading: [Grading; 3],
    /// Face classification per local face
    pub face_ids: [Option<FaceId>; 6],
    /// Edge classification per local edge
    pub edge_ids: [Option<EdgeId>; 12],
    /// Curve definition per local edge; straight when `None`
    pub curved: [Option<CurvedEdge>; 12],
}

impl Block {
    pub fn new(part: PartId, nodes: [usize; 8], divisions: [u32; 3]) -> Self {
        Self {
            part,
            nodes,
            divisions,
            grading: [Grading::uniform(); 3],
            face_ids: [None; 6],
            edge_ids: [None; 12],
            curved: [None; 12],
        }
    }

    pub fn with_grading(mut self, grading: [Grading; 3]) -> Self {
        self.grading = grading;
        self
    }

    /// Grid points along i, j, k
    pub fn grid_size(&self) -> [usize; 3] {
        self.divisions.map(|n| n as usize + 1)
    }

    pub fn element_count(&self) -> usize {
        self.divisions.iter().map(|&n| n as usize).product()
    }

    /// Corner's grid coordinates
    pub fn corner_ijk(&self, corner: usize) -> [i64; 3] {
        let c = CORNER_IJK[corner];
        [
            (c[0] * self.divisions[0]) as i64,
            (c[1] * self.divisions[1]) as i64,
            (c[2] * self.divisions[2]) as i64,
        ]
    }

    /// Linear index of a grid point
    pub fn grid_index(&self, [i, j, k]: [usize; 3]) -> usize {
        let [nx, ny, _] = self.grid_size();
        i + nx * (j + ny * k)
    }

    /// Local corner slot holding a node index
    pub fn local_corner(&self, node: usize) -> Option<usize> {
        self.nodes.iter().position(|&n| n == node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_edges_follow_grid_axes() {
        for (e, [a, b]) in BLOCK_EDGES.iter().enumerate() {
            let axis = EDGE_AXIS[e];
            for d in 0..3 {
                let delta = CORNER_IJK[*b][d] as i64 - CORNER_IJK[*a][d] as i64;
                assert_eq!(delta, if d == axis { 1 } else { 0 }, "edge {e} axis {d}");
            }
        }
    }

    #[test]
    fn test_face_sides_are_edges() {
        for face in 0..6 {
            for side in 0..4 {
                assert!(face_edge(face, side).is_some());
            }
        }
        assert_eq!(face_edge(4, 0), Some(2));
        assert_eq!(face_edge(6, 0), None);
    }

    #[test]
    fn test_uniform_grading() {
        let params = Grading::uniform().parameters(4);
        assert_eq!(params, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_one_sided_grading() {
        let g = Grading::new(2.0);
        let params = g.parameters(3);
        // intervals 1, 2, 4 out of 7
        assert_relative_eq!(params[1], 1.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(params[2], 3.0 / 7.0, epsilon = 1e-12);
        assert_eq!(params[3], 1.0);
    }

    #[test]
    fn test_mirrored_grading_is_symmetric() {
        for n in [4, 5] {
            let params = Grading::mirrored(1.5).parameters(n);
            for i in 0..=n as usize {
                assert_relative_eq!(params[i], 1.0 - params[n as usize - i], epsilon = 1e-12);
            }
            assert!(params.windows(2).all(|w| w[1] > w[0]));
        }
    }

    #[test]
    fn test_steep_grading_stays_finite() {
        for (grading, n) in [(Grading::new(2.0), 1100), (Grading::mirrored(3.0), 1400)] {
            let params = grading.checked_parameters(n).unwrap();
            assert_eq!(params.len(), n as usize + 1);
            assert_eq!(params[0], 0.0);
            assert_eq!(params[n as usize], 1.0);
            assert!(params.iter().all(|t| t.is_finite() && (0.0..=1.0).contains(t)));
            assert!(params.windows(2).all(|w| w[1] >= w[0]));
        }
        let params = Grading::new(0.5).parameters(2000);
        assert!(params.iter().all(|t| t.is_finite()));
        assert!(params[1] > 0.4);
    }

    #[test]
    fn test_checked_parameters_rejects_bad_bias() {
        let err = Grading::new(f64::INFINITY).checked_parameters(4).unwrap_err();
        assert!(matches!(err, MeshError::InvalidParameter(_)));
    }

    #[test]
    fn test_invalid_bias() {
        assert!(Grading::new(0.0).validate().is_err());
        assert!(Grading::new(f64::NAN).validate().is_err());
        assert!(Grading::new(0.5).validate().is_ok());
    }

    #[test]
    fn test_corner_ijk() {
        let block = Block::new(PartId(0), [0, 1, 2, 3, 4, 5, 6, 7], [2, 3, 4]);
        assert_eq!(block.corner_ijk(6), [2, 3, 4]);
        assert_eq!(block.grid_index([2, 3, 4]), 3 * 4 * 5 - 1);
        assert_eq!(block.element_count(), 24);
    }
}
