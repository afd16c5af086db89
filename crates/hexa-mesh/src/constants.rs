//! Global constants for hexa-mesh

/// Default dihedral angle (degrees) below which adjacent faces share a smoothing group
pub const DEFAULT_SMOOTHING_ANGLE: f64 = 60.0;

/// Default subdivision count per block axis for primitive shapes
pub const DEFAULT_DIVISIONS: u32 = 10;

/// Uniform grading
pub const UNIFORM_BIAS: f64 = 1.0;

/// Biases this close to 1 are treated as uniform
pub const BIAS_TOLERANCE: f64 = 1e-12;

/// Default subdivision count of each sphere-in-box block along the box axes
pub const SPHERE_IN_BOX_DIVISIONS: u32 = 5;

/// Default radial subdivision count between the box walls and the sphere
pub const SPHERE_IN_BOX_RADIAL_DIVISIONS: u32 = 1;
