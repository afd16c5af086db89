//! Three-point arcs
//!
//! Both arc families are evaluated in 2D: the plane through the two endpoints
//! and the control point is rotated onto the XY plane, the arc is solved
//! there, and points are rotated back into model space.

use glam::{DQuat, DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::{CurveError, CurveResult};

/// Relative tolerance below which control points count as coincident or collinear
pub const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Local 2D frame of the plane spanned by an arc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneFrame {
    /// Plane origin in model space
    pub origin: DVec3,
    /// Rotation taking the plane normal onto +Z
    pub rotation: DQuat,
}

impl PlaneFrame {
    /// Create a frame from an origin and a unit plane normal
    pub fn new(origin: DVec3, normal: DVec3) -> Self {
        Self {
            origin,
            rotation: DQuat::from_rotation_arc(normal, DVec3::Z),
        }
    }

    /// Project a model-space point into the plane's 2D coordinates
    pub fn to_local(&self, p: DVec3) -> DVec2 {
        (self.rotation * (p - self.origin)).truncate()
    }

    /// Map a 2D plane point back into model space
    pub fn to_global(&self, p: DVec2) -> DVec3 {
        self.rotation.inverse() * p.extend(0.0) + self.origin
    }

    /// Map a 2D plane direction back into model space
    pub fn direction_to_global(&self, d: DVec2) -> DVec3 {
        self.rotation.inverse() * d.extend(0.0)
    }

    /// Unit normal of the plane in model space
    pub fn normal(&self) -> DVec3 {
        self.rotation.inverse() * DVec3::Z
    }
}

/// Reject coincident endpoints and control points collinear with them.
///
/// Returns the unit normal of the plane through the three points.
fn arc_plane_normal(start: DVec3, end: DVec3, control: DVec3) -> CurveResult<DVec3> {
    let r1 = start - control;
    let r2 = end - control;
    let scale = r1.length().max(r2.length());

    if !scale.is_finite() || scale == 0.0 {
        return Err(CurveError::Degenerate(
            "arc endpoints coincide with the control point".into(),
        ));
    }
    if (end - start).length() <= DEGENERACY_TOLERANCE * scale {
        return Err(CurveError::Degenerate("arc endpoints coincide".into()));
    }
    if r1.length() <= DEGENERACY_TOLERANCE * scale || r2.length() <= DEGENERACY_TOLERANCE * scale
    {
        return Err(CurveError::Degenerate(
            "arc endpoint coincides with the control point".into(),
        ));
    }

    let n = r1.cross(r2);
    if n.length() <= DEGENERACY_TOLERANCE * r1.length() * r2.length() {
        return Err(CurveError::Degenerate(
            "control point is collinear with the arc endpoints".into(),
        ));
    }
    Ok(n.normalize())
}

/// Counter-clockwise sweep from `a` to `b` about the origin, in (0, PI)
fn sweep_angle(a: DVec2, b: DVec2) -> f64 {
    a.perp_dot(b).atan2(a.dot(b))
}

/// Circular arc solved from two endpoints and a center hint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleArc {
    frame: PlaneFrame,
    radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl CircleArc {
    /// Solve the circle through `start` and `end` whose center is the point
    /// on the chord's perpendicular bisector closest to `center_hint`.
    ///
    /// When the hint is equidistant from both endpoints it is the center.
    pub fn new(start: DVec3, end: DVec3, center_hint: DVec3) -> CurveResult<Self> {
        let normal = arc_plane_normal(start, end, center_hint)?;
        let hint_frame = PlaneFrame::new(center_hint, normal);

        let a = hint_frame.to_local(start);
        let b = hint_frame.to_local(end);
        let mid = (a + b) * 0.5;
        let bisector = (b - a).perp().normalize();
        let center = mid + bisector * (-mid).dot(bisector);

        let frame = PlaneFrame {
            origin: hint_frame.to_global(center),
            rotation: hint_frame.rotation,
        };
        let ra = a - center;
        let rb = b - center;

        Ok(Self {
            frame,
            radius: ra.length(),
            start_angle: ra.y.atan2(ra.x),
            sweep: sweep_angle(ra, rb),
        })
    }

    /// Solved center in model space
    pub fn center(&self) -> DVec3 {
        self.frame.origin
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Subtended angle in radians
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    pub fn frame(&self) -> &PlaneFrame {
        &self.frame
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep
    }

    pub fn point(&self, l: f64) -> DVec3 {
        let w = self.start_angle + l * self.sweep;
        self.frame
            .to_global(DVec2::new(w.cos(), w.sin()) * self.radius)
    }

    pub fn tangent(&self, l: f64) -> DVec2 {
        let w = self.start_angle + l * self.sweep;
        DVec2::new(-w.sin(), w.cos())
    }
}

/// Arc about a fixed center whose radius varies linearly between the ends
///
/// The angle runs linearly over the shorter sweep from the first endpoint to
/// the second while the radius blends from `|A - C|` to `|B - C|`, which makes
/// the curve a segment of an Archimedean spiral. Equal end radii reduce it to
/// a circular arc about `C`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneralArc {
    frame: PlaneFrame,
    start_radius: f64,
    end_radius: f64,
    start_angle: f64,
    sweep: f64,
}

impl GeneralArc {
    pub fn new(start: DVec3, end: DVec3, center: DVec3) -> CurveResult<Self> {
        let normal = arc_plane_normal(start, end, center)?;
        let frame = PlaneFrame::new(center, normal);
        let a = frame.to_local(start);
        let b = frame.to_local(end);

        Ok(Self {
            frame,
            start_radius: a.length(),
            end_radius: b.length(),
            start_angle: a.y.atan2(a.x),
            sweep: sweep_angle(a, b),
        })
    }

    pub fn center(&self) -> DVec3 {
        self.frame.origin
    }

    pub fn frame(&self) -> &PlaneFrame {
        &self.frame
    }

    /// Radius at parameter `l`
    pub fn radius_at(&self, l: f64) -> f64 {
        self.start_radius + l * (self.end_radius - self.start_radius)
    }

    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Closed-form length of the spiral segment
    pub fn length(&self) -> f64 {
        let k = self.end_radius - self.start_radius;
        let w = self.sweep;
        if k.abs() <= DEGENERACY_TOLERANCE * (self.start_radius + self.end_radius) {
            return w * 0.5 * (self.start_radius + self.end_radius);
        }

        // integral of sqrt(k^2 + w^2 u^2) du / k over u in [r0, r1]
        let antiderivative = |u: f64| {
            let s = (k * k + w * w * u * u).sqrt();
            0.5 * u * s + (k * k / (2.0 * w)) * (w * u / k.abs()).asinh()
        };
        (antiderivative(self.end_radius) - antiderivative(self.start_radius)) / k
    }

    pub fn point(&self, l: f64) -> DVec3 {
        let w = self.start_angle + l * self.sweep;
        self.frame
            .to_global(DVec2::new(w.cos(), w.sin()) * self.radius_at(l))
    }

    pub fn tangent(&self, l: f64) -> DVec2 {
        let w = self.start_angle + l * self.sweep;
        let radial = DVec2::new(w.cos(), w.sin());
        let d = radial * (self.end_radius - self.start_radius)
            + radial.perp() * (self.radius_at(l) * self.sweep);
        d.normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_frame_round_trip() {
        let frame = PlaneFrame::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(1.0, 1.0, 0.0).normalize());
        let p = DVec3::new(1.0, 2.0, 3.0) + DVec3::new(-1.0, 1.0, 0.0) * 2.5;
        let local = frame.to_local(p);
        assert!(frame.to_global(local).abs_diff_eq(p, 1e-12));
    }

    #[test]
    fn test_plane_frame_handles_flipped_normal() {
        let frame = PlaneFrame::new(DVec3::ZERO, -DVec3::Z);
        assert!(frame.normal().abs_diff_eq(-DVec3::Z, 1e-12));
    }

    #[test]
    fn test_circle_arc_quarter() {
        let arc = CircleArc::new(DVec3::X, DVec3::Y, DVec3::ZERO).unwrap();
        assert_relative_eq!(arc.radius(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.sweep(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        let mid = arc.point(0.5);
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!(mid.abs_diff_eq(DVec3::new(s, s, 0.0), 1e-12));
    }

    #[test]
    fn test_circle_arc_solves_offset_center() {
        // hint is not equidistant from the endpoints
        let arc = CircleArc::new(DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.0, 2.0, 0.0), DVec3::new(0.2, 0.0, 0.0))
            .unwrap();
        let c = arc.center();
        let r0 = (DVec3::new(2.0, 0.0, 0.0) - c).length();
        let r1 = (DVec3::new(0.0, 2.0, 0.0) - c).length();
        assert_relative_eq!(r0, r1, epsilon = 1e-12);
        assert_relative_eq!((arc.point(0.3) - c).length(), r0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_control_is_degenerate() {
        let err = CircleArc::new(DVec3::X, -DVec3::X, DVec3::ZERO).unwrap_err();
        assert!(matches!(err, CurveError::Degenerate(_)));
        let err = GeneralArc::new(DVec3::X, DVec3::X * 2.0, DVec3::ZERO).unwrap_err();
        assert!(matches!(err, CurveError::Degenerate(_)));
    }

    #[test]
    fn test_coincident_endpoints_are_degenerate() {
        let err = CircleArc::new(DVec3::X, DVec3::X, DVec3::ZERO).unwrap_err();
        assert!(matches!(err, CurveError::Degenerate(_)));
    }

    #[test]
    fn test_general_arc_equal_radii_is_circular() {
        let arc = GeneralArc::new(DVec3::X, DVec3::Y, DVec3::ZERO).unwrap();
        assert_relative_eq!(arc.length(), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(arc.point(0.37).length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_general_arc_length_matches_polyline() {
        let arc = GeneralArc::new(DVec3::X, DVec3::new(0.0, 3.0, 0.0), DVec3::ZERO).unwrap();
        let n = 20_000;
        let mut polyline = 0.0;
        for i in 0..n {
            let a = arc.point(i as f64 / n as f64);
            let b = arc.point((i + 1) as f64 / n as f64);
            polyline += (b - a).length();
        }
        assert_relative_eq!(arc.length(), polyline, max_relative = 1e-6);
    }

    #[test]
    fn test_general_arc_radius_blends() {
        let arc = GeneralArc::new(DVec3::X, DVec3::new(0.0, 3.0, 0.0), DVec3::ZERO).unwrap();
        assert_relative_eq!(arc.point(0.5).length(), 2.0, epsilon = 1e-12);
        let t = arc.tangent(0.0);
        assert_relative_eq!(t.length(), 1.0, epsilon = 1e-12);
    }
}
