//! Curve kernel
//!
//! Edges reference their endpoints and control node by id ([`Curve`]). To
//! evaluate one, resolve it against node positions into a [`CurveGeometry`],
//! which answers length, point and tangent queries on the parameter domain
//! `[0, 1]`.

mod arc;

pub use arc::{CircleArc, DEGENERACY_TOLERANCE, GeneralArc, PlaneFrame};

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::topology::NodeId;
use crate::transform::Transform;

/// Error type for curve evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("Degenerate curve: {0}")]
    Degenerate(String),
    #[error("{0} curve requires a control point")]
    MissingControl(CurveKind),
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Result type for curve evaluation
pub type CurveResult<T> = Result<T, CurveError>;

/// Object axis an [`Curve::AxisArc`] is centered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcAxis {
    Y,
    Z,
}

impl ArcAxis {
    /// Unit direction of the axis in object-local coordinates
    pub fn direction(&self) -> DVec3 {
        match self {
            ArcAxis::Y => DVec3::Y,
            ArcAxis::Z => DVec3::Z,
        }
    }
}

/// Curve family, without node references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    Line,
    /// Circle through both endpoints, centered near the control node
    CircularArc,
    /// Spiral segment about the control node
    GeneralArc,
    /// Spiral segment about a point on an object axis
    AxisArc(ArcAxis),
}

impl CurveKind {
    /// Whether the family needs a control point
    pub fn needs_control(&self) -> bool {
        matches!(self, CurveKind::CircularArc | CurveKind::GeneralArc)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CurveKind::Line => "Line",
            CurveKind::CircularArc => "Circular arc",
            CurveKind::GeneralArc => "General arc",
            CurveKind::AxisArc(ArcAxis::Y) => "Y-axis arc",
            CurveKind::AxisArc(ArcAxis::Z) => "Z-axis arc",
        }
    }

    /// Build the curve of this family between two points, in object-local space.
    pub fn build(
        &self,
        start: DVec3,
        end: DVec3,
        control: Option<DVec3>,
    ) -> CurveResult<CurveGeometry> {
        self.build_in(start, end, control, &Transform::IDENTITY)
    }

    /// Build the curve between two points given in the space `axes` maps into.
    ///
    /// `axes` only matters for [`CurveKind::AxisArc`], whose object axis is
    /// taken through `axes.position` along the rotated local axis.
    pub fn build_in(
        &self,
        start: DVec3,
        end: DVec3,
        control: Option<DVec3>,
        axes: &Transform,
    ) -> CurveResult<CurveGeometry> {
        let shape = match self {
            CurveKind::Line => {
                let length = (end - start).length();
                if length <= DEGENERACY_TOLERANCE * start.length().max(end.length()).max(1.0) {
                    return Err(CurveError::Degenerate("line endpoints coincide".into()));
                }
                CurveShape::Line
            }
            CurveKind::CircularArc => {
                let c = control.ok_or(CurveError::MissingControl(*self))?;
                CurveShape::Circle(CircleArc::new(start, end, c)?)
            }
            CurveKind::GeneralArc => {
                let c = control.ok_or(CurveError::MissingControl(*self))?;
                CurveShape::General(GeneralArc::new(start, end, c)?)
            }
            CurveKind::AxisArc(axis) => {
                let origin = axes.position;
                let dir = (axes.rotation * axis.direction()).normalize();
                let mid = (start + end) * 0.5;
                let center = origin + dir * (mid - origin).dot(dir);
                CurveShape::General(GeneralArc::new(start, end, center)?)
            }
        };
        Ok(CurveGeometry { start, end, shape })
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Curve owned by an edge: a family plus the nodes it references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Curve {
    Line {
        nodes: [NodeId; 2],
    },
    CircularArc {
        nodes: [NodeId; 2],
        center: NodeId,
    },
    GeneralArc {
        nodes: [NodeId; 2],
        center: NodeId,
    },
    AxisArc {
        nodes: [NodeId; 2],
        axis: ArcAxis,
    },
}

impl Curve {
    pub fn line(a: NodeId, b: NodeId) -> Self {
        Curve::Line { nodes: [a, b] }
    }

    pub fn circular_arc(a: NodeId, b: NodeId, center: NodeId) -> Self {
        Curve::CircularArc {
            nodes: [a, b],
            center,
        }
    }

    pub fn general_arc(a: NodeId, b: NodeId, center: NodeId) -> Self {
        Curve::GeneralArc {
            nodes: [a, b],
            center,
        }
    }

    pub fn axis_arc(a: NodeId, b: NodeId, axis: ArcAxis) -> Self {
        Curve::AxisArc { nodes: [a, b], axis }
    }

    /// Build a curve of the given family; arc families need `control`
    pub fn from_kind(
        kind: CurveKind,
        a: NodeId,
        b: NodeId,
        control: Option<NodeId>,
    ) -> CurveResult<Self> {
        Ok(match kind {
            CurveKind::Line => Curve::line(a, b),
            CurveKind::CircularArc => {
                Curve::circular_arc(a, b, control.ok_or(CurveError::MissingControl(kind))?)
            }
            CurveKind::GeneralArc => {
                Curve::general_arc(a, b, control.ok_or(CurveError::MissingControl(kind))?)
            }
            CurveKind::AxisArc(axis) => Curve::axis_arc(a, b, axis),
        })
    }

    /// Endpoint nodes, in parameter order
    pub fn nodes(&self) -> [NodeId; 2] {
        match self {
            Curve::Line { nodes }
            | Curve::CircularArc { nodes, .. }
            | Curve::GeneralArc { nodes, .. }
            | Curve::AxisArc { nodes, .. } => *nodes,
        }
    }

    /// Control node for three-point arcs
    pub fn control(&self) -> Option<NodeId> {
        match self {
            Curve::CircularArc { center, .. } | Curve::GeneralArc { center, .. } => Some(*center),
            Curve::Line { .. } | Curve::AxisArc { .. } => None,
        }
    }

    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Line { .. } => CurveKind::Line,
            Curve::CircularArc { .. } => CurveKind::CircularArc,
            Curve::GeneralArc { .. } => CurveKind::GeneralArc,
            Curve::AxisArc { axis, .. } => CurveKind::AxisArc(*axis),
        }
    }

    /// Whether the curve ends at `node`
    pub fn has_node(&self, node: NodeId) -> bool {
        self.nodes().contains(&node)
    }

    /// Same curve traversed from the other end
    pub fn reversed(&self) -> Self {
        let mut curve = self.clone();
        match &mut curve {
            Curve::Line { nodes }
            | Curve::CircularArc { nodes, .. }
            | Curve::GeneralArc { nodes, .. }
            | Curve::AxisArc { nodes, .. } => nodes.swap(0, 1),
        }
        curve
    }

    /// Geometric identity of two curves.
    ///
    /// Lines match on their endpoint sets in either order. Arcs are oriented,
    /// so they match on ordered endpoints plus the same control node or axis.
    pub fn same_as(&self, other: &Curve) -> bool {
        match (self, other) {
            (Curve::Line { nodes: a }, Curve::Line { nodes: b }) => {
                (a[0] == b[0] && a[1] == b[1]) || (a[0] == b[1] && a[1] == b[0])
            }
            (
                Curve::CircularArc { nodes: a, center: ca },
                Curve::CircularArc { nodes: b, center: cb },
            )
            | (
                Curve::GeneralArc { nodes: a, center: ca },
                Curve::GeneralArc { nodes: b, center: cb },
            ) => a == b && ca == cb,
            (Curve::AxisArc { nodes: a, axis: xa }, Curve::AxisArc { nodes: b, axis: xb }) => {
                a == b && xa == xb
            }
            _ => false,
        }
    }

    /// Resolve node references into evaluable geometry.
    ///
    /// `position` maps a node to its coordinates in the space described by
    /// `axes` (identity for object-local coordinates).
    pub fn resolve<F>(&self, position: F, axes: &Transform) -> CurveResult<CurveGeometry>
    where
        F: Fn(NodeId) -> Option<DVec3>,
    {
        let lookup = |id: NodeId| position(id).ok_or(CurveError::NodeNotFound(id));
        let [a, b] = self.nodes();
        let start = lookup(a)?;
        let end = lookup(b)?;
        let control = self.control().map(lookup).transpose()?;
        self.kind().build_in(start, end, control, axes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum CurveShape {
    Line,
    Circle(CircleArc),
    General(GeneralArc),
}

/// Evaluable curve between two fixed endpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveGeometry {
    start: DVec3,
    end: DVec3,
    shape: CurveShape,
}

impl CurveGeometry {
    pub fn start(&self) -> DVec3 {
        self.start
    }

    pub fn end(&self) -> DVec3 {
        self.end
    }

    pub fn length(&self) -> f64 {
        match &self.shape {
            CurveShape::Line => (self.end - self.start).length(),
            CurveShape::Circle(arc) => arc.length(),
            CurveShape::General(arc) => arc.length(),
        }
    }

    /// Point at parameter `l`, clamped to `[0, 1]`
    pub fn point(&self, l: f64) -> DVec3 {
        let l = l.clamp(0.0, 1.0);
        if l == 0.0 {
            return self.start;
        }
        if l == 1.0 {
            return self.end;
        }
        match &self.shape {
            CurveShape::Line => self.start.lerp(self.end, l),
            CurveShape::Circle(arc) => arc.point(l),
            CurveShape::General(arc) => arc.point(l),
        }
    }

    /// Unit tangent in the curve's local plane.
    ///
    /// A line's local frame has the line on its x axis.
    pub fn tangent(&self, l: f64) -> DVec2 {
        let l = l.clamp(0.0, 1.0);
        match &self.shape {
            CurveShape::Line => DVec2::X,
            CurveShape::Circle(arc) => arc.tangent(l),
            CurveShape::General(arc) => arc.tangent(l),
        }
    }

    /// Unit tangent in model space
    pub fn tangent_3d(&self, l: f64) -> DVec3 {
        let l = l.clamp(0.0, 1.0);
        match &self.shape {
            CurveShape::Line => (self.end - self.start).normalize_or_zero(),
            CurveShape::Circle(arc) => arc.frame().direction_to_global(arc.tangent(l)),
            CurveShape::General(arc) => arc.frame().direction_to_global(arc.tangent(l)),
        }
    }

    /// Center of arc curves
    pub fn center(&self) -> Option<DVec3> {
        match &self.shape {
            CurveShape::Line => None,
            CurveShape::Circle(arc) => Some(arc.center()),
            CurveShape::General(arc) => Some(arc.center()),
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self.shape, CurveShape::Line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn n(i: u32) -> NodeId {
        NodeId(i)
    }

    #[test]
    fn test_line_is_affine() {
        let p0 = DVec3::new(1.0, -2.0, 0.5);
        let p1 = DVec3::new(4.0, 2.0, -1.5);
        let line = CurveKind::Line.build(p0, p1, None).unwrap();
        assert_eq!(line.point(0.0), p0);
        assert_eq!(line.point(1.0), p1);
        for l in [0.1, 0.25, 0.5, 0.9] {
            let expected = p0 * (1.0 - l) + p1 * l;
            assert!(line.point(l).abs_diff_eq(expected, 1e-12));
        }
        assert_relative_eq!(line.length(), (p1 - p0).length());
        assert_eq!(line.tangent(0.3), DVec2::X);
    }

    #[test]
    fn test_point_clamps_parameter() {
        let line = CurveKind::Line.build(DVec3::ZERO, DVec3::X, None).unwrap();
        assert_eq!(line.point(-0.5), DVec3::ZERO);
        assert_eq!(line.point(7.0), DVec3::X);
    }

    #[test]
    fn test_circular_arc_equidistant_points() {
        let a = DVec3::new(0.0, 0.0, 3.0);
        let b = DVec3::new(0.0, 3.0, 0.0);
        let arc = CurveKind::CircularArc.build(a, b, Some(DVec3::ZERO)).unwrap();
        let c = arc.center().unwrap();
        let r = (arc.point(0.0) - c).length();
        assert_relative_eq!((arc.point(0.5) - c).length(), r, epsilon = 1e-12);
        assert_relative_eq!((arc.point(1.0) - c).length(), r, epsilon = 1e-12);
        assert_relative_eq!(arc.length(), r * std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_arc_endpoints_are_exact() {
        let a = DVec3::new(0.3, 0.1, 2.0);
        let b = DVec3::new(-1.2, 0.7, 0.4);
        let arc = CurveKind::CircularArc
            .build(a, b, Some(DVec3::new(0.1, 0.2, 0.3)))
            .unwrap();
        assert_eq!(arc.point(0.0), a);
        assert_eq!(arc.point(1.0), b);
    }

    #[test]
    fn test_circular_arc_tangent_orthogonal_to_radius() {
        let a = DVec3::new(2.0, 1.0, 0.0);
        let b = DVec3::new(0.0, 1.0, 2.0);
        let arc = CurveKind::CircularArc
            .build(a, b, Some(DVec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        let c = arc.center().unwrap();
        for l in [0.0, 0.2, 0.5, 0.8, 1.0] {
            let t2 = arc.tangent(l);
            assert_relative_eq!(t2.length(), 1.0, epsilon = 1e-12);
            let t = arc.tangent_3d(l);
            let radial = arc.point(l) - c;
            assert_abs_diff_eq!(t.dot(radial), 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_arc_requires_control() {
        let err = CurveKind::GeneralArc
            .build(DVec3::X, DVec3::Y, None)
            .unwrap_err();
        assert_eq!(err, CurveError::MissingControl(CurveKind::GeneralArc));
    }

    #[test]
    fn test_zero_length_line_is_degenerate() {
        let err = CurveKind::Line.build(DVec3::ONE, DVec3::ONE, None).unwrap_err();
        assert!(matches!(err, CurveError::Degenerate(_)));
    }

    #[test]
    fn test_axis_arc_centers_on_axis() {
        let a = DVec3::new(1.0, 0.0, 2.0);
        let b = DVec3::new(0.0, 1.0, 2.0);
        let arc = CurveKind::AxisArc(ArcAxis::Z).build(a, b, None).unwrap();
        let c = arc.center().unwrap();
        assert!(c.abs_diff_eq(DVec3::new(0.0, 0.0, 2.0), 1e-12));
        assert_relative_eq!(arc.point(0.5).distance(c), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_arc_follows_transform_axes() {
        let axes = Transform::from_position(DVec3::new(5.0, 0.0, 0.0));
        let a = DVec3::new(6.0, 0.0, 1.0);
        let b = DVec3::new(5.0, 1.0, 1.0);
        let arc = CurveKind::AxisArc(ArcAxis::Z)
            .build_in(a, b, None, &axes)
            .unwrap();
        assert!(arc.center().unwrap().abs_diff_eq(DVec3::new(5.0, 0.0, 1.0), 1e-12));
    }

    #[test]
    fn test_same_as() {
        assert!(Curve::line(n(1), n(2)).same_as(&Curve::line(n(2), n(1))));
        assert!(!Curve::line(n(1), n(2)).same_as(&Curve::line(n(1), n(3))));

        let arc = Curve::circular_arc(n(1), n(2), n(9));
        assert!(arc.same_as(&Curve::circular_arc(n(1), n(2), n(9))));
        assert!(!arc.same_as(&Curve::circular_arc(n(1), n(2), n(8))));
        assert!(!arc.same_as(&Curve::circular_arc(n(2), n(1), n(9))));
        assert!(!arc.same_as(&Curve::general_arc(n(1), n(2), n(9))));

        let ya = Curve::axis_arc(n(1), n(2), ArcAxis::Y);
        assert!(ya.same_as(&Curve::axis_arc(n(1), n(2), ArcAxis::Y)));
        assert!(!ya.same_as(&Curve::axis_arc(n(1), n(2), ArcAxis::Z)));
    }

    #[test]
    fn test_resolve_reports_missing_node() {
        let positions = [DVec3::ZERO, DVec3::X];
        let curve = Curve::circular_arc(n(0), n(1), n(5));
        let err = curve
            .resolve(|id| positions.get(id.0 as usize).copied(), &Transform::IDENTITY)
            .unwrap_err();
        assert_eq!(err, CurveError::NodeNotFound(n(5)));
    }

    #[test]
    fn test_reversed_swaps_endpoints() {
        let curve = Curve::general_arc(n(3), n(4), n(0)).reversed();
        assert_eq!(curve.nodes(), [n(4), n(3)]);
        assert_eq!(curve.control(), Some(n(0)));
    }
}
