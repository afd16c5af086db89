//! Meshable objects and the meshing entry point

use hexa_geom::{GeomObject, NodeId, TopologyResult};
use serde::{Deserialize, Serialize};

use crate::config::MesherConfig;
use crate::error::{MeshError, MeshResult};
use crate::mesh::{HexMesh, auto_smooth};
use crate::multiblock::MultiBlock;
use crate::primitive::Shape;

/// A geometric object together with the shape it is meshed from and its
/// current mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshObject {
    pub geom: GeomObject,
    pub shape: Shape,
    mesh: Option<HexMesh>,
}

impl MeshObject {
    pub fn new(geom: GeomObject, shape: Shape) -> Self {
        Self {
            geom,
            shape,
            mesh: None,
        }
    }

    /// Build the topological model from the shape
    pub fn from_shape(name: &str, shape: Shape) -> MeshResult<Self> {
        let geom = shape.build_object(name)?;
        Ok(Self::new(geom, shape))
    }

    pub fn mesh(&self) -> Option<&HexMesh> {
        self.mesh.as_ref()
    }

    /// Rebuild the mesh; on error the previous mesh is kept
    pub fn update_mesh(&mut self, config: &MesherConfig) -> MeshResult<&HexMesh> {
        match build_mesh(&self.geom, &self.shape, config) {
            Ok(mesh) => Ok(self.mesh.insert(mesh)),
            Err(e) => {
                tracing::warn!("Meshing '{}' failed, keeping previous mesh: {}", self.geom.name, e);
                Err(e)
            }
        }
    }

    /// Flag a node as required, on the model and on the current mesh
    pub fn make_required(&mut self, node: NodeId) -> TopologyResult<()> {
        self.geom.make_required(node)?;
        if let Some(mesh) = self.mesh.as_mut() {
            if let Some(v) = mesh.vertex_of_node(node) {
                mesh.vertices[v].required = true;
            }
        }
        Ok(())
    }
}

/// Mesh one object.
///
/// Runs a full pass over the shape's block set and either returns a complete
/// welded mesh in object-local coordinates or fails without a partial result.
pub fn build_mesh(geom: &GeomObject, shape: &Shape, config: &MesherConfig) -> MeshResult<HexMesh> {
    let angle = config.smoothing_angle;
    if !angle.is_finite() || angle <= 0.0 || angle > 180.0 {
        return Err(MeshError::InvalidParameter(format!(
            "smoothing angle must be in (0, 180], got {angle}"
        )));
    }
    geom.validate()?;

    let mb = shape.build_blocks()?;
    check_references(&mb, geom)?;
    let mut mesh = mb.generate(config.check_orientation)?;

    for node in geom.nodes().iter().filter(|n| n.required) {
        match mesh.vertex_of_node(node.id) {
            Some(v) => mesh.vertices[v].required = true,
            None => tracing::debug!("Required {} has no mesh vertex", node.id),
        }
    }
    if config.auto_smooth {
        auto_smooth(&mut mesh, angle);
    }

    tracing::info!(
        "Meshed '{}' ({}): {} vertices, {} elements, {} boundary faces",
        geom.name,
        shape.name(),
        mesh.vertex_count(),
        mesh.element_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Every id a block set names must exist on the object
fn check_references(mb: &MultiBlock, geom: &GeomObject) -> MeshResult<()> {
    for id in mb.nodes().iter().filter_map(|n| n.id) {
        geom.node(id)?;
    }
    for block in mb.blocks() {
        geom.part(block.part)?;
        for &face in block.face_ids.iter().flatten() {
            geom.face(face)?;
        }
        for &edge in block.edge_ids.iter().flatten() {
            geom.edge(edge)?;
        }
    }
    Ok(())
}
