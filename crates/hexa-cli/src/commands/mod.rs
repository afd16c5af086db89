//! Subcommands and the job file they share

pub mod build;
pub mod defaults;
pub mod info;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hexa_geom::Transform;
use hexa_mesh::{MeshObject, MesherConfig, Shape};
use serde::{Deserialize, Serialize};

/// One object to mesh, stored as RON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub shape: Shape,
    /// Placement of the object in model space
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub mesher: MesherConfig,
    /// Where `build` writes the mesh when no `--out` is given
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Job {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        Self::from_ron_str(&content).with_context(|| format!("Invalid job file {}", path.display()))
    }

    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Geometric object of the job, placed by its transform
    pub fn object(&self) -> Result<MeshObject> {
        let mut object = MeshObject::from_shape(&self.name, self.shape.clone())?;
        object.geom.transform = self.transform;
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexa_mesh::{BoxShape, SphereInBoxShape};

    #[test]
    fn test_job_from_ron() {
        let job = Job::from_ron_str(
            r#"(
                name: "cavity",
                shape: SphereInBox((
                    width: 4.0,
                    height: 4.0,
                    depth: 4.0,
                    radius: 1.0,
                    nr: 3,
                )),
            )"#,
        )
        .unwrap();
        assert_eq!(job.name, "cavity");
        assert_eq!(job.mesher, MesherConfig::default());
        assert!(job.output.is_none());
        match job.shape {
            Shape::SphereInBox(s) => {
                assert_eq!(s.radius, 1.0);
                assert_eq!(s.nr, 3);
                assert_eq!(s.nx, SphereInBoxShape::default().nx);
            }
            other => panic!("unexpected shape {}", other.name()),
        }
    }

    #[test]
    fn test_job_object_is_placed() {
        let job = Job {
            name: "box".into(),
            shape: Shape::Box(BoxShape::default()),
            transform: Transform::from_position(glam::DVec3::new(0.0, 0.0, 5.0)),
            mesher: MesherConfig::default(),
            output: None,
        };
        let object = job.object().unwrap();
        assert_eq!(object.geom.name, "box");
        let p = object.geom.node_position(hexa_geom::NodeId(0)).unwrap();
        assert_eq!(p.z, 5.0);
    }

    #[test]
    fn test_malformed_job_is_rejected() {
        assert!(Job::from_ron_str("(name: \"x\")").is_err());
    }
}
