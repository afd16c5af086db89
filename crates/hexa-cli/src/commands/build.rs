//! Mesh a job's object

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use hexa_mesh::HexMesh;
use tracing::info;

use super::Job;

#[derive(Args)]
pub struct BuildArgs {
    /// Job file (RON)
    pub job: PathBuf,

    /// Write the mesh as RON to this path
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Override the smoothing angle in degrees
    #[arg(long)]
    pub smoothing_angle: Option<f64>,
}

pub fn execute(args: BuildArgs) -> Result<()> {
    let job = Job::load(&args.job)?;
    let mut config = job.mesher.clone();
    if let Some(angle) = args.smoothing_angle {
        config = config.with_smoothing_angle(angle);
    }

    info!("Building '{}' from {}", job.name, args.job.display());
    let mut object = job.object()?;
    let mesh = object
        .update_mesh(&config)
        .with_context(|| format!("Meshing '{}' failed", job.name))?;
    print_summary(&job.name, mesh);

    if let Some(path) = args.out.as_ref().or(job.output.as_ref()) {
        write_mesh(mesh, path)?;
        info!("Mesh written to {}", path.display());
    }
    Ok(())
}

fn print_summary(name: &str, mesh: &HexMesh) {
    println!("=== {} ===", name);
    println!("Vertices:         {}", mesh.vertex_count());
    println!("Elements:         {}", mesh.element_count());
    println!("Boundary faces:   {}", mesh.face_count());
    println!("Edge segments:    {}", mesh.edge_count());
    println!("Smoothing groups: {}", mesh.smoothing_group_count());
    if let Some((lo, hi)) = mesh.bounding_box() {
        println!("Bounds:           {:?} .. {:?}", lo, hi);
    }
}

/// Serialize fully before touching the file
fn write_mesh(mesh: &HexMesh, path: &Path) -> Result<()> {
    let content = ron::ser::to_string_pretty(mesh, ron::ser::PrettyConfig::default())?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexa_geom::Transform;
    use hexa_mesh::{BoxShape, MesherConfig, Shape};

    fn write_job(dir: &Path, shape: Shape) -> PathBuf {
        let job = Job {
            name: "test".into(),
            shape,
            transform: Transform::default(),
            mesher: MesherConfig::default(),
            output: None,
        };
        let path = dir.join("job.ron");
        let content = ron::ser::to_string_pretty(&job, ron::ser::PrettyConfig::default()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_build_writes_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let shape = Shape::Box(BoxShape::new(1.0, 1.0, 1.0).with_divisions([2, 1, 1]));
        let job = write_job(dir.path(), shape);
        let out = dir.path().join("mesh.ron");

        execute(BuildArgs {
            job,
            out: Some(out.clone()),
            smoothing_angle: Some(30.0),
        })
        .unwrap();

        let mesh: HexMesh = ron::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.element_count(), 2);
    }

    #[test]
    fn test_failed_build_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let job = write_job(dir.path(), Shape::Box(BoxShape::new(0.0, 1.0, 1.0)));
        let out = dir.path().join("mesh.ron");

        let result = execute(BuildArgs {
            job,
            out: Some(out.clone()),
            smoothing_angle: None,
        });
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_job_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(BuildArgs {
            job: dir.path().join("absent.ron"),
            out: None,
            smoothing_angle: None,
        });
        assert!(result.is_err());
    }
}
