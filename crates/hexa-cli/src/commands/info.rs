//! Topology summary of a job's object

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use hexa_geom::{GeomObject, Model, NodeKind};

use super::Job;

#[derive(Args)]
pub struct InfoArgs {
    /// Job file (RON)
    pub job: PathBuf,

    /// Also list every node position
    #[arg(long)]
    pub nodes: bool,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let job = Job::load(&args.job)?;
    let object = job.object()?;

    let mut model = Model::new();
    let id = model.add_object(object.geom);
    let geom = model
        .get(id)
        .context("object missing from model after insertion")?;

    print!("{}", describe(geom, args.nodes)?);
    Ok(())
}

/// Human-readable summary with global ids and edge lengths in model space
fn describe(geom: &GeomObject, with_nodes: bool) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "=== {} ({}) ===", geom.name, geom.id)?;
    writeln!(
        out,
        "Nodes: {}  Edges: {}  Faces: {}  Parts: {}",
        geom.nodes().len(),
        geom.edges().len(),
        geom.faces().len(),
        geom.parts().len()
    )?;

    if with_nodes {
        writeln!(out, "\nNodes:")?;
        for node in geom.nodes() {
            let p = geom.node_position(node.id)?;
            let shape = if node.kind == NodeKind::Shape { " (shape)" } else { "" };
            writeln!(
                out,
                "  {:>4}  {:<8} ({:.6}, {:.6}, {:.6}){}",
                gid(node.gid),
                node.name,
                p.x,
                p.y,
                p.z,
                shape
            )?;
        }
    }

    writeln!(out, "\nEdges:")?;
    for edge in geom.edges() {
        let [a, b] = edge.curve.nodes();
        writeln!(
            out,
            "  {:>4}  {:<8} {:<13} {} -> {}  length {:.6}",
            gid(edge.gid),
            edge.name,
            edge.curve.kind().name(),
            a,
            b,
            geom.edge_length(edge.id)?
        )?;
    }

    writeln!(out, "\nFaces:")?;
    for face in geom.faces() {
        let parts: Vec<String> = face.parts.iter().flatten().map(|p| p.to_string()).collect();
        writeln!(
            out,
            "  {:>4}  {:<8} {} edges  parts [{}]{}",
            gid(face.gid),
            face.name,
            face.edges.len(),
            parts.join(", "),
            if face.is_external() { "  external" } else { "" }
        )?;
    }

    writeln!(out, "\nParts:")?;
    for part in geom.parts() {
        writeln!(out, "  {:>4}  {}", gid(part.gid), part.name)?;
    }
    Ok(out)
}

fn gid(gid: Option<u32>) -> String {
    gid.map_or_else(|| "-".to_string(), |g| g.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexa_mesh::{Shape, SphereInBoxShape};

    #[test]
    fn test_describe_sphere_in_box() {
        let shape = Shape::SphereInBox(SphereInBoxShape::new(4.0, 4.0, 4.0, 1.0));
        let geom = shape.build_object("cavity").unwrap();
        let mut model = Model::new();
        let id = model.add_object(geom);
        let text = describe(model.get(id).unwrap(), true).unwrap();

        assert!(text.contains("Nodes: 17  Edges: 24  Faces: 12  Parts: 1"));
        assert!(text.contains("(shape)"));
        assert_eq!(text.matches("Circular arc").count(), 12);
        assert_eq!(text.matches("external").count(), 12);
    }
}
