//! Multi-block hexahedral mesher
//!
//! This crate contains:
//! - Block: hexahedral region with subdivisions, grading and classification
//! - MultiBlock: block set authoring and the structured mesh generator
//! - HexMesh: welded output mesh with vertex classification and smoothing groups
//! - Primitive shapes described as static block tables
//! - MeshObject / build_mesh: the meshing entry point for one object

pub mod block;
pub mod config;
pub mod constants;
pub mod error;
pub mod mesh;
pub mod multiblock;
pub mod object;
pub mod primitive;

pub use block::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use mesh::*;
pub use multiblock::{EdgeGrid, MbNode, MultiBlock, trilinear};
pub use object::*;
pub use primitive::*;
