//! Model: the set of geometric objects and their global numbering

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::object::GeomObject;
use crate::topology::{GeomEdge, GeomFace, GeomNode, GeomPart, TopologyError, TopologyResult};

/// Per-kind counters handing out model-wide ids, starting at 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounters {
    nodes: u32,
    edges: u32,
    faces: u32,
    parts: u32,
}

impl ItemCounters {
    pub fn next_node(&mut self) -> u32 {
        self.nodes += 1;
        self.nodes
    }

    pub fn next_edge(&mut self) -> u32 {
        self.edges += 1;
        self.edges
    }

    pub fn next_face(&mut self) -> u32 {
        self.faces += 1;
        self.faces
    }

    pub fn next_part(&mut self) -> u32 {
        self.parts += 1;
        self.parts
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    objects: Vec<GeomObject>,
    counters: ItemCounters,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, numbering its entities model-wide
    pub fn add_object(&mut self, mut object: GeomObject) -> Uuid {
        object.assign_global_ids(&mut self.counters);
        let id = object.id;
        tracing::debug!(
            "Added object '{}' ({} nodes, {} edges, {} faces, {} parts)",
            object.name,
            object.nodes().len(),
            object.edges().len(),
            object.faces().len(),
            object.parts().len()
        );
        self.objects.push(object);
        id
    }

    pub fn remove_object(&mut self, id: Uuid) -> TopologyResult<GeomObject> {
        let index = self
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(TopologyError::ObjectNotFound(id))?;
        Ok(self.objects.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&GeomObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut GeomObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn objects(&self) -> &[GeomObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn find_node(&self, gid: u32) -> Option<&GeomNode> {
        self.objects
            .iter()
            .flat_map(|o| o.nodes())
            .find(|n| n.gid == Some(gid))
    }

    pub fn find_edge(&self, gid: u32) -> Option<&GeomEdge> {
        self.objects
            .iter()
            .flat_map(|o| o.edges())
            .find(|e| e.gid == Some(gid))
    }

    pub fn find_face(&self, gid: u32) -> Option<&GeomFace> {
        self.objects
            .iter()
            .flat_map(|o| o.faces())
            .find(|f| f.gid == Some(gid))
    }

    pub fn find_part(&self, gid: u32) -> Option<&GeomPart> {
        self.objects
            .iter()
            .flat_map(|o| o.parts())
            .find(|p| p.gid == Some(gid))
    }
}
