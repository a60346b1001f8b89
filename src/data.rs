use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use log::debug;

use crate::{
    config::LoadOptions,
    errors::{Error, Result},
    etl::{load_xml::{Input, XmlLoadEtl}, Etl},
};

use self::{
    geometry::{BBox, Vector2i},
    osm::{Node, OsmId, Relation, Way},
};

pub mod geometry;
pub mod osm;

/// Read-only view of loaded map data, as used by renderers and other consumers.
pub trait OsmDatasource {
    fn get_node(&self, id: OsmId) -> Result<&Node>;
    fn get_way(&self, id: OsmId) -> Result<&Way>;
    fn get_relation(&self, id: OsmId) -> Result<&Relation>;

    /// Appends every way whose bounding box intersects `bbox`. Ways are only
    /// filtered by their boxes, so callers needing exact geometry must refine.
    fn get_ways<'a>(&'a self, out: &mut Vec<&'a Way>, bbox: &BBox);

    fn get_bbox(&self) -> BBox;

    fn get_center(&self) -> Vector2i {
        self.get_bbox().center()
    }
}

/// Map data as defined in the .osm file, with derived way geometry.
///
/// Entities are keyed by id in ascending order, so every iteration (and
/// therefore [`OsmDatasource::get_ways`]) is deterministic for a given load.
/// The maps are only mutated by [`OsmMapData::load`] and [`OsmMapData::clear`].
#[derive(Debug, Default, Clone)]
pub struct OsmMapData {
    pub(crate) nodes: BTreeMap<OsmId, Node>,
    pub(crate) ways: BTreeMap<OsmId, Way>,
    pub(crate) relations: BTreeMap<OsmId, Relation>,
    pub(crate) bbox: BBox,
}

impl OsmMapData {
    pub fn new() -> Self {
        OsmMapData::default()
    }

    /// Streams an OSM XML document into the store.
    ///
    /// On error the store keeps whatever was loaded before the failure and
    /// should be cleared before it is loaded again.
    pub fn load(&mut self, input: Input<'_>, options: &LoadOptions) -> Result<()> {
        XmlLoadEtl::new(input, self, options).process()
    }

    pub fn load_from_str(&mut self, xml: &str, options: &LoadOptions) -> Result<()> {
        self.load(Input::Reader(Box::new(xml.as_bytes())), options)
    }

    /// Drops all entities and resets the dataset box to empty.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.ways.clear();
        self.relations.clear();
        self.bbox = BBox::empty();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ways(&self) -> impl Iterator<Item = &Way> {
        self.ways.values()
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    /// Ways whose bounding boxes intersect `bbox`, in ascending id order.
    pub fn ways_in(&self, bbox: BBox) -> impl Iterator<Item = &Way> {
        self.ways.values().filter(move |way| way.bbox.intersects(&bbox))
    }

    pub fn node_position(&self, id: OsmId) -> Result<Vector2i> {
        self.get_node(id).map(|node| node.pos)
    }

    // The first definition of an id is kept, later ones are dropped.
    pub(crate) fn insert_node(&mut self, node: Node) {
        if let Entry::Vacant(slot) = self.nodes.entry(node.id) {
            slot.insert(node);
        } else {
            debug!(kind = "node", id = node.id; "Ignoring repeated id");
        }
    }

    pub(crate) fn insert_way(&mut self, way: Way) {
        if let Entry::Vacant(slot) = self.ways.entry(way.id) {
            slot.insert(way);
        } else {
            debug!(kind = "way", id = way.id; "Ignoring repeated id");
        }
    }

    pub(crate) fn insert_relation(&mut self, relation: Relation) {
        if let Entry::Vacant(slot) = self.relations.entry(relation.id) {
            slot.insert(relation);
        } else {
            debug!(kind = "relation", id = relation.id; "Ignoring repeated id");
        }
    }
}

impl OsmDatasource for OsmMapData {
    fn get_node(&self, id: OsmId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| Error::data(format!("node {id} not found")))
    }

    fn get_way(&self, id: OsmId) -> Result<&Way> {
        self.ways
            .get(&id)
            .ok_or_else(|| Error::data(format!("way {id} not found")))
    }

    fn get_relation(&self, id: OsmId) -> Result<&Relation> {
        self.relations
            .get(&id)
            .ok_or_else(|| Error::data(format!("relation {id} not found")))
    }

    fn get_ways<'a>(&'a self, out: &mut Vec<&'a Way>, bbox: &BBox) {
        out.extend(self.ways_in(*bbox));
    }

    fn get_bbox(&self) -> BBox {
        self.bbox
    }
}
