use std::{collections::HashMap, fmt, str::FromStr};

use crate::errors::Error;

use super::geometry::{BBox, Vector2i};

pub type OsmId = i64;

pub type Tags = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    pub pos: Vector2i,
    /// Only filled when node tags are enabled in the load options.
    pub tags: Tags,
}

impl Node {
    pub fn new(id: OsmId, pos: Vector2i) -> Self {
        Node {
            id,
            pos,
            tags: Tags::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: OsmId,
    pub nodes: Vec<OsmId>,
    pub tags: Tags,
    /// Covers the referenced nodes as they were when the way was closed.
    pub bbox: BBox,
    pub closed: bool,
    /// Only meaningful for closed ways.
    pub clockwise: bool,
}

impl Way {
    pub fn new(id: OsmId) -> Self {
        Way {
            id,
            nodes: Vec::new(),
            tags: Tags::new(),
            bbox: BBox::empty(),
            closed: false,
            clockwise: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Node => "node",
            MemberType::Way => "way",
            MemberType::Relation => "relation",
        }
    }
}

impl FromStr for MemberType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(MemberType::Node),
            "way" => Ok(MemberType::Way),
            "relation" => Ok(MemberType::Relation),
            other => Err(Error::parsing(format!("bad relation member type \"{other}\""))),
        }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub member_type: MemberType,
    pub ref_id: OsmId,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    /// In document order.
    pub members: Vec<Member>,
    /// Only filled when relation tags are enabled in the load options.
    pub tags: Tags,
}

impl Relation {
    pub fn new(id: OsmId) -> Self {
        Relation {
            id,
            members: Vec::new(),
            tags: Tags::new(),
        }
    }
}
