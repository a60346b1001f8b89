//! Element dispatcher for the OSM XML grammar.
//!
//! The parser only sees element opens and closes. Top-level `node`, `way` and
//! `relation` elements start a container; their children are interpreted by
//! the container's rules. Unknown elements at depth 0 and 1 are skipped, while
//! anything unexpected at depth 2 or deeper is an error.

use std::{mem, str};

use log::trace;
use quick_xml::events::{attributes::Attribute, BytesStart};

use crate::{
    config::LoadOptions,
    data::{
        geometry::{BBox, Vector2i},
        osm::{Member, MemberType, Node, OsmId, Relation, Way},
        OsmMapData,
    },
    errors::{Error, Result},
    etl::{coords, postprocess, tags},
};

/// The top-level element being filled. The entity is owned here until its
/// closing tag commits it to the store.
enum ParserState {
    Top,
    Node(Node),
    Way(Way),
    Relation(Relation),
}

pub struct OsmParser<'a> {
    store: &'a mut OsmMapData,
    options: &'a LoadOptions,
    depth: usize,
    state: ParserState,
    seen_root: bool,
}

fn attr_str<'a>(attribute: &Attribute<'a>) -> Result<std::borrow::Cow<'a, str>> {
    Ok(attribute.unescape_value()?)
}

fn parse_id(attribute: &Attribute) -> Result<OsmId> {
    let value = str::from_utf8(&attribute.value)?;
    value
        .parse()
        .map_err(|_| Error::parsing(format!("bad id \"{value}\"")))
}

fn parse_coord_attr(attribute: &Attribute) -> Result<i32> {
    coords::parse_coord(str::from_utf8(&attribute.value)?)
}

fn missing(attribute: &str, element: &str) -> Error {
    Error::parsing(format!("no {attribute} attribute for {element} tag"))
}

impl<'a> OsmParser<'a> {
    pub fn new(store: &'a mut OsmMapData, options: &'a LoadOptions) -> Self {
        OsmParser {
            store,
            options,
            depth: 0,
            state: ParserState::Top,
            seen_root: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn start_element(&mut self, el: &BytesStart) -> Result<()> {
        if self.depth == 0 && self.seen_root {
            self.depth += 1;
            return Err(Error::parsing("junk after document element"));
        }
        let result = self.dispatch(el);
        self.seen_root = true;
        self.depth += 1;
        result
    }

    pub fn end_element(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        if self.depth != 1 {
            return Ok(());
        }

        match mem::replace(&mut self.state, ParserState::Top) {
            ParserState::Top => (),
            ParserState::Node(node) => self.store.insert_node(node),
            ParserState::Way(mut way) => {
                postprocess::finish_way(&mut way, &self.store.nodes)?;
                self.store.insert_way(way);
            },
            ParserState::Relation(relation) => self.store.insert_relation(relation),
        }
        Ok(())
    }

    /// Character data is only allowed inside the document element. Inside it,
    /// text carries no map data and is ignored.
    pub fn text(&self, text: &[u8]) -> Result<()> {
        if self.depth > 0 || text.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        if self.seen_root {
            Err(Error::parsing("junk after document element"))
        } else {
            Err(Error::parsing("text before document element"))
        }
    }

    /// Checks that the document was complete. Called once the tokenizer
    /// reports the end of input.
    pub fn finish(&self) -> Result<()> {
        if !self.seen_root {
            return Err(Error::parsing("no element found"));
        }
        if self.depth != 0 {
            return Err(Error::parsing("unclosed element at end of input"));
        }
        Ok(())
    }

    fn dispatch(&mut self, el: &BytesStart) -> Result<()> {
        let depth = self.depth;
        if depth == 1 && matches!(self.state, ParserState::Top) {
            return self.start_top_level(el);
        }
        if depth < 2 {
            return Ok(());
        }

        let options = self.options;
        let name = el.name();
        match &mut self.state {
            ParserState::Node(node) if depth == 2 => match name.as_ref() {
                b"tag" if options.node_tags => {
                    tags::parse_tag(&mut node.tags, el, options.duplicate_tags)
                },
                b"tag" => Ok(()),
                _ => Err(Error::parsing("unexpected tag in node")),
            },
            ParserState::Way(way) if depth == 2 => match name.as_ref() {
                b"tag" => tags::parse_tag(&mut way.tags, el, options.duplicate_tags),
                b"nd" => {
                    way.nodes.push(Self::parse_nd(el)?);
                    Ok(())
                },
                _ => Err(Error::parsing("unexpected tag in way")),
            },
            ParserState::Relation(relation) if depth == 2 => match name.as_ref() {
                b"tag" if options.reject_relation_tags => {
                    Err(Error::parsing("unexpected tag in relation"))
                },
                b"tag" if options.relation_tags => {
                    tags::parse_tag(&mut relation.tags, el, options.duplicate_tags)
                },
                b"tag" => Ok(()),
                b"member" => {
                    relation.members.push(Self::parse_member(el)?);
                    Ok(())
                },
                _ => Err(Error::parsing("unexpected tag in relation")),
            },
            _ => Err(Error::parsing("unexpected tag")),
        }
    }

    fn start_top_level(&mut self, el: &BytesStart) -> Result<()> {
        match el.name().as_ref() {
            b"node" => self.state = ParserState::Node(Self::parse_node(el)?),
            b"way" => self.state = ParserState::Way(Way::new(Self::parse_element_id(el, "way")?)),
            b"relation" => {
                let id = Self::parse_element_id(el, "relation")?;
                self.state = ParserState::Relation(Relation::new(id));
            },
            b"bounds" => self.store.bbox = Self::parse_bounds(el)?,
            b"bound" => self.store.bbox = Self::parse_bound(el)?,
            other => {
                let element = String::from_utf8_lossy(other);
                trace!(element = &*element; "Skipping unknown top-level element");
            },
        }
        Ok(())
    }

    fn parse_node(el: &BytesStart) -> Result<Node> {
        let mut id: Option<OsmId> = None;
        let mut lat: Option<i32> = None;
        let mut lon: Option<i32> = None;

        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            match attribute.key.as_ref() {
                b"id" => id = Some(parse_id(&attribute)?),
                b"lat" => lat = Some(parse_coord_attr(&attribute)?),
                b"lon" => lon = Some(parse_coord_attr(&attribute)?),
                _ => (),
            }
        }

        Ok(Node::new(
            id.ok_or_else(|| missing("id", "node"))?,
            Vector2i::new(
                lon.ok_or_else(|| missing("lon", "node"))?,
                lat.ok_or_else(|| missing("lat", "node"))?,
            ),
        ))
    }

    fn parse_element_id(el: &BytesStart, element: &str) -> Result<OsmId> {
        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            if attribute.key.as_ref() == b"id" {
                return parse_id(&attribute);
            }
        }
        Err(missing("id", element))
    }

    fn parse_nd(el: &BytesStart) -> Result<OsmId> {
        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            if attribute.key.as_ref() == b"ref" {
                return parse_id(&attribute);
            }
        }
        Err(missing("ref", "nd"))
    }

    fn parse_member(el: &BytesStart) -> Result<Member> {
        let mut member_type: Option<MemberType> = None;
        let mut ref_id: Option<OsmId> = None;
        let mut role = String::new();

        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            match attribute.key.as_ref() {
                b"type" => member_type = Some(attr_str(&attribute)?.parse()?),
                b"ref" => ref_id = Some(parse_id(&attribute)?),
                b"role" => role = attr_str(&attribute)?.into_owned(),
                _ => return Err(Error::parsing("unexpected attribute in relation member")),
            }
        }

        Ok(Member {
            member_type: member_type.ok_or_else(|| missing("type", "member"))?,
            ref_id: ref_id.ok_or_else(|| missing("ref", "member"))?,
            role,
        })
    }

    /// `bounds` must carry all four limits and describe a non-empty box.
    fn parse_bounds(el: &BytesStart) -> Result<BBox> {
        let mut bbox = BBox::empty();

        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            match attribute.key.as_ref() {
                b"minlat" => bbox.bottom = parse_coord_attr(&attribute)?,
                b"maxlat" => bbox.top = parse_coord_attr(&attribute)?,
                b"minlon" => bbox.left = parse_coord_attr(&attribute)?,
                b"maxlon" => bbox.right = parse_coord_attr(&attribute)?,
                _ => (),
            }
        }

        if bbox.is_empty() {
            return Err(Error::parsing("incorrect bounding box"));
        }
        Ok(bbox)
    }

    /// Without a `box` attribute the result stays empty and the dataset box is
    /// recomputed from the nodes after the load.
    fn parse_bound(el: &BytesStart) -> Result<BBox> {
        let mut bbox = BBox::empty();

        for attribute_res in el.attributes() {
            let attribute = attribute_res?;
            if attribute.key.as_ref() == b"box" {
                bbox = coords::parse_box(&attr_str(&attribute)?)?;
            }
        }

        Ok(bbox)
    }
}
