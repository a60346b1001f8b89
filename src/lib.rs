//! Streaming loader for OpenStreetMap XML dumps.
//!
//! A dump is read once into an [`OsmMapData`] store holding nodes, ways and
//! relations keyed by id. While loading, every way gets its bounding box,
//! closed flag and winding order, and the dataset gets a bounding box, either
//! the declared one or the union of all node positions. Coordinates are kept
//! as fixed-point integers (degrees scaled by 10^7).
//!
//! ```no_run
//! use osm_preload::{Input, LoadOptions, OsmDatasource, OsmMapData};
//!
//! let mut data = OsmMapData::new();
//! data.load(Input::from_arg("map.osm"), &LoadOptions::default())?;
//! let mut ways = Vec::new();
//! data.get_ways(&mut ways, &data.get_bbox());
//! # Ok::<(), osm_preload::Error>(())
//! ```

pub mod config;
pub mod data;
pub mod errors;
pub mod etl;

pub use config::{Compression, DuplicateTags, LoadOptions};
pub use data::geometry::{BBox, Vector2i, COORD_SCALE};
pub use data::osm::{Member, MemberType, Node, OsmId, Relation, Tags, Way};
pub use data::{OsmDatasource, OsmMapData};
pub use errors::{Error, Position, Result};
pub use etl::load_xml::Input;
