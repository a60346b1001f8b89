use std::collections::BTreeMap;

use crate::{
    data::{
        geometry::{BBox, Vector2i},
        osm::{Node, OsmId, Way},
        OsmMapData,
    },
    errors::{Error, Result},
};

/// Twice the signed area contributed by the edge `a -> b`.
fn cross(a: Vector2i, b: Vector2i) -> i128 {
    i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y)
}

/// Derives closure, winding order and bounding box of a way whose node list
/// is complete. Every referenced node must already be loaded.
///
/// With Y pointing north, a negative shoelace sum means the ring is walked
/// clockwise. Zero-area rings count as counter-clockwise.
pub fn finish_way(way: &mut Way, nodes: &BTreeMap<OsmId, Node>) -> Result<()> {
    way.closed = !way.nodes.is_empty() && way.nodes.first() == way.nodes.last();

    let mut bbox = BBox::empty();
    let mut area: i128 = 0;
    let mut prev: Option<Vector2i> = None;

    for &node_id in &way.nodes {
        let pos = nodes.get(&node_id).map(|node| node.pos).ok_or_else(|| {
            Error::data(format!(
                "node {node_id} referenced by way {} was not found in this dump",
                way.id
            ))
        })?;
        if let Some(prev) = prev {
            area += cross(prev, pos);
        }
        prev = Some(pos);
        bbox.include(pos);
    }

    way.bbox = bbox;
    way.clockwise = way.closed && area < 0;
    Ok(())
}

/// Recomputes the dataset box from all nodes unless a valid one was declared.
/// Returns whether the box was recomputed.
pub fn finish_dataset(store: &mut OsmMapData) -> bool {
    if !store.bbox.is_empty() {
        return false;
    }
    store.bbox = store.nodes.values().map(|node| node.pos).collect();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    /// Corners of a 10x10 square: 1=(0,0) 2=(10,0) 3=(10,10) 4=(0,10).
    #[fixture]
    fn square() -> BTreeMap<OsmId, Node> {
        [
            (1, 0, 0),
            (2, 10, 0),
            (3, 10, 10),
            (4, 0, 10),
            (5, 1_800_000_000, 900_000_000),
            (6, -1_800_000_000, -900_000_000),
        ]
        .into_iter()
        .map(|(id, x, y)| (id, Node::new(id, Vector2i::new(x, y))))
        .collect()
    }

    fn way(refs: &[OsmId]) -> Way {
        let mut way = Way::new(99);
        way.nodes = refs.to_vec();
        way
    }

    #[rstest]
    #[case(&[1, 2, 3, 1], true, false)]
    #[case(&[1, 2, 3, 4, 1], true, false)]
    #[case(&[1, 4, 3, 2, 1], true, true)]
    #[case(&[1, 2, 3], false, false)]
    #[case(&[1, 4, 3, 2], false, false)]
    #[case(&[1, 3, 1], true, false)]
    #[case(&[2], true, false)]
    #[case(&[], false, false)]
    fn closure_and_winding(
        square: BTreeMap<OsmId, Node>,
        #[case] refs: &[OsmId],
        #[case] closed: bool,
        #[case] clockwise: bool,
    ) {
        let mut way = way(refs);
        finish_way(&mut way, &square).expect("all nodes exist");
        assert_eq!(way.closed, closed);
        assert_eq!(way.clockwise, clockwise);
    }

    #[rstest]
    fn bbox_covers_referenced_nodes(square: BTreeMap<OsmId, Node>) {
        let mut open = way(&[2, 3]);
        finish_way(&mut open, &square).expect("all nodes exist");
        assert_eq!(open.bbox, BBox::new(10, 0, 10, 10));

        let mut empty = way(&[]);
        finish_way(&mut empty, &square).expect("nothing to resolve");
        assert!(empty.bbox.is_empty());
    }

    #[rstest]
    fn extreme_coordinates_do_not_overflow(square: BTreeMap<OsmId, Node>) {
        let mut ring = way(&[6, 5, 1, 6]);
        finish_way(&mut ring, &square).expect("all nodes exist");
        assert!(ring.closed);
        assert_eq!(ring.bbox, BBox::new(-1_800_000_000, -900_000_000, 1_800_000_000, 900_000_000));
    }

    #[rstest]
    #[case(&[1, 2, 42, 1])]
    #[case(&[1, 42])]
    fn missing_nodes_are_data_errors(square: BTreeMap<OsmId, Node>, #[case] refs: &[OsmId]) {
        let mut way = way(refs);
        let err = finish_way(&mut way, &square).expect_err("node 42 is missing");
        assert!(matches!(err, Error::Data(_)));
        assert_eq!(err.to_string(), "node 42 referenced by way 99 was not found in this dump");
    }

    #[rstest]
    fn dataset_box_declared_or_recomputed(square: BTreeMap<OsmId, Node>) {
        let mut store = OsmMapData::new();
        store.nodes = square.into_iter().filter(|(id, _)| *id <= 4).collect();
        assert!(finish_dataset(&mut store));
        assert_eq!(store.bbox, BBox::new(0, 0, 10, 10));

        store.bbox = BBox::new(-5, -5, 5, 5);
        assert!(!finish_dataset(&mut store));
        assert_eq!(store.bbox, BBox::new(-5, -5, 5, 5));
    }
}
