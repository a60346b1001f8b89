use std::collections::hash_map::Entry;

use quick_xml::events::BytesStart;

use crate::{
    config::DuplicateTags,
    data::osm::Tags,
    errors::{Error, Result},
};

/// Reads the `k` and `v` attributes of a `tag` element into `tags`. Other
/// attributes are ignored; a missing `k` or `v` reads as the empty string.
pub fn parse_tag(tags: &mut Tags, el: &BytesStart, policy: DuplicateTags) -> Result<()> {
    let mut key = String::new();
    let mut value = String::new();

    for attribute_res in el.attributes() {
        let attribute = attribute_res?;
        match attribute.key.as_ref() {
            b"k" => key = attribute.unescape_value()?.into_owned(),
            b"v" => value = attribute.unescape_value()?.into_owned(),
            _ => (),
        }
    }

    insert_tag(tags, key, value, policy)
}

pub fn insert_tag(
    tags: &mut Tags,
    key: String,
    value: String,
    policy: DuplicateTags,
) -> Result<()> {
    match tags.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(value);
        },
        Entry::Occupied(mut entry) => match policy {
            DuplicateTags::FirstWins => (),
            DuplicateTags::LastWins => {
                entry.insert(value);
            },
            DuplicateTags::Reject => {
                return Err(Error::parsing(format!("duplicate tag key \"{}\"", entry.key())));
            },
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tag(content: &str) -> BytesStart<'_> {
        BytesStart::from_content(content, 3)
    }

    #[test]
    fn reads_key_and_value_in_any_order() {
        let mut tags = Tags::new();
        let policy = DuplicateTags::FirstWins;
        parse_tag(&mut tags, &tag(r#"tag v="residential" k="highway""#), policy)
            .expect("tag should parse");
        parse_tag(&mut tags, &tag(r#"tag k="name" extra="1" v="Fish &amp; Chips""#), policy)
            .expect("tag should parse");
        assert_eq!(tags.get("highway").map(String::as_str), Some("residential"));
        assert_eq!(tags.get("name").map(String::as_str), Some("Fish & Chips"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn missing_value_is_empty() {
        let mut tags = Tags::new();
        parse_tag(&mut tags, &tag(r#"tag k="area""#), DuplicateTags::FirstWins)
            .expect("tag should parse");
        assert_eq!(tags.get("area").map(String::as_str), Some(""));
    }

    #[rstest]
    #[case(DuplicateTags::FirstWins, Some("first"))]
    #[case(DuplicateTags::LastWins, Some("second"))]
    fn duplicate_keys_follow_policy(#[case] policy: DuplicateTags, #[case] expected: Option<&str>) {
        let mut tags = Tags::new();
        insert_tag(&mut tags, "name".to_string(), "first".to_string(), policy)
            .expect("first insert");
        insert_tag(&mut tags, "name".to_string(), "second".to_string(), policy)
            .expect("second insert");
        assert_eq!(tags.get("name").map(String::as_str), expected);
    }

    #[test]
    fn duplicate_keys_can_be_rejected() {
        let mut tags = Tags::new();
        let policy = DuplicateTags::Reject;
        insert_tag(&mut tags, "name".to_string(), "first".to_string(), policy)
            .expect("first insert");
        let err = insert_tag(&mut tags, "name".to_string(), "second".to_string(), policy);
        assert!(matches!(err, Err(Error::Parsing { .. })));
        assert_eq!(tags.get("name").map(String::as_str), Some("first"));
    }
}
