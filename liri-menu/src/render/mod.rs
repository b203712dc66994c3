//! Fragment renderer
//!
//! Turns a section's records into presentation trees: one tree for flat
//! templates, one sub-tree per canonical bucket for bucketed templates.
//! Items failing title validation are skipped with a warning; an empty
//! result is reported as [`RenderedSection::Empty`], never as content.

pub mod fragments;
pub mod node;
pub mod templates;

pub use node::{Element, Node};

use crate::classifier::group_by_bucket;
use crate::model::MenuItemRecord;
use crate::section::{Bucket, SectionConfig};
use tracing::{debug, warn};

/// Rendered sub-tree of one bucket; `None` when the bucket has no items
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBucket {
    pub bucket: &'static Bucket,
    pub content: Option<Node>,
}

/// Result of rendering one section
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedSection {
    Empty,
    Flat(Node),
    /// Every canonical bucket, in order; at least one has content
    Bucketed(Vec<RenderedBucket>),
}

/// Apply the section's boolean filter; absent flags read as `false`
pub fn apply_filter(records: Vec<MenuItemRecord>, section: &SectionConfig) -> Vec<MenuItemRecord> {
    match &section.filter {
        Some(filter) => records
            .into_iter()
            .filter(|r| r.flag(&filter.field) == filter.equals)
            .collect(),
        None => records,
    }
}

fn item_nodes<'a, I>(records: I, section: &SectionConfig, language: &str) -> Vec<Node>
where
    I: IntoIterator<Item = &'a MenuItemRecord>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let node = templates::item_node(record, section.template, language);
            if node.is_none() {
                warn!(
                    section = %section.name,
                    item_id = %record.id,
                    "Missing or invalid title, skipping item"
                );
            }
            node
        })
        .collect()
}

/// Render a section's records
pub fn render_section(
    section: &SectionConfig,
    records: Vec<MenuItemRecord>,
    language: &str,
) -> RenderedSection {
    let records = apply_filter(records, section);

    let Some(scheme) = section.template.bucket_scheme() else {
        let items = item_nodes(&records, section, language);
        debug!(section = %section.name, items = items.len(), "Rendered section");
        if items.is_empty() {
            return RenderedSection::Empty;
        }
        return RenderedSection::Flat(templates::wrap_section(section.template, items));
    };

    let buckets: Vec<RenderedBucket> = group_by_bucket(records, section, language)
        .into_iter()
        .map(|group| {
            let items = item_nodes(&group.records, section, language);
            debug!(
                section = %section.name,
                bucket = group.bucket.key,
                items = items.len(),
                "Rendered bucket"
            );
            RenderedBucket {
                bucket: group.bucket,
                content: (!items.is_empty()).then(|| templates::wrap_bucket(scheme.layout, items)),
            }
        })
        .collect();

    if buckets.iter().all(|b| b.content.is_none()) {
        RenderedSection::Empty
    } else {
        RenderedSection::Bucketed(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Template;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<MenuItemRecord> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    #[test]
    fn test_one_node_per_titled_record() {
        let section = SectionConfig::new("coffee", "data-liri-coffee", "coffeeItem", Template::Simple);
        let input = records(vec![
            json!({"_id": "1", "title": {"en": "Espresso"}, "price": 2.5}),
            json!({"_id": "2", "title": {"gr": "Φραπέ"}, "price": 3}),
            json!({"_id": "3", "title": {"en": "Cappuccino"}}),
        ]);
        let RenderedSection::Flat(node) = render_section(&section, input, "en") else {
            panic!("expected flat content");
        };
        let items = node.find_by_class("menu-item-wrapper");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_no_records_is_empty() {
        let section = SectionConfig::new("tea", "data-liri-tea", "teaItem", Template::Simple);
        assert_eq!(render_section(&section, Vec::new(), "en"), RenderedSection::Empty);
    }

    #[test]
    fn test_only_untitled_records_is_empty() {
        let section = SectionConfig::new("tea", "data-liri-tea", "teaItem", Template::Simple);
        let input = records(vec![json!({"_id": "1", "price": 2})]);
        assert_eq!(render_section(&section, input, "en"), RenderedSection::Empty);
    }

    #[test]
    fn test_client_side_filter() {
        let section = SectionConfig::new("juices", "data-liri-juices", "juiceItem", Template::Simple)
            .with_filter("isAlcoholFree", true);
        let input = records(vec![
            json!({"_id": "1", "title": {"en": "Orange"}, "price": 4, "isAlcoholFree": true}),
            json!({"_id": "2", "title": {"en": "Sangria"}, "price": 6, "isAlcoholFree": false}),
            json!({"_id": "3", "title": {"en": "Punch"}, "price": 6}),
        ]);
        let RenderedSection::Flat(node) = render_section(&section, input, "en") else {
            panic!("expected flat content");
        };
        assert_eq!(node.text_content(), "Orange4,00");
    }

    #[test]
    fn test_bucketed_section_keeps_all_buckets() {
        let section = SectionConfig::new("wine", "data-liri-wine", "wineItem", Template::Wine);
        let input = records(vec![json!({
            "_id": "w1",
            "title": {"en": "Assyrtiko"},
            "subCategory": "white wine",
            "bottlePrice": 18
        })]);
        let RenderedSection::Bucketed(buckets) = render_section(&section, input, "en") else {
            panic!("expected bucketed content");
        };
        let keys: Vec<_> = buckets.iter().map(|b| b.bucket.key).collect();
        assert_eq!(keys, vec!["sparkling-wine", "white-wine", "rose-wine", "red-wine"]);
        let white = buckets[1].content.as_ref().unwrap();
        assert_eq!(
            white.find_by_class(templates::PRICE_CLASS)[0].text_content(),
            "18,00"
        );
        assert!(buckets[0].content.is_none());
        assert!(buckets[2].content.is_none());
        assert!(buckets[3].content.is_none());
    }

    #[test]
    fn test_bucketed_with_only_unknown_categories_is_empty() {
        let section = SectionConfig::new("beer", "data-liri-beer", "beerItem", Template::Beer);
        let input = records(vec![json!({"_id": "b", "title": {"en": "Stout"}, "beerType": "craft"})]);
        assert_eq!(render_section(&section, input, "en"), RenderedSection::Empty);
    }
}
