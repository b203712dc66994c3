//! Per-template item nodes and list wrappers
//!
//! Every item builder returns `None` when the record fails title
//! validation. A missing price never skips an item; the price cell is
//! rendered blank.

use super::node::{Element, Node};
use crate::model::MenuItemRecord;
use crate::price::{self, PriceShape};
use crate::section::{BucketLayout, Template};

/// Class carried by every rendered price cell
pub const PRICE_CLASS: &str = "menu-item-price";

/// Presentation node for one record
pub fn item_node(record: &MenuItemRecord, template: Template, language: &str) -> Option<Node> {
    let title = record.display_title(language)?;
    let price = price::format(&PriceShape::of(record, template));

    let node = match template {
        Template::Simple => simple_item(title, &price),
        Template::TaggedCocktail => tagged_cocktail_item(record, title, &price, language),
        Template::CategorizedCocktail | Template::SpiritVariant => {
            described_item(title_cell(title), &price, record.display_description(language))
        }
        Template::Wine => wine_item(record, title, &price, language),
        Template::Beer => beer_item(record, title, &price, language),
    };
    Some(node.into())
}

fn title_cell(title: &str) -> Element {
    Element::div().class("menu-item-title").text(title)
}

fn title_row(title: Element, price: &str) -> Element {
    Element::div()
        .class("w-layout-grid menu-item-tittle")
        .child(title)
        .child(Element::div().class("menu-item-dots"))
        .child(Element::div().class(PRICE_CLASS).text(price))
}

fn simple_item(title: &str, price: &str) -> Element {
    Element::div()
        .class("menu-item-wrapper")
        .child(title_row(title_cell(title), price))
}

fn described_item(title: Element, price: &str, description: Option<&str>) -> Element {
    let item = Element::div()
        .class("menu-item-wrapper")
        .child(title_row(title, price));
    match description {
        Some(text) => item.child(Element::div().class("menu-item-description").text(text)),
        None => item,
    }
}

fn wine_item(record: &MenuItemRecord, title: &str, price: &str, language: &str) -> Element {
    let grapes = record.display_grape_varieties(language);
    let description = record.display_description(language);

    let item = Element::div()
        .class("menu-item-wrapper")
        .child(title_row(title_cell(title), price));
    if description.is_none() && grapes.is_none() {
        return item;
    }

    let mut text = Element::div().class("menu-item-description");
    if let Some(description) = description {
        text = text.text(description);
    }
    if let Some(grapes) = grapes {
        let span = Element::new("span")
            .class("grape_variety")
            .text(&format!("({})", grapes));
        text = if description.is_some() {
            text.text(" ").child(span)
        } else {
            text.child(span)
        };
    }
    item.child(text)
}

fn beer_item(record: &MenuItemRecord, title: &str, price: &str, language: &str) -> Element {
    let mut cell = title_cell(title);
    if let Some(size) = record.size_label() {
        if !title.contains(size.as_str()) {
            cell = cell.child(
                Element::new("span")
                    .class("text-size-tiny text-weight-normal")
                    .text(&format!(" {}ml", size)),
            );
        }
    }
    described_item(cell, price, record.display_description(language))
}

/// `/signature-cocktails/<slug>` path for a cocktail title
pub fn cocktail_slug(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn tagged_cocktail_item(
    record: &MenuItemRecord,
    title: &str,
    price: &str,
    language: &str,
) -> Element {
    let heading = Element::div()
        .class("w-layout-grid cocktail-item-tittle")
        .child(Element::div().class("heading-style-h3").text(title))
        .child(Element::div().class("menu-item-dots"))
        .child(Element::div().class("heading-style-h5").class(PRICE_CLASS).text(price));

    let description = Element::div().class("cocktail-description_wrapper").child(
        Element::div()
            .class("text-size-medium")
            .text(record.display_description(language).unwrap_or_default()),
    );

    let tags = record.tag_names();
    let mut bottom = Element::div().class("cocktail-item_bottom-area");
    if !tags.is_empty() {
        let chips = tags.into_iter().map(|name| {
            Element::div().class("flavour-tag_container w-dyn-item").child(
                Element::div()
                    .class("flavour-tag")
                    .child(Element::div().class("text-size-small").text(name)),
            )
        });
        bottom = bottom.child(
            Element::div()
                .class("w-dyn-list")
                .child(Element::div().class("flavour-tags w-dyn-items").children(chips)),
        );
    }

    let link = Element::new("a")
        .class("cocktail-page_link w-inline-block w-condition-invisible")
        .attr("href", &format!("/signature-cocktails/{}", cocktail_slug(title)));

    let mut badge = Element::div().class("new-cocktail_wrapper");
    if !record.is_new() {
        badge = badge.class("w-condition-invisible");
    }
    let badge = badge.child(Element::div().class("text-size-tiny").text("NEW"));

    Element::div().class("w-dyn-item").child(
        Element::div()
            .class("cocktail-item_wrapper")
            .child(heading)
            .child(description)
            .child(Element::div().class("spacer-tiny"))
            .child(bottom)
            .child(link)
            .child(badge),
    )
}

/// Wrap a flat section's item nodes
pub fn wrap_section(template: Template, items: Vec<Node>) -> Node {
    match template {
        Template::TaggedCocktail => Element::div()
            .class("w-layout-grid menu-section-wrapper")
            .child(
                Element::div()
                    .class("w-dyn-list")
                    .child(Element::div().class("collection-list w-dyn-items").children(items)),
            )
            .into(),
        _ => Element::div()
            .class("w-layout-grid menu-section-wrapper")
            .children(items)
            .into(),
    }
}

/// Wrap one bucket's item nodes
pub fn wrap_bucket(layout: BucketLayout, items: Vec<Node>) -> Node {
    match layout {
        BucketLayout::Accordion => Element::div()
            .class("w-layout-grid accordion-content")
            .child(Element::div().class("spacer-small"))
            .children(items)
            .child(Element::div().class("spacer-small"))
            .into(),
        BucketLayout::Grid => Element::div()
            .class("w-layout-grid menu-section-wrapper")
            .children(items)
            .into(),
    }
}
