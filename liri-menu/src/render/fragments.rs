//! Loading, empty and error fragments shown in place of section content

use super::node::{Element, Node};

pub fn loading(name: &str) -> Node {
    Element::div()
        .class("loading-indicator")
        .child(Element::div().class("loading-spinner"))
        .child(
            Element::div()
                .class("loading-text")
                .text(&format!("Loading {} menu...", name)),
        )
        .into()
}

pub fn empty(name: &str) -> Node {
    Element::div()
        .class("empty-menu")
        .text(&format!("No {} items available at the moment", name))
        .into()
}

pub fn error(name: &str) -> Node {
    Element::div()
        .class("error-message")
        .attr("role", "alert")
        .text(&format!("Failed to load the {} menu", name))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_name_the_section() {
        assert_eq!(loading("coffee").text_content(), "Loading coffee menu...");
        assert_eq!(empty("tea").text_content(), "No tea items available at the moment");
        assert_eq!(error("beer").text_content(), "Failed to load the beer menu");
    }

    #[test]
    fn test_fragment_classes() {
        assert!(loading("x").as_element().unwrap().has_class("loading-indicator"));
        assert!(empty("x").as_element().unwrap().has_class("empty-menu"));
        assert!(error("x").as_element().unwrap().has_class("error-message"));
    }
}
