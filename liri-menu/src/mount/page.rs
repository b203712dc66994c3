//! In-memory host page
//!
//! Holds the page's mount containers and their current states, records
//! every state transition and serialises to HTML. The CLI and the fragment
//! server render into it.

use super::{MountHost, MountState, StateKind};
use crate::render::{Element, Node};
use crate::section::SectionConfig;
use tracing::debug;

#[derive(Debug, Clone)]
struct Mount {
    attribute: String,
    parent: Option<String>,
    label: Option<String>,
    synthesized: bool,
    state: Option<MountState>,
}

impl Mount {
    fn new(attribute: &str, parent: Option<&str>) -> Self {
        Self {
            attribute: attribute.to_string(),
            parent: parent.map(str::to_string),
            label: None,
            synthesized: false,
            state: None,
        }
    }
}

/// A page made only of mount containers
#[derive(Debug, Clone, Default)]
pub struct PageDocument {
    mounts: Vec<Mount>,
    transitions: Vec<(String, StateKind)>,
}

impl PageDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page with one root container per section
    pub fn from_sections(sections: &[SectionConfig]) -> Self {
        let mut page = Self::new();
        for section in sections {
            page.add_mount(&section.mount);
        }
        page
    }

    /// A page with exactly the listed containers
    ///
    /// Bucket containers are nested under their section's root. Attributes
    /// matching no section stay on the page as top-level containers so that
    /// startup validation can report them.
    pub fn from_mounts(mounts: &[String], sections: &[SectionConfig]) -> Self {
        let mut page = Self::new();
        for attribute in mounts {
            let attribute = attribute.trim().trim_start_matches('[').trim_end_matches(']');
            let parent = sections.iter().find(|s| {
                s.mount != attribute
                    && s.template.bucket_scheme().is_some_and(|scheme| {
                        scheme
                            .buckets
                            .iter()
                            .any(|b| s.bucket_mount(b) == attribute)
                    })
            });
            match parent {
                Some(section) => page.add_child_mount(&section.mount, attribute),
                None => page.add_mount(attribute),
            }
        }
        page
    }

    pub fn add_mount(&mut self, attribute: &str) {
        if !self.contains(attribute) {
            self.mounts.push(Mount::new(attribute, None));
        }
    }

    /// Add an author-provided container nested under `parent`
    pub fn add_child_mount(&mut self, parent: &str, attribute: &str) {
        if !self.contains(attribute) {
            self.mounts.push(Mount::new(attribute, Some(parent)));
        }
    }

    pub fn state(&self, attribute: &str) -> Option<&MountState> {
        self.mount(attribute).and_then(|m| m.state.as_ref())
    }

    pub fn state_kind(&self, attribute: &str) -> Option<StateKind> {
        self.state(attribute).map(MountState::kind)
    }

    /// Every state written, in order
    pub fn transitions(&self) -> &[(String, StateKind)] {
        &self.transitions
    }

    /// States written to one container, in order
    pub fn transitions_of(&self, attribute: &str) -> Vec<StateKind> {
        self.transitions
            .iter()
            .filter(|(a, _)| a == attribute)
            .map(|(_, kind)| *kind)
            .collect()
    }

    /// Bucket containers created during rendering
    pub fn synthesized(&self, parent: &str) -> Vec<&str> {
        self.mounts
            .iter()
            .filter(|m| m.synthesized && m.parent.as_deref() == Some(parent))
            .map(|m| m.attribute.as_str())
            .collect()
    }

    fn mount(&self, attribute: &str) -> Option<&Mount> {
        self.mounts.iter().find(|m| m.attribute == attribute)
    }

    fn children(&self, parent: &str) -> impl Iterator<Item = &Mount> {
        let parent = parent.to_string();
        self.mounts
            .iter()
            .filter(move |m| m.parent.as_deref() == Some(parent.as_str()))
    }

    fn node_for(&self, mount: &Mount) -> Node {
        let mut container = Element::div().attr(&mount.attribute, "");

        match mount.state.as_ref().and_then(MountState::fragment) {
            Some(fragment) => container = container.child(fragment),
            None => {
                let (synthesized, authored): (Vec<&Mount>, Vec<&Mount>) =
                    self.children(&mount.attribute).partition(|m| m.synthesized);
                container = container.children(authored.into_iter().map(|m| self.node_for(m)));
                if !synthesized.is_empty() {
                    let grid = Element::div()
                        .class("w-layout-grid _2col_grid")
                        .children(synthesized.into_iter().map(|m| self.labelled_node(m)));
                    container = container.child(grid);
                }
            }
        }

        container.into()
    }

    fn labelled_node(&self, mount: &Mount) -> Element {
        let label = mount.label.as_deref().unwrap_or_default();
        Element::div()
            .class("menu-section-wrapper")
            .child(
                Element::div()
                    .class("menu-section-tittle-wrapper")
                    .child(Element::div().class("text-block").text(label)),
            )
            .child(self.node_for(mount))
    }

    /// HTML of one container and everything nested in it
    pub fn section_html(&self, attribute: &str) -> Option<String> {
        self.mount(attribute).map(|m| self.node_for(m).to_html())
    }

    /// HTML of every top-level container, one per line
    pub fn to_html(&self) -> String {
        self.mounts
            .iter()
            .filter(|m| m.parent.is_none())
            .map(|m| self.node_for(m).to_html())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl MountHost for PageDocument {
    fn mount_attributes(&self) -> Vec<String> {
        self.mounts.iter().map(|m| m.attribute.clone()).collect()
    }

    fn contains(&self, attribute: &str) -> bool {
        self.mount(attribute).is_some()
    }

    fn set_state(&mut self, attribute: &str, state: MountState) {
        match self.mounts.iter_mut().find(|m| m.attribute == attribute) {
            Some(mount) => {
                self.transitions.push((attribute.to_string(), state.kind()));
                mount.state = Some(state);
            }
            None => debug!(mount = %attribute, "Ignoring state for unknown container"),
        }
    }

    fn synthesize(&mut self, parent: &str, attribute: &str, label: &str) {
        if !self.contains(parent) || self.contains(attribute) {
            return;
        }
        let mut mount = Mount::new(attribute, Some(parent));
        mount.label = Some(label.to_string());
        mount.synthesized = true;
        self.mounts.push(mount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{default_sections, Template};

    #[test]
    fn test_from_mounts_nests_bucket_containers() {
        let sections = default_sections();
        let mounts = vec![
            "data-liri-wine".to_string(),
            "[data-liri-red-wine]".to_string(),
            "data-liri-coffee".to_string(),
            "data-liri-unknown".to_string(),
        ];
        let mut page = PageDocument::from_mounts(&mounts, &sections);
        assert_eq!(
            page.mount_attributes(),
            vec!["data-liri-wine", "data-liri-red-wine", "data-liri-coffee", "data-liri-unknown"]
        );

        page.set_state("data-liri-wine", MountState::Delegated);
        page.set_state("data-liri-red-wine", MountState::empty("Red Wine"));
        let html = page.section_html("data-liri-wine").unwrap();
        assert!(html.starts_with("<div data-liri-wine><div data-liri-red-wine>"));
        assert!(html.contains("No Red Wine items available at the moment"));
    }

    #[test]
    fn test_state_replaces_content() {
        let section = SectionConfig::new("tea", "data-liri-tea", "teaItem", Template::Simple);
        let mut page = PageDocument::from_sections(&[section]);
        page.set_state("data-liri-tea", MountState::loading("tea"));
        page.set_state("data-liri-tea", MountState::error("tea"));
        assert_eq!(
            page.to_html(),
            "<div data-liri-tea><div class=\"error-message\" role=\"alert\">Failed to load the tea menu</div></div>"
        );
        assert_eq!(
            page.transitions_of("data-liri-tea"),
            vec![StateKind::Loading, StateKind::Error]
        );
    }

    #[test]
    fn test_synthesized_buckets_get_headings() {
        let mut page = PageDocument::new();
        page.add_mount("data-liri-beer");
        page.synthesize("data-liri-beer", "data-liri-beer-local", "Greek Microbreweries");
        page.set_state("data-liri-beer", MountState::Delegated);
        page.set_state(
            "data-liri-beer-local",
            MountState::Content(Node::text("Alfa")),
        );

        let html = page.to_html();
        assert!(html.contains("<div class=\"w-layout-grid _2col_grid\">"));
        assert!(html.contains("<div class=\"text-block\">Greek Microbreweries</div>"));
        assert!(html.contains("<div data-liri-beer-local>Alfa</div>"));
        assert_eq!(page.synthesized("data-liri-beer"), vec!["data-liri-beer-local"]);
    }

    #[test]
    fn test_synthesize_requires_parent() {
        let mut page = PageDocument::new();
        page.synthesize("data-liri-beer", "data-liri-beer-local", "Local");
        assert!(!page.contains("data-liri-beer-local"));
    }

    #[test]
    fn test_unknown_container_state_ignored() {
        let mut page = PageDocument::new();
        page.set_state("data-liri-x", MountState::Delegated);
        assert!(page.transitions().is_empty());
    }
}
