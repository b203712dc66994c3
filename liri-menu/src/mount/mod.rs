//! Host page mount points
//!
//! The page is an external collaborator reached only through
//! [`MountHost`]. Every write is a whole-value replacement of one
//! container's content, so a container never shows a half-built fragment.

pub mod controller;
pub mod page;

pub use controller::{MountController, MountReport, SectionOutcome};
pub use page::PageDocument;

use crate::render::{fragments, Node};

/// Content state of one mount point
#[derive(Debug, Clone, PartialEq)]
pub enum MountState {
    Loading { name: String },
    Content(Node),
    Empty { name: String },
    Error { name: String },
    /// Content lives in the container's bucket sub-containers
    Delegated,
}

/// [`MountState`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Loading,
    Content,
    Empty,
    Error,
    Delegated,
}

impl MountState {
    pub fn loading(name: &str) -> Self {
        MountState::Loading {
            name: name.to_string(),
        }
    }

    pub fn empty(name: &str) -> Self {
        MountState::Empty {
            name: name.to_string(),
        }
    }

    pub fn error(name: &str) -> Self {
        MountState::Error {
            name: name.to_string(),
        }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            MountState::Loading { .. } => StateKind::Loading,
            MountState::Content(_) => StateKind::Content,
            MountState::Empty { .. } => StateKind::Empty,
            MountState::Error { .. } => StateKind::Error,
            MountState::Delegated => StateKind::Delegated,
        }
    }

    /// Node shown inside the container; `None` when delegated
    pub fn fragment(&self) -> Option<Node> {
        match self {
            MountState::Loading { name } => Some(fragments::loading(name)),
            MountState::Content(node) => Some(node.clone()),
            MountState::Empty { name } => Some(fragments::empty(name)),
            MountState::Error { name } => Some(fragments::error(name)),
            MountState::Delegated => None,
        }
    }
}

/// A page that exposes attribute-addressed containers
pub trait MountHost {
    /// Every mount attribute present on the page, in document order
    fn mount_attributes(&self) -> Vec<String>;

    fn contains(&self, attribute: &str) -> bool;

    /// Replace the container's content
    fn set_state(&mut self, attribute: &str, state: MountState);

    /// Create a labelled bucket container nested under `parent`
    fn synthesize(&mut self, parent: &str, attribute: &str, label: &str);
}
