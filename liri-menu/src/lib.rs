//! liri-menu library - restaurant menu renderer
//!
//! Fetches menu records from the hosted content API, classifies them into
//! their sections' category buckets, formats prices and renders HTML
//! fragments into the mount points of a host page. The `liri-menu` binary
//! exposes the pipeline as a CLI and as a fragment server.

use axum::Router;
use liri_common::config::TomlConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod error;
pub mod model;
pub mod mount;
pub mod price;
pub mod render;
pub mod section;

use mount::{MountController, MountReport, PageDocument};
use section::SectionConfig;

/// Application state shared across HTTP handlers and CLI commands
#[derive(Clone)]
pub struct AppState {
    pub controller: MountController,
    pub sections: Arc<Vec<SectionConfig>>,
    /// Mount attributes present on the host page; `None` means every section root
    pub mounts: Option<Arc<Vec<String>>>,
}

impl AppState {
    pub fn new(
        controller: MountController,
        sections: Vec<SectionConfig>,
        mounts: Option<Vec<String>>,
    ) -> Self {
        Self {
            controller,
            sections: Arc::new(sections),
            mounts: mounts.map(Arc::new),
        }
    }

    /// Build the pipeline described by a loaded config
    pub fn from_config(config: &TomlConfig) -> anyhow::Result<Self> {
        let sections = section::sections_from_config(config)?;
        let controller = MountController::from_config(config)?;
        Ok(Self::new(controller, sections, config.page.mounts.clone()))
    }

    /// Fresh host page with the configured mount containers
    pub fn page(&self) -> PageDocument {
        match &self.mounts {
            Some(mounts) => PageDocument::from_mounts(mounts, &self.sections),
            None => PageDocument::from_sections(&self.sections),
        }
    }

    /// Section by display name or mount suffix
    pub fn find_section(&self, name: &str) -> Option<&SectionConfig> {
        self.sections.iter().find(|s| s.matches_name(name))
    }

    /// Run one render cycle over every section, or only `section`
    pub async fn render(&self, section: Option<&SectionConfig>) -> (PageDocument, MountReport) {
        let mut page = self.page();
        let report = match section {
            Some(section) => {
                self.controller
                    .initialize(&mut page, std::slice::from_ref(section))
                    .await
            }
            None => self.controller.initialize(&mut page, &self.sections).await,
        };
        (page, report)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::menu_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
