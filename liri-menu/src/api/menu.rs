//! Menu fragment endpoints
//!
//! Every request runs a fresh render cycle; cached payloads make repeat
//! requests cheap.

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /menu
///
/// HTML of every mount container on the page.
pub async fn get_menu(State(state): State<AppState>) -> Html<String> {
    let (page, report) = state.render(None).await;
    info!(failed = report.failed(), "Served full menu");
    Html(page.to_html())
}

/// GET /menu/:section
///
/// HTML of one section's container. `section` is the display name or the
/// mount suffix (`soft drinks` or `softdrinks`).
pub async fn get_section(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Html<String>> {
    let section = state
        .find_section(&name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("section '{}'", name)))?;

    let (page, _report) = state.render(Some(&section)).await;
    page.section_html(&section.mount)
        .map(Html)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "section '{}' has no mount point {} on the page",
                section.name,
                section.selector()
            ))
        })
}

/// Build menu routes
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(get_menu))
        .route("/menu/:section", get(get_section))
}
