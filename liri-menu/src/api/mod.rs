//! HTTP API handlers for the fragment server

pub mod health;
pub mod menu;

pub use health::health_routes;
pub use menu::menu_routes;
