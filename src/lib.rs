pub mod auth;
pub mod category_request;
pub mod config;
pub mod errors;
pub mod language;
pub mod logging;
pub mod manage_categories;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod templates;
pub mod view_state;
