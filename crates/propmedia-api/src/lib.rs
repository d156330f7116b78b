//! HTTP surface for the propmedia service.
//!
//! Thin axum handlers over `MediaStore`: validation and thumbnail derivation
//! happen here (before any owner lock is taken), persistence and invariants
//! live in `propmedia-db`.

pub mod agent;
pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
