pub mod app;
pub mod openapi;
pub mod routes;

pub use app::{build_app, cors_layer};
pub use openapi::ApiDoc;
