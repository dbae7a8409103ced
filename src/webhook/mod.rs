//! Carrier webhook transport — HTTP framing around the classify/record path.

pub mod routes;
pub mod twiml;

pub use routes::{AppState, webhook_routes};
