//! Pipeline entry points.
//!
//! - `Pipeline::run_all` / `run_selected`: scrape, dedup and persist
//! - `transform`: first-sighting store record for a listing

pub mod orchestrator;
pub mod transform;

pub use orchestrator::{Pipeline, SourceSelector};
pub use transform::transform;
