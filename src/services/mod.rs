//! Service layer for the job scraper.
//!
//! - Site extraction (`SiteExtractor`)
//! - Category and location normalization
//! - Request pacing and identity rotation (`RatePolicy`)

mod extractor;
pub mod normalize;
pub mod rate_limit;

pub use extractor::{ExtractOptions, ExtractOutcome, SiteExtractor};
pub use normalize::{Category, normalize_category, normalize_location};
pub use rate_limit::{NoPacer, Pacer, RandomPacer, RatePolicy};
