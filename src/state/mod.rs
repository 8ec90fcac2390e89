//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlRecord`: The persisted state of a single discovered URL
//! - `DomainState`: Per-authority queue and politeness clock

mod domain_state;
mod url_record;

// Re-export main types
pub use domain_state::DomainState;
pub use url_record::UrlRecord;
