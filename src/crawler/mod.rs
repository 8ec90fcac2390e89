//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The persistent, politeness-aware frontier
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML parsing and link extraction
//! - The worker loop and the thread pool that runs it

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod parser;
mod worker;

pub use coordinator::Crawler;
pub use extractor::extract;
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher, Response};
pub use frontier::{Frontier, FrontierError};
pub use parser::Document;
pub use worker::{Worker, COOLDOWN_RETRY};
