//! The single GET a worker issues, behind the [`Fetch`] seam.
mod client;
mod fetch;


pub use client::{HttpFetcher, parse_target_url};
pub use fetch::{Fetch, FetchOutcome};
