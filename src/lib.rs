//! # autocvlac
//!
//! Impactu research products → CvLAC scientific article form payloads.
//!
//! ## Modules
//!
//! - [`impactu`] - Impactu API client (one GET per researcher)
//! - [`product`] - Typed research product records
//! - [`flatten`] - One-level flattening helper
//! - [`filters`] - Year, source and missing-in-CvLAC filters
//! - [`extract`] - Form payload extraction and portal vocabularies
//! - [`tabulate`] - Product table with CSV export
//! - [`cvlac`] - Form-filling collaborator interface
//! - [`pipeline`] - Fetch, filter, extract and submit in one pass
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use autocvlac::filters::filter_missing_journal_articles;
//! use autocvlac::impactu::{ClientConfig, ImpactuClient, ProductSource};
//! use autocvlac::extract::extract_scientific_article_data;
//! use std::collections::HashSet;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ImpactuClient::new(ClientConfig::default())?;
//!     let products = client.research_products("0000123456").await?;
//!     let today = chrono::Local::now().date_naive();
//!     for product in filter_missing_journal_articles(&products, &HashSet::new(), today) {
//!         if let Some(payload) = extract_scientific_article_data(product) {
//!             println!("{}", serde_json::to_string_pretty(&payload)?);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cvlac;
pub mod error;
pub mod extract;
pub mod filters;
pub mod flatten;
pub mod impactu;
pub mod pipeline;
pub mod product;
pub mod tabulate;

pub use error::{CvlacError, Result};
pub use flatten::flatten;
