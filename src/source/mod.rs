//! Remote page source
//!
//! - `page_source` - The `PageSource` trait and its error type
//! - `http_source` - reqwest implementation against the ledger HTTP API

pub mod http_source;
pub mod page_source;

pub use http_source::HttpPageSource;
pub use page_source::{FetchError, PageSource};
