//! REST API access for the news site.
//!
//! - [`client`] - `reqwest` client with timeouts, bearer auth and size limits
//! - [`sources`] - [`PageSource`](crate::controller::PageSource) and
//!   [`CreateSink`](crate::controller::CreateSink) adapters over the client

mod client;
mod sources;

pub use client::{ApiClient, ApiError, NewsQuery};
pub use sources::{CommentSource, NewsSource};
