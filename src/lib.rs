//! Paged news feeds and optimistic comment threads for a news site's REST
//! API.
//!
//! The crate is organised bottom-up:
//!
//! - [`model`] - records exchanged with the API
//! - [`controller`] - retry, debounce, pagination and optimistic submission
//! - [`store`] - shared loading indicator and notice channel
//! - [`validation`] - comment length rules
//! - [`api`] - `reqwest` client and controller adapters
//! - [`config`] - TOML configuration
//! - [`util`] - URL validation and terminal text helpers

pub mod api;
pub mod config;
pub mod controller;
pub mod model;
pub mod store;
pub mod util;
pub mod validation;
