//! Utility functions for common operations.
//!
//! - **URL validation**: the API base URL must be HTTPS (plain HTTP only on
//!   localhost)
//! - **Text processing**: one-line sanitising and width-aware truncation for
//!   terminal output
//!
//! # Examples
//!
//! ```
//! use manset::util::{fit_width, one_line, validate_base_url};
//!
//! let base = validate_base_url("https://haber.example.com/api").unwrap();
//! assert_eq!(base.host_str(), Some("haber.example.com"));
//!
//! let title = one_line("Son dakika:\nseçim sonuçları");
//! assert_eq!(fit_width(&title, 14), "Son dakika: s…");
//! ```

mod text;
mod url_validator;

pub use text::{display_width, fit_width, one_line};
pub use url_validator::{validate_base_url, UrlValidationError};
