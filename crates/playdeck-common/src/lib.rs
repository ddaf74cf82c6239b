//! Playdeck Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the Playdeck workspace members.
//!
//! # Overview
//!
//! - **Logging**: tracing subscriber setup driven by environment variables
//! - **Media**: base64 / data-URL payload detection and media-type helpers
//! - **Errors**: error types for the helpers above
//!
//! # Example
//!
//! ```no_run
//! use playdeck_common::media::{self, EncodedPayload};
//!
//! fn bytes_of(value: &str) -> playdeck_common::Result<Option<Vec<u8>>> {
//!     match EncodedPayload::sniff(value) {
//!         Some(payload) => Ok(Some(payload.decode()?)),
//!         None => Ok(None),
//!     }
//! }
//! # let _ = media::OCTET_STREAM;
//! ```

pub mod error;
pub mod logging;
pub mod media;

// Re-export commonly used types
pub use error::{CommonError, Result};
