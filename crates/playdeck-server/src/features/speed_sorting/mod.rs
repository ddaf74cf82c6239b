//! Speed-sorting game feature
//!
//! Players drop text or image items into categories against a timer.
//!
//! ## Commands
//!
//! - `create` - Validate a multipart submission, upload media, insert the game
//! - `update` - Partially update a game (owner or super admin only)
//!
//! ## Queries
//!
//! - `play` - Serve a published game with validated runtime settings
//!
//! ## Components
//!
//! - [`classifier`] - Decide whether an item value is text or an inline file
//! - [`assembler`] - Turn raw categories and items into a stored dataset
//! - [`authorization`] - Creator or super admin check for mutations
//! - [`play_config`] - Validate and default play settings

pub mod assembler;
pub mod authorization;
pub mod classifier;
pub mod commands;
pub mod form;
pub mod play_config;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::speed_sorting_routes;
