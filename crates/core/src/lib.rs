//! Core library for wpexit
//!
//! This crate implements the **Functional Core** of the wpexit application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The wpexit project uses a two-crate architecture:
//!
//! - **`wpexit_core`** (this crate): Pure transformation functions with zero I/O
//! - **`wpexit`**: HTTP calls, console interaction and orchestration (the Imperative Shell)
//!
//! Everything in here can be exercised with fixture data. The shell owns the
//! network, the terminal and the process environment.
//!
//! # Module Organization
//!
//! - [`posts`]: Wire models for the WordPress.com posts endpoints
//! - [`pagination`]: Cursor-following state machine and failure policy
//! - [`migration`]: Computes the "this content has moved" rewrite of a post body
//! - [`oauth`]: Authorize URL, token request form and token response parsing
//! - [`report`]: Per-post outcomes and the end-of-run summary
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use wpexit_core::migration::{transform_post, MigrationSettings};
//! use wpexit_core::posts::Post;
//!
//! let post = Post {
//!     id: "42".to_string(),
//!     title: "Hello".to_string(),
//!     slug: "hello".to_string(),
//!     date: "2023-09-29T10:45:00".to_string(),
//!     content: "<p>Old</p>".to_string(),
//! };
//!
//! let result = transform_post(&post, &MigrationSettings::default(), false)?;
//! assert!(result.changed);
//! assert!(result.content.ends_with("<p>Old</p>"));
//! ```

pub mod migration;
pub mod oauth;
pub mod pagination;
pub mod posts;
pub mod report;
