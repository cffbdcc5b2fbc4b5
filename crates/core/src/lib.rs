//! Roster Core - Shared types library.
//!
//! This crate provides common types used across all Roster components:
//! - `admin` - Web admin panel and the controllers behind it
//! - `cli` - Command-line front end over the same controllers
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Customer records, user accounts, roles, IDs and backend
//!   error payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
