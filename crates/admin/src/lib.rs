//! Roster Admin library.
//!
//! Server-rendered admin panel over a customer records backend: login,
//! the customer table (add, edit, delete, search), spreadsheet import and,
//! for admins, user account management.
//!
//! # Layers
//!
//! - [`backend`] - HTTP client for the records/users API
//! - [`controllers`] - Panel operations over a [`backend::Backend`], the
//!   same ones the CLI drives
//! - [`routes`] and [`views`] - Axum handlers and Askama templates
//! - [`middleware`] - Session layer and auth extractors
//!
//! All per-browser state is a [`models::PanelState`] kept in the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod controllers;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod spreadsheet;
pub mod state;
pub mod ui;
pub mod views;
