//! # TaskDeck Shared Library
//!
//! This crate contains the data models, authentication primitives, and
//! database utilities used by the TaskDeck API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, tasks) and their CRUD operations
//! - `auth`: Password hashing and JWT token issuance/validation
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
