//! # TaskDeck API Server Library
//!
//! Core functionality for the TaskDeck API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, and auth middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `images`: On-disk store for uploaded task images
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod images;
pub mod routes;
