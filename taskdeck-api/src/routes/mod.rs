/// API route handlers
///
/// Organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: login / token issuance
/// - `users`: registration
/// - `tasks`: owner-scoped task CRUD
/// - `images`: image upload and download

pub mod auth;
pub mod health;
pub mod images;
pub mod tasks;
pub mod users;
