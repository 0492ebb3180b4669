/// Database models for TaskDeck
///
/// - `user`: user accounts (credential store)
/// - `task`: task records, always scoped to an owning user

pub mod task;
pub mod user;
