/// Authentication primitives
///
/// This module provides the two building blocks of the TaskDeck auth flow:
///
/// - `password`: Argon2id hashing and verification of user passwords
/// - `jwt`: Issuance and validation of signed bearer tokens
///
/// Identity resolution (token -> user record) lives in the API crate, since
/// it needs the request pipeline and the database pool.

pub mod jwt;
pub mod password;
