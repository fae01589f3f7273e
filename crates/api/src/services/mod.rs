//! Supporting services.
//!
//! - `password` - Argon2id credential hashing

pub mod password;
