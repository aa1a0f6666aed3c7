//! Domain types and pure logic for turning generated flashcard candidates
//! into reviewed notes.
//!
//! Nothing in this crate performs I/O. Storage and generation are reached
//! through the collaborator traits in [`store`], implemented by
//! `cardsmith-db` and test doubles.

pub mod card;
pub mod error;
pub mod hashing;
pub mod import;
pub mod note;
pub mod session;
pub mod store;
pub mod types;
pub mod validate;
