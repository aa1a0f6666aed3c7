pub mod bridge;
pub mod decks;
pub mod import;
pub mod session;
pub mod workflow;
