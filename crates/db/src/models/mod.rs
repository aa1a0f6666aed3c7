pub mod deck;
pub mod note;
