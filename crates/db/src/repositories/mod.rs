pub mod deck_repo;
pub mod note_repo;

pub use deck_repo::DeckRepo;
pub use note_repo::NoteRepo;
