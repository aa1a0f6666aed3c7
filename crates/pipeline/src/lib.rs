//! The generate → review → import workflow.
//!
//! - [`WorkflowController`] owns the live session and enforces the state
//!   machine.
//! - [`ImportCoordinator`] commits approved cards into the collection.
//! - [`AutoSaver`] writes session snapshots in order on a background task.

pub mod autosave;
pub mod import;
pub mod workflow;

pub use autosave::AutoSaver;
pub use import::{ImportCoordinator, ImportError};
pub use workflow::{WorkflowController, WorkflowError, WorkflowSnapshot, WorkflowState};
