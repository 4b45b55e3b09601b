//! depchange Git integration: commit counting and single-step diffs over
//! libgit2, exposed to the core through [`depchange_core::HistorySource`].

pub mod errors;
pub mod history;
pub mod repo;

pub use errors::{GitIntegrationError, Result};
pub use history::GitHistory;
pub use repo::GitRepository;
