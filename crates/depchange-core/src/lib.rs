//! depchange core: decides whether a target file or anything it imports
//! changed in the most recent commit.
//!
//! The crate owns the procedure and its data model. Version control and
//! dependency resolution are reached through the [`HistorySource`] and
//! [`DependencyResolver`] traits so backends can be swapped for fixtures.

pub mod config;
pub mod detector;
pub mod error;
pub mod paths;
pub mod traits;
pub mod types;

pub use config::*;
pub use detector::*;
pub use error::*;
pub use traits::*;
pub use types::*;
