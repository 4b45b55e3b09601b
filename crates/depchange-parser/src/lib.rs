//! Static dependency analysis for TypeScript and JavaScript sources.
//!
//! Imports are read from tree-sitter syntax trees, resolved against the
//! filesystem using `tsconfig.json` options, and walked into a closure by
//! [`DependencyTree`], which backs [`depchange_core::DependencyResolver`].

pub mod errors;
pub mod imports;
pub mod language;
pub mod resolve;
pub mod tree;
pub mod tsconfig;

pub use errors::{ParserError, Result};
pub use imports::*;
pub use language::*;
pub use resolve::*;
pub use tree::*;
pub use tsconfig::*;
