//! Shared test utilities for the layered configuration workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`tree`]: [`TestTree`](tree::TestTree), a temporary directory of configuration resources
//! - [`fixtures`]: sample resources in every supported format

pub mod fixtures;
pub mod tree;

pub use tree::TestTree;
