//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod run;
pub mod translate;
pub mod version;
