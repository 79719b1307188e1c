//! CLI command implementations.

pub mod facets;
pub mod init;
pub mod query;
pub mod sections;
