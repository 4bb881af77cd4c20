//! CLI subcommand implementations.

pub mod anchor;
pub mod chart;
pub mod timeline;
pub mod util;
