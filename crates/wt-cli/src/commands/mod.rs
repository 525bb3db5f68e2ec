//! CLI subcommand implementations.

pub mod backup;
pub mod entries;
pub mod start;
pub mod stats;
pub mod status;
pub mod stop;
pub mod util;
