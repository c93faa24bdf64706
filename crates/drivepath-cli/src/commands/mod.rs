//! CLI subcommands

pub mod archive;
pub mod completions;
pub mod config;
pub mod context;
pub mod ls;
pub mod mutate;
pub mod pull;
pub mod scp;
pub mod tree;
