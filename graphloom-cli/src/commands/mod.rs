//! Subcommand implementations.

pub mod inspect;
pub mod map;
