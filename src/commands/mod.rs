//! Command implementations for the hoops-sync CLI

pub mod aliases;
pub mod common;
pub mod season;
pub mod status;

pub use common::{CommandContext, ConfigOverrides};

#[cfg(test)]
mod tests;
