//! Find multiline inline object-type annotations in TypeScript and hoist
//! them into named `type` aliases.

pub mod config;
pub mod diff;
pub mod editor;
pub mod error;
pub mod operations;
pub mod parser;
pub mod plugin;
pub mod rule;
pub mod state;
pub mod surgical;
pub mod syntax;
pub mod visitor;

#[cfg(test)]
mod tests;

pub use config::HoistConfig;
pub use diff::{generate_unified_diff, print_diff, print_summary_diff, DiffStats};
pub use editor::{FixOutcome, TypeScriptEditor};
pub use error::{HoistError, Result};
pub use operations::*;
