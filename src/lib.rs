//! symlens - symbol lookup and hierarchy traversal library
//!
//! Wraps language servers behind a small façade that resolves symbols by
//! position or name, walks call and type hierarchies one level deep, and
//! renders every answer as a compact ` | `-delimited table.

pub mod app;
pub mod cli;
pub mod error;
pub mod infra;
pub mod models;
pub mod services;

pub use error::{SymlensError, SymlensResult};
