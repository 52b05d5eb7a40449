//! Command implementations for symlens
//!
//! Each command is implemented in its own module.

pub mod children;
pub mod config;
pub mod hierarchy;
pub mod lookup;
pub mod symbols;
