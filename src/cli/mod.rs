//! CLI module for symlens
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod location;
pub mod output;

pub use location::{ParsedReference, parse_document, parse_request};
pub use output::{OutputContext, OutputFormat};

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    children::ChildrenArgs, config::ConfigArgs, hierarchy::HierarchyArgs, lookup::LookupArgs,
    symbols::SymbolsArgs,
};

const LONG_ABOUT: &str = r#"
symlens - symbol lookup and hierarchy traversal for AI coding agents

Answers come back as compact tables: every line is a ` | `-separated row
ending in `EOL`, and long answers are truncated with a summary row.

REFERENCES (zero-based, like LSP):
  src/server.rs:41:7            a position
  src/server.rs#handle          a symbol by name
  src/server.rs:41:7#handle     a name, with the position as a hint
  '{"uri":"file:///...","symbolName":"handle"}'   a JSON request

EXAMPLES:
  symlens symbols src/server.rs
  symlens refs src/server.rs#handle
  symlens calls src/server.rs#handle
  symlens children src/server.rs#Server --depth all
"#;

/// symlens - symbol lookup and hierarchy traversal for AI coding agents
#[derive(Parser, Debug)]
#[command(name = "symlens")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'symlens <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root the language servers are started in
    #[arg(long, global = true, env = "SYMLENS_ROOT")]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a reference to a symbol (JSON)
    Resolve(LookupArgs),

    /// List every symbol in a file
    Symbols(SymbolsArgs),

    /// Find references
    Refs(LookupArgs),

    /// Go to definition
    Def(LookupArgs),

    /// Go to declaration
    Decl(LookupArgs),

    /// Go to type definition
    Typedef(LookupArgs),

    /// Find implementations
    Impl(LookupArgs),

    /// Hover information
    Hover(LookupArgs),

    /// Callers and callees, one level deep
    Calls(HierarchyArgs),

    /// Supertypes and subtypes, one level deep
    Types(HierarchyArgs),

    /// Symbols nested inside a symbol
    Children(ChildrenArgs),

    /// Configuration management
    Config(ConfigArgs),
}
