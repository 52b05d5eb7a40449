//! Data models for symlens
//!
//! Plain types shared by the façade, the provider seam and the table codec.

pub mod config;
pub mod hierarchy;
pub mod lsp;
pub mod request;
pub mod symbol;

pub use config::SymlensConfig;
pub use hierarchy::{
    ChildDepth, Edge, HierarchyItem, HierarchyKind, HierarchyNode, HierarchyResult, NestedSymbol,
};
pub use lsp::{HoverInfo, Location, Position, Range};
pub use request::{LocatorResult, LookupRequest, LookupTarget, WireLookupRequest};
pub use symbol::{Language, Symbol, SymbolKind};
