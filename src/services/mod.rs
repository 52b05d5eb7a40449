//! Service layer for symlens

pub mod config;
pub mod facade;
pub mod hierarchy;
pub mod locator;
pub mod lsp;
pub mod preview;
pub mod provider;

pub use config::{ConfigService, DefaultConfigService};
pub use facade::{HierarchyTables, SymbolFacade};
pub use hierarchy::HierarchyTraversalEngine;
pub use locator::SymbolLocator;
pub use lsp::LspProvider;
pub use preview::PreviewExtractor;
pub use provider::{CodeProvider, LocationQuery};
