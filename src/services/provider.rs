//! Code intelligence provider seam
//!
//! Everything the façade knows about a codebase comes through
//! [`CodeProvider`]. The production implementation talks to language
//! servers; tests use [`testing::StaticProvider`].

use std::fmt;

use async_trait::async_trait;

use crate::error::LspError;
use crate::models::{Edge, HierarchyItem, HoverInfo, Location, Position, Symbol};

/// Position-based location queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationQuery {
    References,
    Definition,
    Declaration,
    TypeDefinition,
    Implementation,
}

impl LocationQuery {
    /// LSP request method
    pub fn method(self) -> &'static str {
        match self {
            Self::References => "textDocument/references",
            Self::Definition => "textDocument/definition",
            Self::Declaration => "textDocument/declaration",
            Self::TypeDefinition => "textDocument/typeDefinition",
            Self::Implementation => "textDocument/implementation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::References => "references",
            Self::Definition => "definition",
            Self::Declaration => "declaration",
            Self::TypeDefinition => "type definition",
            Self::Implementation => "implementation",
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[async_trait]
pub trait CodeProvider: Send + Sync {
    /// Hierarchical symbol tree of one document
    async fn document_symbols(&self, uri: &str) -> Result<Vec<Symbol>, LspError>;

    /// Full text of one document
    async fn read_document(&self, uri: &str) -> Result<String, LspError>;

    async fn locations(
        &self,
        query: LocationQuery,
        uri: &str,
        position: Position,
    ) -> Result<Vec<Location>, LspError>;

    async fn hover(&self, uri: &str, position: Position) -> Result<Option<HoverInfo>, LspError>;

    async fn prepare_call_hierarchy(
        &self,
        uri: &str,
        position: Position,
    ) -> Result<Vec<HierarchyItem>, LspError>;

    /// Callers of `item`, each with the ranges of its call sites
    async fn incoming_calls(&self, item: &HierarchyItem) -> Result<Vec<Edge>, LspError>;

    /// Callees of `item`, each with the ranges of its call sites
    async fn outgoing_calls(&self, item: &HierarchyItem) -> Result<Vec<Edge>, LspError>;

    async fn prepare_type_hierarchy(
        &self,
        uri: &str,
        position: Position,
    ) -> Result<Vec<HierarchyItem>, LspError>;

    async fn supertypes(&self, item: &HierarchyItem) -> Result<Vec<HierarchyItem>, LspError>;

    async fn subtypes(&self, item: &HierarchyItem) -> Result<Vec<HierarchyItem>, LspError>;

    async fn references(&self, uri: &str, position: Position) -> Result<Vec<Location>, LspError> {
        self.locations(LocationQuery::References, uri, position).await
    }

    async fn definition(&self, uri: &str, position: Position) -> Result<Vec<Location>, LspError> {
        self.locations(LocationQuery::Definition, uri, position).await
    }

    async fn declaration(&self, uri: &str, position: Position) -> Result<Vec<Location>, LspError> {
        self.locations(LocationQuery::Declaration, uri, position).await
    }

    async fn type_definition(
        &self,
        uri: &str,
        position: Position,
    ) -> Result<Vec<Location>, LspError> {
        self.locations(LocationQuery::TypeDefinition, uri, position).await
    }

    async fn implementation(
        &self,
        uri: &str,
        position: Position,
    ) -> Result<Vec<Location>, LspError> {
        self.locations(LocationQuery::Implementation, uri, position).await
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory provider with per-operation delays and failures

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Operation names accepted by [`StaticProvider::delay`] and [`StaticProvider::fail`]
    pub mod op {
        pub const DOCUMENT_SYMBOLS: &str = "document_symbols";
        pub const READ_DOCUMENT: &str = "read_document";
        pub const HOVER: &str = "hover";
        pub const PREPARE_CALL: &str = "prepare_call_hierarchy";
        pub const INCOMING: &str = "incoming_calls";
        pub const OUTGOING: &str = "outgoing_calls";
        pub const PREPARE_TYPE: &str = "prepare_type_hierarchy";
        pub const SUPERTYPES: &str = "supertypes";
        pub const SUBTYPES: &str = "subtypes";
    }

    #[derive(Default)]
    pub struct StaticProvider {
        documents: HashMap<String, String>,
        symbols: HashMap<String, Vec<Symbol>>,
        locations: HashMap<LocationQuery, Vec<Location>>,
        hovers: HashMap<Position, HoverInfo>,
        call_roots: Vec<HierarchyItem>,
        incoming: Vec<Edge>,
        outgoing: Vec<Edge>,
        type_roots: Vec<HierarchyItem>,
        supertypes: Vec<HierarchyItem>,
        subtypes: Vec<HierarchyItem>,
        delays: HashMap<String, Duration>,
        failures: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_document(mut self, uri: &str, text: &str) -> Self {
            self.documents.insert(uri.to_string(), text.to_string());
            self
        }

        pub fn with_symbols(mut self, uri: &str, symbols: Vec<Symbol>) -> Self {
            self.symbols.insert(uri.to_string(), symbols);
            self
        }

        pub fn with_locations(mut self, query: LocationQuery, locations: Vec<Location>) -> Self {
            self.locations.insert(query, locations);
            self
        }

        pub fn with_hover(mut self, position: Position, hover: HoverInfo) -> Self {
            self.hovers.insert(position, hover);
            self
        }

        pub fn with_call_hierarchy(
            mut self,
            roots: Vec<HierarchyItem>,
            incoming: Vec<Edge>,
            outgoing: Vec<Edge>,
        ) -> Self {
            self.call_roots = roots;
            self.incoming = incoming;
            self.outgoing = outgoing;
            self
        }

        pub fn with_type_hierarchy(
            mut self,
            roots: Vec<HierarchyItem>,
            supertypes: Vec<HierarchyItem>,
            subtypes: Vec<HierarchyItem>,
        ) -> Self {
            self.type_roots = roots;
            self.supertypes = supertypes;
            self.subtypes = subtypes;
            self
        }

        /// Make `op` (an [`op`] name or a [`LocationQuery`] label) wait first
        pub fn delay(mut self, op: &str, by: Duration) -> Self {
            self.delays.insert(op.to_string(), by);
            self
        }

        /// Make `op` answer with a server error
        pub fn fail(mut self, op: &str) -> Self {
            self.failures.insert(op.to_string());
            self
        }

        /// Every call made so far, as `op` or `op@line:character`
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, op: &str) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.split('@').next() == Some(op))
                .count()
        }

        async fn gate(&self, op: &str, position: Option<Position>) -> Result<(), LspError> {
            let entry = match position {
                Some(pos) => format!("{}@{}", op, pos),
                None => op.to_string(),
            };
            self.calls.lock().unwrap().push(entry);

            if let Some(delay) = self.delays.get(op) {
                tokio::time::sleep(*delay).await;
            }
            if self.failures.contains(op) {
                return Err(LspError::ServerError {
                    code: -32603,
                    message: format!("{} failed", op),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CodeProvider for StaticProvider {
        async fn document_symbols(&self, uri: &str) -> Result<Vec<Symbol>, LspError> {
            self.gate(op::DOCUMENT_SYMBOLS, None).await?;
            Ok(self.symbols.get(uri).cloned().unwrap_or_default())
        }

        async fn read_document(&self, uri: &str) -> Result<String, LspError> {
            self.gate(op::READ_DOCUMENT, None).await?;
            self.documents.get(uri).cloned().ok_or_else(|| {
                LspError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    uri.to_string(),
                ))
            })
        }

        async fn locations(
            &self,
            query: LocationQuery,
            _uri: &str,
            position: Position,
        ) -> Result<Vec<Location>, LspError> {
            self.gate(query.label(), Some(position)).await?;
            Ok(self.locations.get(&query).cloned().unwrap_or_default())
        }

        async fn hover(
            &self,
            _uri: &str,
            position: Position,
        ) -> Result<Option<HoverInfo>, LspError> {
            self.gate(op::HOVER, Some(position)).await?;
            Ok(self.hovers.get(&position).cloned())
        }

        async fn prepare_call_hierarchy(
            &self,
            _uri: &str,
            position: Position,
        ) -> Result<Vec<HierarchyItem>, LspError> {
            self.gate(op::PREPARE_CALL, Some(position)).await?;
            Ok(self.call_roots.clone())
        }

        async fn incoming_calls(&self, _item: &HierarchyItem) -> Result<Vec<Edge>, LspError> {
            self.gate(op::INCOMING, None).await?;
            Ok(self.incoming.clone())
        }

        async fn outgoing_calls(&self, _item: &HierarchyItem) -> Result<Vec<Edge>, LspError> {
            self.gate(op::OUTGOING, None).await?;
            Ok(self.outgoing.clone())
        }

        async fn prepare_type_hierarchy(
            &self,
            _uri: &str,
            position: Position,
        ) -> Result<Vec<HierarchyItem>, LspError> {
            self.gate(op::PREPARE_TYPE, Some(position)).await?;
            Ok(self.type_roots.clone())
        }

        async fn supertypes(&self, _item: &HierarchyItem) -> Result<Vec<HierarchyItem>, LspError> {
            self.gate(op::SUPERTYPES, None).await?;
            Ok(self.supertypes.clone())
        }

        async fn subtypes(&self, _item: &HierarchyItem) -> Result<Vec<HierarchyItem>, LspError> {
            self.gate(op::SUBTYPES, None).await?;
            Ok(self.subtypes.clone())
        }
    }

    /// Fixtures shared by the service tests
    pub mod fixtures {
        use crate::models::{HierarchyItem, Range, Symbol, SymbolKind};

        pub fn symbol(name: &str, kind: SymbolKind, start: u32, end: u32) -> Symbol {
            Symbol::new(
                name,
                kind,
                Range::from_coords(start, 0, end, 1),
                Range::from_coords(start, 4, start, 4 + name.chars().count() as u32),
            )
        }

        pub fn function(name: &str, start: u32, end: u32) -> Symbol {
            symbol(name, SymbolKind::Function, start, end)
        }

        pub fn item(name: &str, uri: &str, line: u32) -> HierarchyItem {
            HierarchyItem {
                name: name.to_string(),
                kind: SymbolKind::Function,
                uri: uri.to_string(),
                range: Range::from_coords(line, 0, line + 3, 1),
                selection_range: Range::from_coords(line, 3, line, 3 + name.len() as u32),
                detail: None,
                data: None,
            }
        }
    }

    #[tokio::test]
    async fn test_static_provider_records_calls_and_fails_on_demand() {
        let provider = StaticProvider::new()
            .with_document("file:///a.rs", "fn a() {}")
            .fail(op::HOVER);

        let text = provider.read_document("file:///a.rs").await.unwrap();
        assert_eq!(text, "fn a() {}");

        let hover = provider.hover("file:///a.rs", Position::new(0, 3)).await;
        assert!(hover.is_err());

        let refs = provider.references("file:///a.rs", Position::new(1, 2)).await;
        assert!(refs.unwrap().is_empty());

        assert_eq!(
            provider.calls(),
            vec!["read_document", "hover@0:3", "references@1:2"]
        );
    }
}
