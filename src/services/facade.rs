//! Symbol façade
//!
//! Single entry point for agents: validates the loose request, resolves it
//! to a query position, calls the provider under a deadline, and renders
//! the answer as a bounded table. Provider trouble never escapes as an
//! error; it shows up as an empty table and a `warn!` line.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use super::hierarchy::{self, HierarchyTraversalEngine};
use super::locator::SymbolLocator;
use super::preview::PreviewExtractor;
use super::provider::{CodeProvider, LocationQuery};
use crate::error::{Degraded, FacadeError, LspError};
use crate::infra::table::{Row, TableCodec, TableKind, TableResult};
use crate::infra::timeout::{GuardError, TimeoutGuard};
use crate::models::config::{SymlensConfig, TimeoutConfig};
use crate::models::{
    ChildDepth, Edge, HierarchyKind, HierarchyResult, HoverInfo, LocatorResult, LookupRequest,
    LookupTarget, Position, Range, Symbol,
};

/// Concurrent hover requests while decorating a symbol table
const HOVER_CONCURRENCY: usize = 8;

/// Both directions of a hierarchy query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyTables {
    pub incoming: TableResult,
    pub outgoing: TableResult,
}

impl HierarchyTables {
    fn empty(kind: HierarchyKind) -> Self {
        let (incoming, outgoing) = table_kinds(kind);
        Self {
            incoming: TableResult::empty(incoming),
            outgoing: TableResult::empty(outgoing),
        }
    }

    /// Incoming table, a blank line, then the outgoing table
    pub fn render(&self) -> String {
        format!("{}\n{}", self.incoming.render(), self.outgoing.render())
    }
}

/// Where a request points once names are resolved
#[derive(Debug, Clone)]
struct QueryPoint {
    position: Position,
    symbol: Option<Symbol>,
}

pub struct SymbolFacade {
    provider: Arc<dyn CodeProvider>,
    timeouts: TimeoutConfig,
    default_depth: ChildDepth,
    cancel: Option<CancellationToken>,
    locator: SymbolLocator,
    engine: HierarchyTraversalEngine,
    preview: PreviewExtractor,
    codec: TableCodec,
}

impl SymbolFacade {
    pub fn new(provider: Arc<dyn CodeProvider>, config: &SymlensConfig) -> Self {
        let timeouts = config.timeouts.clone();
        Self {
            locator: SymbolLocator::new(provider.clone(), timeouts.symbols()),
            engine: HierarchyTraversalEngine::new(provider.clone(), timeouts.clone()),
            preview: PreviewExtractor::new(provider.clone(), timeouts.preview()),
            codec: TableCodec::new(&config.output),
            default_depth: config.children.default_depth,
            cancel: None,
            timeouts,
            provider,
        }
    }

    /// Abort in-flight provider calls when `token` fires
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.locator = self.locator.with_cancel(token.clone());
        self.engine = self.engine.with_cancel(token.clone());
        self.preview = self.preview.with_cancel(token.clone());
        self.cancel = Some(token);
        self
    }

    pub async fn resolve(&self, request: &LookupRequest) -> Result<LocatorResult, FacadeError> {
        self.locator.resolve(request).await
    }

    /// Every symbol in the document with its hover text
    #[instrument(skip(self))]
    pub async fn document_symbols(&self, uri: &str) -> Result<TableResult, FacadeError> {
        let kind = TableKind::DocumentSymbols;
        if uri.trim().is_empty() {
            return Err(FacadeError::MalformedInput(
                "Request is missing a document uri".to_string(),
            ));
        }

        let symbols = match self.locator.fetch_symbols(uri).await {
            Ok(symbols) => symbols,
            Err(e) => return Ok(degrade(kind, e)),
        };

        let walked = Symbol::walk(&symbols);
        // Rows past the cap are counted but never shown, so skip their hovers
        let hovered = walked.len().min(self.codec.max_rows());

        let hovers: Vec<String> = stream::iter(walked.iter().take(hovered))
            .map(|(symbol, _)| self.hover_text(uri, symbol.anchor()))
            .buffered(HOVER_CONCURRENCY)
            .collect()
            .await;

        let rows = walked.iter().enumerate().map(|(i, (symbol, parent))| {
            vec![
                symbol.name.clone(),
                symbol.kind.to_string(),
                symbol.range.to_string(),
                symbol.selection_range.to_string(),
                parent.map(|p| p.name.clone()).unwrap_or_default(),
                hovers.get(i).cloned().unwrap_or_default(),
            ]
        });

        Ok(self.codec.encode_bounded(kind, rows))
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn references(&self, request: &LookupRequest) -> Result<TableResult, FacadeError> {
        self.locations(LocationQuery::References, request).await
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn definition(&self, request: &LookupRequest) -> Result<TableResult, FacadeError> {
        self.locations(LocationQuery::Definition, request).await
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn declaration(&self, request: &LookupRequest) -> Result<TableResult, FacadeError> {
        self.locations(LocationQuery::Declaration, request).await
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn type_definition(
        &self,
        request: &LookupRequest,
    ) -> Result<TableResult, FacadeError> {
        self.locations(LocationQuery::TypeDefinition, request).await
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn implementation(
        &self,
        request: &LookupRequest,
    ) -> Result<TableResult, FacadeError> {
        self.locations(LocationQuery::Implementation, request).await
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn hover(&self, request: &LookupRequest) -> Result<TableResult, FacadeError> {
        let kind = TableKind::Hover;
        let Some(point) = self.query_point(request).await? else {
            return Ok(TableResult::empty(kind));
        };

        let guard = TimeoutGuard::new(self.timeouts.hover());
        let hover = match self
            .guarded(&guard, "hover", self.provider.hover(&request.uri, point.position))
            .await
        {
            Ok(Some(hover)) => hover,
            Ok(None) => return Ok(TableResult::empty(kind)),
            Err(e) => return Ok(degrade(kind, e)),
        };

        let name = match &point.symbol {
            Some(symbol) => symbol.name.clone(),
            None => self
                .preview
                .word_at(&request.uri, point.position.line, point.position.character)
                .await
                .unwrap_or_default(),
        };
        let range = hover
            .range
            .or(point.symbol.as_ref().map(|s| s.selection_range))
            .unwrap_or_else(|| Range::point(point.position));

        Ok(self
            .codec
            .encode(kind, [vec![name, range.to_string(), hover.contents]]))
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn call_hierarchy(
        &self,
        request: &LookupRequest,
    ) -> Result<HierarchyTables, FacadeError> {
        self.hierarchy(request, HierarchyKind::Call).await
    }

    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn type_hierarchy(
        &self,
        request: &LookupRequest,
    ) -> Result<HierarchyTables, FacadeError> {
        self.hierarchy(request, HierarchyKind::Type).await
    }

    /// Nested symbols below the resolved symbol; `depth` defaults to the
    /// configured children depth
    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn children(
        &self,
        request: &LookupRequest,
        depth: Option<ChildDepth>,
    ) -> Result<TableResult, FacadeError> {
        let kind = TableKind::Children;
        let target = request.target()?;
        let resolved = self.locator.resolve_target(&request.uri, &target).await;
        let Some(symbol) = accept(&target, resolved) else {
            return Ok(TableResult::empty(kind));
        };

        let depth = depth.unwrap_or(self.default_depth);
        let rows = hierarchy::children(&symbol, depth).into_iter().map(|nested| {
            vec![
                nested.symbol.name.clone(),
                nested.symbol.kind.to_string(),
                nested.depth.to_string(),
                nested.symbol.range.to_string(),
                nested.symbol.selection_range.to_string(),
                nested.parent.to_string(),
            ]
        });

        Ok(self.codec.encode_bounded(kind, rows))
    }

    async fn locations(
        &self,
        query: LocationQuery,
        request: &LookupRequest,
    ) -> Result<TableResult, FacadeError> {
        let kind = TableKind::Locations;
        let Some(point) = self.query_point(request).await? else {
            return Ok(TableResult::empty(kind));
        };

        let deadline = match query {
            LocationQuery::References => self.timeouts.references(),
            _ => self.timeouts.definition(),
        };
        let guard = TimeoutGuard::new(deadline);
        let work = self.provider.locations(query, &request.uri, point.position);
        let locations = match self.guarded(&guard, query.label(), work).await {
            Ok(locations) => locations,
            Err(e) => return Ok(degrade(kind, e)),
        };

        let sampled = query == LocationQuery::References;
        let visible = self.codec.visible_rows(locations.len(), sampled);
        let previews = self.preview.previews(&locations, visible).await;

        let rows: Vec<Row> = locations
            .iter()
            .zip(previews)
            .map(|(loc, preview)| vec![loc.uri.clone(), loc.range.to_string(), preview])
            .collect();

        Ok(if sampled {
            self.codec.encode_sampled(kind, rows)
        } else {
            self.codec.encode_bounded(kind, rows)
        })
    }

    async fn hierarchy(
        &self,
        request: &LookupRequest,
        kind: HierarchyKind,
    ) -> Result<HierarchyTables, FacadeError> {
        let Some(point) = self.query_point(request).await? else {
            return Ok(HierarchyTables::empty(kind));
        };

        match self.engine.traverse(&request.uri, point.position, kind).await {
            Some(result) => Ok(self.hierarchy_tables(result)),
            None => Ok(HierarchyTables::empty(kind)),
        }
    }

    fn hierarchy_tables(&self, result: HierarchyResult) -> HierarchyTables {
        let (incoming_kind, outgoing_kind) = table_kinds(result.kind);
        let detail_column = result.kind == HierarchyKind::Type;

        let to_rows = |edges: Vec<Edge>| {
            edges.into_iter().map(move |edge| {
                let last = if detail_column {
                    edge.counterpart.detail.clone().unwrap_or_default()
                } else {
                    edge.call_sites
                        .iter()
                        .map(Range::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                vec![
                    edge.counterpart.name,
                    edge.counterpart.kind.to_string(),
                    edge.counterpart.uri,
                    edge.counterpart.range.to_string(),
                    last,
                ]
            })
        };

        HierarchyTables {
            incoming: self.codec.encode_bounded(incoming_kind, to_rows(result.incoming)),
            outgoing: self.codec.encode_bounded(outgoing_kind, to_rows(result.outgoing)),
        }
    }

    /// Validate `request` and decide which position to ask the provider about.
    ///
    /// `Ok(None)` means a name did not resolve; the caller answers with an
    /// empty table.
    async fn query_point(
        &self,
        request: &LookupRequest,
    ) -> Result<Option<QueryPoint>, FacadeError> {
        let target = request.target()?;
        if let LookupTarget::Position(position) = target {
            return Ok(Some(QueryPoint {
                position,
                symbol: None,
            }));
        }

        let resolved = self.locator.resolve_target(&request.uri, &target).await;
        Ok(accept(&target, resolved).map(|symbol| QueryPoint {
            position: symbol.anchor(),
            symbol: Some(symbol),
        }))
    }

    async fn hover_text(&self, uri: &str, position: Position) -> String {
        let guard = TimeoutGuard::new(self.timeouts.hover());
        match self.guarded(&guard, "hover", self.provider.hover(uri, position)).await {
            Ok(hover) => hover.map(|h: HoverInfo| h.contents).unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    async fn guarded<F, T>(
        &self,
        guard: &TimeoutGuard,
        operation: &'static str,
        work: F,
    ) -> Result<T, Degraded>
    where
        F: std::future::Future<Output = Result<T, LspError>>,
    {
        let guard = match &self.cancel {
            Some(token) => guard.clone().with_cancel(token.clone()),
            None => guard.clone(),
        };
        match guard.race(work).await {
            Ok(Ok(out)) => Ok(out),
            Ok(Err(source)) => Err(Degraded::ProviderError { operation, source }),
            Err(GuardError::TimedOut { after }) => {
                Err(Degraded::ProviderTimeout { operation, after })
            }
            Err(GuardError::Cancelled) => Err(Degraded::Cancelled { operation }),
        }
    }
}

/// Canonical symbol of a locator answer, logging misses and ambiguity
fn accept(target: &LookupTarget, resolved: LocatorResult) -> Option<Symbol> {
    if let Some(error) = resolved.error {
        warn!("{}", Degraded::NotFound(error));
        return None;
    }
    if !resolved.is_unique
        && let LookupTarget::Name { name, .. } = target
    {
        warn!(
            "{}",
            Degraded::Ambiguous {
                name: name.clone(),
                count: resolved.alternative_count() + 1,
            }
        );
    }
    resolved.symbol
}

fn degrade(kind: TableKind, reason: Degraded) -> TableResult {
    warn!("{}", reason);
    TableResult::empty(kind)
}

fn table_kinds(kind: HierarchyKind) -> (TableKind, TableKind) {
    match kind {
        HierarchyKind::Call => (TableKind::IncomingCalls, TableKind::OutgoingCalls),
        HierarchyKind::Type => (TableKind::Supertypes, TableKind::Subtypes),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::infra::table::count_rows;
    use crate::models::config::OutputConfig;
    use crate::models::{Location, SymbolKind};
    use crate::services::provider::testing::fixtures::{function, item, symbol};
    use crate::services::provider::testing::{StaticProvider, op};

    const URI: &str = "file:///src/shapes.rs";

    const SOURCE: &str = "\
mod shapes {
    fn foo() {}

    fn area() {
        foo();
    }

    struct Circle;
    fn foo() {}
}";

    fn facade(provider: StaticProvider) -> (Arc<StaticProvider>, SymbolFacade) {
        let provider = Arc::new(provider);
        let facade = SymbolFacade::new(provider.clone(), &SymlensConfig::default());
        (provider, facade)
    }

    fn shapes() -> Vec<Symbol> {
        vec![function("foo", 1, 1), function("area", 3, 5), function("foo", 8, 8)]
    }

    fn locations(n: u32) -> Vec<Location> {
        (0..n)
            .map(|i| Location::new(URI, Range::from_coords(i % 9, 4, i % 9, 7)))
            .collect()
    }

    #[test]
    fn test_facade_is_shareable() {
        fn check<T: Send + Sync>() {}
        check::<SymbolFacade>();
    }

    #[tokio::test]
    async fn test_duplicate_names_use_first_in_document_order() {
        let (_, facade) = facade(StaticProvider::new().with_symbols(
            URI,
            vec![function("foo", 2, 4), function("foo", 9, 11)],
        ));
        let result = facade.resolve(&LookupRequest::named(URI, "foo")).await.unwrap();

        assert_eq!(result.symbol.unwrap().range.start.line, 2);
        assert!(!result.is_unique);
        let alternatives = result.alternatives.unwrap();
        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].range.start.line, 9);
    }

    #[tokio::test]
    async fn test_six_hundred_references_are_sampled() {
        let (provider, facade) = facade(
            StaticProvider::new()
                .with_document(URI, SOURCE)
                .with_locations(LocationQuery::References, locations(600)),
        );
        let table = facade.references(&LookupRequest::at(URI, 1, 7)).await.unwrap();

        assert_eq!(table.rows.len(), 6);
        assert_eq!(count_rows(&table.render()), 6);
        assert!(table.truncated);
        assert_eq!(table.original_row_count, 600);
        assert!(table.rows[5].starts_with("600 results found"));
        // Only the visible rows were previewed
        assert_eq!(provider.call_count(op::READ_DOCUMENT), 1);
    }

    #[tokio::test]
    async fn test_references_below_the_sampling_ceiling_truncate() {
        let (_, facade) = facade(
            StaticProvider::new()
                .with_document(URI, SOURCE)
                .with_locations(LocationQuery::References, locations(250)),
        );
        let table = facade.references(&LookupRequest::at(URI, 1, 7)).await.unwrap();

        assert_eq!(table.rows.len(), 201);
        assert_eq!(table.rows[200], "50 rows truncated out of 250 total | EOL");
    }

    #[tokio::test]
    async fn test_empty_prepare_gives_header_only_tables() {
        let (_, facade) = facade(StaticProvider::new());
        let tables = facade.call_hierarchy(&LookupRequest::at(URI, 3, 7)).await.unwrap();

        assert!(tables.incoming.is_empty());
        assert!(tables.outgoing.is_empty());
        assert_eq!(
            tables.incoming.render(),
            "FROM_NAME | FROM_KIND | FROM_URI | FROM_RANGE | CALL_SITES | EOL\n"
        );
        assert_eq!(
            tables.outgoing.render(),
            "TO_NAME | TO_KIND | TO_URI | TO_RANGE | CALL_SITES | EOL\n"
        );
        assert_eq!(
            tables.render(),
            "FROM_NAME | FROM_KIND | FROM_URI | FROM_RANGE | CALL_SITES | EOL\n\n\
             TO_NAME | TO_KIND | TO_URI | TO_RANGE | CALL_SITES | EOL\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_incoming_branch_keeps_outgoing() {
        let callee = |name: &str, line| {
            Edge::new(item(name, URI, line), vec![Range::from_coords(4, 8, 4, 11)])
        };
        let (_, facade) = facade(
            StaticProvider::new()
                .with_symbols(URI, shapes())
                .with_call_hierarchy(
                    vec![item("area", URI, 3)],
                    vec![callee("main", 20)],
                    vec![callee("foo", 1), callee("sqrt", 40)],
                )
                .delay(op::INCOMING, Duration::from_secs(30)),
        );
        let tables = facade
            .call_hierarchy(&LookupRequest::named(URI, "area"))
            .await
            .unwrap();

        assert!(tables.incoming.rows.is_empty());
        assert_eq!(tables.outgoing.rows.len(), 2);
        assert!(
            tables.outgoing.rows[0]
                .starts_with("foo | function | file:///src/shapes.rs | 1:0-4:1 | 4:8-4:11")
        );
    }

    #[tokio::test]
    async fn test_children_depth_two_stops_above_level_three() {
        let tree = vec![symbol("Outer", SymbolKind::Module, 0, 40).with_children(vec![
            symbol("Inner", SymbolKind::Class, 1, 30).with_children(vec![
                function("leaf", 2, 10)
                    .with_children(vec![symbol("x", SymbolKind::Variable, 3, 3)]),
            ]),
        ])];
        let (_, facade) = facade(StaticProvider::new().with_symbols(URI, tree));
        let table = facade
            .children(&LookupRequest::named(URI, "Outer"), Some(ChildDepth::Limited(2)))
            .await
            .unwrap();

        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[0].starts_with("Inner | class | 1 | "));
        assert!(table.rows[1].starts_with("leaf | function | 2 | "));
        assert!(table.rows[1].ends_with(" | Inner | EOL"));
    }

    #[tokio::test]
    async fn test_children_default_depth_comes_from_config() {
        let tree = vec![symbol("Outer", SymbolKind::Module, 0, 40).with_children(vec![
            symbol("Inner", SymbolKind::Class, 1, 30)
                .with_children(vec![function("leaf", 2, 10)]),
        ])];
        let (_, facade) = facade(StaticProvider::new().with_symbols(URI, tree));
        let table = facade
            .children(&LookupRequest::at(URI, 0, 2), None)
            .await
            .unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_name_request_queries_the_selection_start() {
        let (provider, facade) = facade(
            StaticProvider::new()
                .with_symbols(URI, shapes())
                .with_document(URI, SOURCE),
        );
        facade.definition(&LookupRequest::named(URI, "area")).await.unwrap();
        facade.definition(&LookupRequest::at(URI, 4, 9)).await.unwrap();

        let calls: Vec<_> = provider
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("definition"))
            .collect();
        assert_eq!(calls, vec!["definition@3:4", "definition@4:9"]);
    }

    #[tokio::test]
    async fn test_unresolved_name_is_header_only() {
        let (provider, facade) = facade(StaticProvider::new().with_symbols(URI, shapes()));
        let table = facade
            .references(&LookupRequest::named(URI, "missing"))
            .await
            .unwrap();

        assert!(table.is_empty());
        assert_eq!(provider.call_count("references"), 0);
    }

    #[tokio::test]
    async fn test_malformed_requests_are_errors() {
        let (provider, facade) = facade(StaticProvider::new());
        let bad = LookupRequest {
            uri: URI.to_string(),
            character: Some(2),
            ..Default::default()
        };

        tokio_test::assert_err!(facade.references(&bad).await);
        tokio_test::assert_err!(facade.hover(&bad).await);
        tokio_test::assert_err!(facade.children(&bad, None).await);
        tokio_test::assert_err!(facade.document_symbols("  ").await);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_header_only() {
        let (_, facade) = facade(StaticProvider::new().fail("implementation"));
        let request = LookupRequest::at(URI, 1, 7);
        let table = tokio_test::assert_ok!(facade.implementation(&request).await);
        assert_eq!(table.render(), "URI | RANGE | PREVIEW | EOL\n");
    }

    #[tokio::test]
    async fn test_definition_rows_carry_previews() {
        let (_, facade) = facade(
            StaticProvider::new()
                .with_document(URI, SOURCE)
                .with_locations(
                    LocationQuery::Definition,
                    vec![Location::new(URI, Range::from_coords(1, 7, 1, 10))],
                ),
        );
        let table = facade.definition(&LookupRequest::at(URI, 4, 9)).await.unwrap();

        assert_eq!(
            table.rows,
            vec![
                "file:///src/shapes.rs | 1:7-1:10 | mod shapes {\\n    fn foo() {}\\n | EOL"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_document_symbols_are_hovered() {
        let tree = vec![symbol("Circle", SymbolKind::Struct, 0, 5)
            .with_children(vec![function("radius", 1, 3)])];
        let (provider, facade) = facade(
            StaticProvider::new()
                .with_symbols(URI, tree)
                .with_hover(Position::new(1, 4), HoverInfo::new("fn radius(&self) -> f64")),
        );
        let table = facade.document_symbols(URI).await.unwrap();

        assert_eq!(
            table.rows,
            vec![
                "Circle | struct | 0:0-5:1 | 0:4-0:10 |  |  | EOL".to_string(),
                "radius | function | 1:0-3:1 | 1:4-1:10 | Circle | fn radius(&self) -> f64 | EOL"
                    .to_string(),
            ]
        );
        assert_eq!(provider.call_count(op::HOVER), 2);
    }

    #[tokio::test]
    async fn test_document_symbols_hover_only_visible_rows() {
        let tree: Vec<Symbol> = (0..12)
            .map(|i| function(&format!("f{}", i), i * 2, i * 2 + 1))
            .collect();
        let provider = Arc::new(StaticProvider::new().with_symbols(URI, tree));
        let config = SymlensConfig {
            output: OutputConfig {
                max_rows: 10,
                ..Default::default()
            },
            ..Default::default()
        };
        let facade = SymbolFacade::new(provider.clone(), &config);
        let table = facade.document_symbols(URI).await.unwrap();

        assert_eq!(table.rows.len(), 11);
        assert_eq!(provider.call_count(op::HOVER), 10);
    }

    #[tokio::test]
    async fn test_hover_by_position_names_the_word() {
        let (_, facade) = facade(
            StaticProvider::new()
                .with_document(URI, SOURCE)
                .with_hover(
                    Position::new(4, 9),
                    HoverInfo::new("fn foo()\n---\nDoes nothing")
                        .with_range(Range::from_coords(4, 8, 4, 11)),
                ),
        );
        let table = facade.hover(&LookupRequest::at(URI, 4, 9)).await.unwrap();

        assert_eq!(
            table.rows,
            vec!["foo | 4:8-4:11 | fn foo()\\n---\\nDoes nothing | EOL".to_string()]
        );
    }

    #[tokio::test]
    async fn test_type_hierarchy_uses_detail_column() {
        let mut parent = item("Shape", URI, 0);
        parent.kind = SymbolKind::Interface;
        parent.detail = Some("trait Shape".to_string());
        let (_, facade) = facade(StaticProvider::new().with_type_hierarchy(
            vec![item("Circle", URI, 7)],
            vec![parent],
            vec![],
        ));
        let tables = facade.type_hierarchy(&LookupRequest::at(URI, 7, 11)).await.unwrap();

        assert_eq!(
            tables.incoming.rows,
            vec![
                "Shape | interface | file:///src/shapes.rs | 0:0-3:1 | trait Shape | EOL"
                    .to_string()
            ]
        );
        assert!(tables.outgoing.is_empty());
        assert!(tables.render().starts_with("SUPER_NAME"));
    }

    #[tokio::test]
    async fn test_cancelled_facade_degrades() {
        let token = CancellationToken::new();
        let provider = Arc::new(
            StaticProvider::new().with_locations(LocationQuery::Definition, locations(3)),
        );
        let facade =
            SymbolFacade::new(provider, &SymlensConfig::default()).with_cancel(token.clone());
        token.cancel();

        let table = facade.definition(&LookupRequest::at(URI, 1, 7)).await.unwrap();
        assert!(table.is_empty());
    }
}
