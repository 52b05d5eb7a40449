//! Depth-1 call and type hierarchy traversal

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use super::provider::CodeProvider;
use crate::error::{Degraded, LspError};
use crate::infra::timeout::{GuardError, race};
use crate::models::config::TimeoutConfig;
use crate::models::{
    ChildDepth, Edge, HierarchyItem, HierarchyKind, HierarchyResult, NestedSymbol, Position, Symbol,
};

pub struct HierarchyTraversalEngine {
    provider: Arc<dyn CodeProvider>,
    timeouts: TimeoutConfig,
    cancel: Option<CancellationToken>,
}

impl HierarchyTraversalEngine {
    pub fn new(provider: Arc<dyn CodeProvider>, timeouts: TimeoutConfig) -> Self {
        Self {
            provider,
            timeouts,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Prepare at `position`, then expand the root one level in both directions.
    ///
    /// A timed-out or empty prepare yields an empty result; `None` means the
    /// provider rejected the prepare outright. Each branch degrades to an
    /// empty list on its own.
    #[instrument(skip(self), fields(kind = %kind))]
    pub async fn traverse(
        &self,
        uri: &str,
        position: Position,
        kind: HierarchyKind,
    ) -> Option<HierarchyResult> {
        let (operation, deadline) = match kind {
            HierarchyKind::Call => ("prepareCallHierarchy", self.timeouts.call_prepare()),
            HierarchyKind::Type => ("prepareTypeHierarchy", self.timeouts.type_prepare()),
        };

        let prepare = async {
            match kind {
                HierarchyKind::Call => self.provider.prepare_call_hierarchy(uri, position).await,
                HierarchyKind::Type => self.provider.prepare_type_hierarchy(uri, position).await,
            }
        };

        let items = match self.guarded(operation, prepare, deadline).await {
            Ok(items) => items,
            Err(source @ Degraded::ProviderError { .. }) => {
                warn!("{}", source);
                return None;
            }
            Err(other) => {
                warn!("{}", other);
                return Some(HierarchyResult::empty(kind));
            }
        };

        let Some(root) = items.into_iter().next() else {
            return Some(HierarchyResult::empty(kind));
        };

        let (incoming, outgoing) = match kind {
            HierarchyKind::Call => self.expand_calls(&root).await,
            HierarchyKind::Type => self.expand_types(&root).await,
        };

        Some(HierarchyResult {
            kind,
            root: Some(root),
            incoming,
            outgoing,
        })
    }

    async fn expand_calls(&self, root: &HierarchyItem) -> (Vec<Edge>, Vec<Edge>) {
        let deadline = self.timeouts.call_branch();
        let incoming = self.provider.incoming_calls(root);
        let outgoing = self.provider.outgoing_calls(root);
        tokio::join!(
            self.branch("callHierarchy/incomingCalls", incoming, deadline),
            self.branch("callHierarchy/outgoingCalls", outgoing, deadline),
        )
    }

    async fn expand_types(&self, root: &HierarchyItem) -> (Vec<Edge>, Vec<Edge>) {
        let deadline = self.timeouts.type_branch();
        let supertypes = async { self.provider.supertypes(root).await.map(into_edges) };
        let subtypes = async { self.provider.subtypes(root).await.map(into_edges) };
        tokio::join!(
            self.branch("typeHierarchy/supertypes", supertypes, deadline),
            self.branch("typeHierarchy/subtypes", subtypes, deadline),
        )
    }

    async fn branch<F>(&self, operation: &'static str, work: F, deadline: Duration) -> Vec<Edge>
    where
        F: Future<Output = Result<Vec<Edge>, LspError>>,
    {
        match self.guarded(operation, work, deadline).await {
            Ok(edges) => edges,
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        }
    }

    async fn guarded<F, T>(
        &self,
        operation: &'static str,
        work: F,
        deadline: Duration,
    ) -> Result<T, Degraded>
    where
        F: Future<Output = Result<T, LspError>>,
    {
        match race(work, deadline, self.cancel.as_ref()).await {
            Ok(Ok(out)) => Ok(out),
            Ok(Err(source)) => Err(Degraded::ProviderError { operation, source }),
            Err(GuardError::TimedOut { after }) => {
                Err(Degraded::ProviderTimeout { operation, after })
            }
            Err(GuardError::Cancelled) => Err(Degraded::Cancelled { operation }),
        }
    }
}

/// Type hierarchy neighbours carry no call sites
fn into_edges(items: Vec<HierarchyItem>) -> Vec<Edge> {
    items
        .into_iter()
        .map(|item| Edge::new(item, Vec::new()))
        .collect()
}

/// Descendants of `symbol` down to `depth`, in pre-order
pub fn children(symbol: &Symbol, depth: ChildDepth) -> Vec<NestedSymbol<'_>> {
    fn collect<'a>(
        parent: &'a Symbol,
        level: u32,
        depth: ChildDepth,
        out: &mut Vec<NestedSymbol<'a>>,
    ) {
        if !depth.allows(level) {
            return;
        }
        for child in &parent.children {
            out.push(NestedSymbol {
                symbol: child,
                depth: level,
                parent: &parent.name,
            });
            collect(child, level + 1, depth, out);
        }
    }

    let mut out = Vec::new();
    collect(symbol, 1, depth, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Range, SymbolKind};
    use crate::services::provider::testing::fixtures::{function, item, symbol};
    use crate::services::provider::testing::{StaticProvider, op};

    const URI: &str = "file:///src/app.rs";

    fn engine(provider: StaticProvider) -> HierarchyTraversalEngine {
        HierarchyTraversalEngine::new(Arc::new(provider), TimeoutConfig::default())
    }

    fn edge(name: &str, line: u32) -> Edge {
        Edge::new(
            item(name, URI, line),
            vec![Range::from_coords(line + 1, 4, line + 1, 10)],
        )
    }

    #[tokio::test]
    async fn test_empty_prepare_is_empty_not_none() {
        let result = engine(StaticProvider::new())
            .traverse(URI, Position::new(3, 4), HierarchyKind::Call)
            .await
            .unwrap();
        assert!(result.is_empty());
        assert!(result.root.is_none());
    }

    #[tokio::test]
    async fn test_prepare_error_is_none() {
        let provider = StaticProvider::new().fail(op::PREPARE_CALL);
        let result = engine(provider)
            .traverse(URI, Position::new(3, 4), HierarchyKind::Call)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_first_prepared_item_is_root() {
        let provider = StaticProvider::new().with_call_hierarchy(
            vec![item("handle", URI, 10), item("handle_other", URI, 40)],
            vec![edge("main", 0)],
            vec![edge("parse", 20), edge("render", 30)],
        );
        let result = engine(provider)
            .traverse(URI, Position::new(10, 3), HierarchyKind::Call)
            .await
            .unwrap();

        assert_eq!(result.root.as_ref().unwrap().name, "handle");
        assert_eq!(result.incoming.len(), 1);
        assert_eq!(result.outgoing.len(), 2);
        assert_eq!(result.incoming[0].call_sites.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_branch_degrades_alone() {
        let provider = StaticProvider::new()
            .with_call_hierarchy(
                vec![item("handle", URI, 10)],
                vec![edge("main", 0)],
                vec![edge("parse", 20), edge("render", 30)],
            )
            .delay(op::INCOMING, Duration::from_secs(60));
        let result = engine(provider)
            .traverse(URI, Position::new(10, 3), HierarchyKind::Call)
            .await
            .unwrap();

        assert!(result.incoming.is_empty());
        assert_eq!(result.outgoing.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_prepare_is_empty() {
        let provider = StaticProvider::new()
            .with_call_hierarchy(vec![item("handle", URI, 10)], vec![edge("main", 0)], vec![])
            .delay(op::PREPARE_CALL, Duration::from_secs(3));
        let result = engine(provider)
            .traverse(URI, Position::new(10, 3), HierarchyKind::Call)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_failed_branch_keeps_the_other() {
        let provider = StaticProvider::new()
            .with_type_hierarchy(
                vec![item("Circle", URI, 5)],
                vec![item("Shape", URI, 0)],
                vec![item("UnitCircle", URI, 50)],
            )
            .fail(op::SUBTYPES);
        let result = engine(provider)
            .traverse(URI, Position::new(5, 3), HierarchyKind::Type)
            .await
            .unwrap();

        assert_eq!(result.incoming.len(), 1);
        assert_eq!(result.incoming[0].counterpart.name, "Shape");
        assert!(result.incoming[0].call_sites.is_empty());
        assert!(result.outgoing.is_empty());
    }

    #[tokio::test]
    async fn test_recursive_call_stays_depth_one() {
        let root = item("fact", URI, 0);
        let recursive = Edge::new(root.clone(), vec![Range::from_coords(2, 11, 2, 15)]);
        let provider = StaticProvider::new()
            .with_call_hierarchy(vec![root], vec![recursive.clone()], vec![recursive]);
        let node = engine(provider)
            .traverse(URI, Position::new(0, 3), HierarchyKind::Call)
            .await
            .unwrap()
            .into_node()
            .unwrap();

        // Counterparts are plain items; nothing below them was requested
        assert_eq!(node.edges_in[0].counterpart.name, "fact");
        assert_eq!(node.edges_out[0].counterpart.name, "fact");
    }

    #[tokio::test]
    async fn test_cancel_stops_traversal() {
        let token = CancellationToken::new();
        token.cancel();
        let provider = StaticProvider::new()
            .with_call_hierarchy(vec![item("handle", URI, 10)], vec![edge("main", 0)], vec![]);
        let result = engine(provider)
            .with_cancel(token)
            .traverse(URI, Position::new(10, 3), HierarchyKind::Call)
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    fn three_levels() -> Symbol {
        symbol("Outer", SymbolKind::Module, 0, 100).with_children(vec![
            symbol("Inner", SymbolKind::Class, 1, 50).with_children(vec![
                function("leaf", 2, 10)
                    .with_children(vec![symbol("local", SymbolKind::Variable, 3, 3)]),
            ]),
            function("sibling", 60, 70),
        ])
    }

    #[test]
    fn test_children_depth_two_excludes_level_three() {
        let root = three_levels();
        let nested = children(&root, ChildDepth::Limited(2));
        let names: Vec<_> = nested
            .iter()
            .map(|n| (n.symbol.name.as_str(), n.depth, n.parent))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Inner", 1, "Outer"),
                ("leaf", 2, "Inner"),
                ("sibling", 1, "Outer"),
            ]
        );
    }

    #[test]
    fn test_children_all_reaches_every_level() {
        let root = three_levels();
        let nested = children(&root, ChildDepth::All);
        assert_eq!(nested.len(), 4);
        assert_eq!(nested[2].symbol.name, "local");
        assert_eq!(nested[2].depth, 3);
    }

    #[test]
    fn test_children_of_leaf_is_empty() {
        let leaf = function("lonely", 0, 1);
        assert!(children(&leaf, ChildDepth::All).is_empty());
    }
}
