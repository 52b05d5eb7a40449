//! Symbol lookup within one document

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::provider::CodeProvider;
use crate::error::{Degraded, FacadeError};
use crate::infra::timeout::{GuardError, TimeoutGuard};
use crate::models::{LocatorResult, LookupRequest, LookupTarget, Position, Symbol};

/// Turns a position or a name into a concrete [`Symbol`]
pub struct SymbolLocator {
    provider: Arc<dyn CodeProvider>,
    guard: TimeoutGuard,
}

impl SymbolLocator {
    pub fn new(provider: Arc<dyn CodeProvider>, symbols_timeout: Duration) -> Self {
        Self {
            provider,
            guard: TimeoutGuard::new(symbols_timeout),
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.guard = self.guard.with_cancel(token);
        self
    }

    /// Validate `request` and resolve it.
    ///
    /// Only a malformed request is an `Err`; lookup misses and provider
    /// failures are reported through [`LocatorResult::error`].
    #[instrument(skip(self, request), fields(uri = %request.uri))]
    pub async fn resolve(&self, request: &LookupRequest) -> Result<LocatorResult, FacadeError> {
        let target = request.target()?;
        Ok(self.resolve_target(&request.uri, &target).await)
    }

    pub async fn resolve_target(&self, uri: &str, target: &LookupTarget) -> LocatorResult {
        let symbols = match self.fetch_symbols(uri).await {
            Ok(symbols) => symbols,
            Err(e) => return LocatorResult::failed(e.to_string()),
        };

        match target {
            LookupTarget::Position(pos) => match locate_at(&symbols, *pos) {
                Some(symbol) => LocatorResult::found(symbol.clone()),
                None => LocatorResult::failed(format!("No symbol found at position {}", pos)),
            },
            LookupTarget::Name { name, hint } => {
                if let Some(hint) = hint {
                    debug!("Name lookup for '{}' carries hint {}", name, hint);
                }
                let matches = find_by_name(&symbols, name).into_iter().cloned().collect();
                LocatorResult::from_matches(matches).unwrap_or_else(|| {
                    LocatorResult::failed(format!("No symbol named '{}' found in document", name))
                })
            }
        }
    }

    /// The document's symbol tree, raced against the symbols timeout
    pub async fn fetch_symbols(&self, uri: &str) -> Result<Vec<Symbol>, Degraded> {
        const OPERATION: &str = "documentSymbol";

        match self.guard.race(self.provider.document_symbols(uri)).await {
            Ok(Ok(symbols)) => Ok(symbols),
            Ok(Err(source)) => Err(Degraded::ProviderError {
                operation: OPERATION,
                source,
            }),
            Err(GuardError::TimedOut { after }) => Err(Degraded::ProviderTimeout {
                operation: OPERATION,
                after,
            }),
            Err(GuardError::Cancelled) => Err(Degraded::Cancelled {
                operation: OPERATION,
            }),
        }
    }
}

/// Smallest symbol whose selection range contains `pos`, else the smallest
/// whose full range does. Equal extents resolve to the earlier symbol in
/// pre-order.
pub fn locate_at(symbols: &[Symbol], pos: Position) -> Option<&Symbol> {
    let flat = Symbol::flatten(symbols);

    let by_selection = flat
        .iter()
        .filter(|s| s.selection_range.contains(pos))
        .min_by_key(|s| s.selection_range.extent());

    by_selection
        .or_else(|| {
            flat.iter()
                .filter(|s| s.range.contains(pos))
                .min_by_key(|s| s.range.extent())
        })
        .copied()
}

/// Every symbol named exactly `name`, in pre-order
pub fn find_by_name<'a>(symbols: &'a [Symbol], name: &str) -> Vec<&'a Symbol> {
    Symbol::flatten(symbols)
        .into_iter()
        .filter(|s| s.name == name)
        .collect()
}
